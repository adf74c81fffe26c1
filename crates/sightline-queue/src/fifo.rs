//! In-process FIFO queue.
//!
//! Mirrors the delivery contract of a FIFO queue with content-based
//! deduplication: one ordered log per message group, and a body that was
//! already accepted inside the deduplication window is dropped.
//!
//! The queue is bounded. Each group holds at most `max_depth` messages;
//! sending to a full group evicts its oldest message. Deduplication ids
//! are kept in acceptance order and expire from the front, so a send costs
//! O(expired) rather than a scan of the whole window.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::error::{QueueError, Result};
use crate::message::SendMessageRequest;
use crate::sender::{QueueSender, SendOutcome};

pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Messages retained per group when nothing consumes them.
pub const DEFAULT_MAX_DEPTH: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub sequence_number: u64,
    pub message_group_id: String,
    /// Hex SHA-256 of the body.
    pub deduplication_id: String,
    pub body: String,
}

#[derive(Default)]
struct FifoState {
    next_sequence: u64,
    evicted: u64,
    groups: HashMap<String, VecDeque<QueueMessage>>,
    seen: HashSet<String>,
    /// `seen` entries in acceptance order.
    expiries: VecDeque<(Instant, String)>,
}

impl FifoState {
    fn expire(&mut self, now: Instant, window: Duration) {
        while let Some((accepted, _)) = self.expiries.front() {
            if now.duration_since(*accepted) < window {
                break;
            }
            if let Some((_, id)) = self.expiries.pop_front() {
                self.seen.remove(&id);
            }
        }
    }
}

pub struct InMemoryFifoQueue {
    dedup_window: Duration,
    max_depth: usize,
    state: Mutex<FifoState>,
}

impl Default for InMemoryFifoQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFifoQueue {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_DEDUP_WINDOW, DEFAULT_MAX_DEPTH)
    }

    pub fn with_dedup_window(dedup_window: Duration) -> Self {
        Self::with_limits(dedup_window, DEFAULT_MAX_DEPTH)
    }

    /// `max_depth` is clamped to at least one message.
    pub fn with_limits(dedup_window: Duration, max_depth: usize) -> Self {
        Self {
            dedup_window,
            max_depth: max_depth.max(1),
            state: Mutex::new(FifoState::default()),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn enqueue(&self, request: &SendMessageRequest) -> SendOutcome {
        let deduplication_id = hex::encode(Sha256::digest(request.message_body.as_bytes()));
        let now = Instant::now();

        let mut state = self.state.lock();
        state.expire(now, self.dedup_window);

        if state.seen.contains(&deduplication_id) {
            tracing::debug!(
                group = %request.message_group_id,
                dedup_id = %deduplication_id,
                "duplicate message dropped"
            );
            return SendOutcome::Deduplicated;
        }
        state.seen.insert(deduplication_id.clone());
        state.expiries.push_back((now, deduplication_id.clone()));

        state.next_sequence += 1;
        let message = QueueMessage {
            sequence_number: state.next_sequence,
            message_group_id: request.message_group_id.clone(),
            deduplication_id,
            body: request.message_body.clone(),
        };

        let max_depth = self.max_depth;
        let group = state
            .groups
            .entry(request.message_group_id.clone())
            .or_default();
        let mut evicted = 0;
        while group.len() >= max_depth {
            group.pop_front();
            evicted += 1;
        }
        group.push_back(message);

        if evicted > 0 {
            state.evicted += evicted;
            tracing::warn!(
                group = %request.message_group_id,
                max_depth,
                "queue group full, evicted oldest message"
            );
        }
        SendOutcome::Queued
    }

    /// Take up to `max` messages from the head of `group`, in send order.
    pub fn receive(&self, group: &str, max: usize) -> Result<Vec<QueueMessage>> {
        let mut state = self.state.lock();
        let queue = state
            .groups
            .get_mut(group)
            .ok_or_else(|| QueueError::UnknownGroup(group.to_string()))?;
        let count = max.min(queue.len());
        Ok(queue.drain(..count).collect())
    }

    /// Messages waiting across all groups.
    pub fn len(&self) -> usize {
        self.state.lock().groups.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Messages dropped because their group was full.
    pub fn evicted(&self) -> u64 {
        self.state.lock().evicted
    }

    /// Deduplication ids still inside the window.
    pub fn tracked_ids(&self) -> usize {
        self.state.lock().seen.len()
    }
}

#[async_trait]
impl QueueSender for InMemoryFifoQueue {
    async fn send(&self, request: &SendMessageRequest) -> Result<SendOutcome> {
        Ok(self.enqueue(request))
    }
}
