//! API request handlers

pub mod health;
pub mod ingest;
pub mod queue;
