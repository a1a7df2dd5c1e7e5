//! Business logic components
//!
//! - `filter`: pure eligibility decision
//! - `checkpoint`: durable resume state
//! - `retry`: bounded retry with fixed backoff
//! - `traits`: the remote directory capability seam
//! - `runner`: the batch runner orchestrating a full run

pub mod checkpoint;
pub mod filter;
pub mod retry;
pub mod runner;
pub mod traits;

pub use checkpoint::{Checkpoint, CheckpointStore};
pub use filter::eligible;
pub use retry::RetryPolicy;
pub use runner::{BatchRunner, ResumeDecision, RunConfig};
pub use traits::DirectoryClient;
