//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `row`: Row records, statuses, operations, and run results
//! - `error`: Error types for the bulk lifecycle engine

pub mod error;
pub mod row;

pub use error::{EngineError, RemoteError};
pub use row::{
    InvalidRow, NormalizedStatus, Operation, Row, RowBatch, RowOutcome, RunSummary,
};
