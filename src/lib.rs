//! Bulk Lifecycle Engine Library
//! # Overview
//!
//! This library performs bulk lifecycle changes (suspend/restore) on
//! directory accounts of a cloud identity provider, driven by a CSV export
//! and a remote administrative API.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Row, Operation, RowOutcome, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`config`] - Environment-backed API configuration
//! - [`core`] - Business logic components:
//!   - [`core::filter`] - Pure eligibility decisions per row and operation
//!   - [`core::checkpoint`] - Durable resume state per CSV + operation pair
//!   - [`core::retry`] - Bounded retries with fixed backoff
//!   - [`core::runner`] - Batch orchestration and the run state machine
//! - [`io`] - CSV schema resolution, ingestion, and the run report
//! - [`remote`] - `reqwest` implementation of the directory capability
//!
//! # Run lifecycle
//!
//! A run parses the CSV once, resolves headers against a fixed alias table,
//! filters rows by status eligibility, then processes eligible rows strictly
//! sequentially through the remote capability with per-call retries, an
//! inter-row delay, and a durable per-row checkpoint. Interrupted runs can
//! resume without repeating completed rows; dry-run and test modes simulate
//! or sample the batch without full execution.

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod remote;
pub mod types;

pub use config::ApiConfig;
pub use core::{BatchRunner, Checkpoint, CheckpointStore, DirectoryClient, ResumeDecision, RunConfig};
pub use io::{read_batch, write_report};
pub use types::{
    EngineError, InvalidRow, NormalizedStatus, Operation, RemoteError, Row, RowBatch, RowOutcome,
    RunSummary,
};
