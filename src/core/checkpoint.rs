//! Checkpoint persistence
//!
//! A checkpoint records the identifiers already processed for a specific
//! `(CSV fingerprint, operation)` pair so an interrupted run can resume
//! without repeating completed rows. It is stored as plain JSON so an
//! operator can inspect or delete it by hand.
//!
//! The store flushes after every recorded row, not in batches: durability
//! across process termination is what makes resume-after-crash safe. A
//! checkpoint with a fresh `updated_at` is treated as owned by a live run.
//!
//! A fully completed run keeps its checkpoint, marked `completed`, as the
//! durable record that this CSV + operation pair was already applied; a
//! repeat run then reports every row as already done instead of re-issuing
//! remote mutations.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EngineError, Operation};

/// A checkpoint younger than this is considered owned by an active run
pub const ACTIVE_THRESHOLD_SECS: i64 = 60;

/// Durable record of completed identifiers for one CSV + operation pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// The operation this checkpoint belongs to
    pub operation: Operation,

    /// Content fingerprint of the CSV this checkpoint belongs to
    pub csv_fingerprint: String,

    /// Identifiers already successfully processed
    pub processed_identifiers: BTreeSet<String>,

    /// When this checkpoint was first created
    pub created_at: DateTime<Utc>,

    /// When this checkpoint was last flushed
    pub updated_at: DateTime<Utc>,

    /// Whether the run covering this checkpoint ran to completion
    ///
    /// A completed checkpoint is a durable record, not interrupted
    /// progress: it is never treated as a live run and is resumed without
    /// prompting. Defaults to false for files written before the field
    /// existed.
    #[serde(default)]
    pub completed: bool,
}

impl Checkpoint {
    /// Create an empty checkpoint for the given input
    pub fn new(operation: Operation, csv_fingerprint: impl Into<String>) -> Self {
        let now = Utc::now();
        Checkpoint {
            operation,
            csv_fingerprint: csv_fingerprint.into(),
            processed_identifiers: BTreeSet::new(),
            created_at: now,
            updated_at: now,
            completed: false,
        }
    }

    /// Record an identifier as processed
    ///
    /// Idempotent: recording an already-present identifier is a no-op and
    /// returns false.
    pub fn record(&mut self, identifier: &str) -> bool {
        self.processed_identifiers.insert(identifier.to_string())
    }

    /// Whether an identifier was already processed
    pub fn contains(&self, identifier: &str) -> bool {
        self.processed_identifiers.contains(identifier)
    }

    /// Whether any identifiers have been recorded
    pub fn is_empty(&self) -> bool {
        self.processed_identifiers.is_empty()
    }

    /// Time since the last flush
    pub fn age(&self) -> Duration {
        Utc::now() - self.updated_at
    }

    /// Whether this checkpoint looks owned by a live run
    ///
    /// A completed checkpoint is never active, no matter how fresh.
    pub fn is_active(&self) -> bool {
        !self.completed && self.age() < Duration::seconds(ACTIVE_THRESHOLD_SECS)
    }
}

/// File-backed store for one checkpoint
///
/// The file name is keyed by operation and fingerprint, so a checkpoint can
/// never be silently applied to a different CSV or operation.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Create a store for the given state directory, operation, and fingerprint
    pub fn new(state_dir: &Path, operation: Operation, fingerprint: &str) -> Self {
        let path = state_dir.join(format!("checkpoint_{}_{}.json", operation, fingerprint));
        CheckpointStore { path }
    }

    /// Path of the underlying checkpoint file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the checkpoint, if one exists
    ///
    /// A file that cannot be parsed is treated as absent rather than fatal:
    /// a corrupt checkpoint means starting fresh, not refusing to run.
    pub fn load(&self) -> Result<Option<Checkpoint>, EngineError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(EngineError::persistence(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        match serde_json::from_str::<Checkpoint>(&content) {
            Ok(checkpoint) => Ok(Some(checkpoint)),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "discarding unreadable checkpoint"
                );
                Ok(None)
            }
        }
    }

    /// Flush the checkpoint to disk, refreshing `updated_at`
    ///
    /// Called after every row. A write failure is fatal to the run.
    pub fn save(&self, checkpoint: &mut Checkpoint) -> Result<(), EngineError> {
        checkpoint.updated_at = Utc::now();

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::persistence(format!(
                    "failed to create {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(checkpoint)
            .map_err(|e| EngineError::persistence(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| {
            EngineError::persistence(format!("failed to write {}: {}", self.path.display(), e))
        })
    }

    /// Delete the checkpoint file
    ///
    /// Called when the operator starts fresh. Deleting a file that does
    /// not exist is not an error.
    pub fn clear(&self) -> Result<(), EngineError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EngineError::persistence(format!(
                "failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}
