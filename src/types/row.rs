//! Row-related types for the bulk lifecycle engine
//!
//! This module defines the canonical row record produced from CSV input,
//! the status normalization rules, the requested operation, and the per-row
//! and per-run result types.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::types::error::EngineError;

/// Lifecycle operation requested by the caller
///
/// Chosen once per run and orthogonal to the `--all` flag (which bypasses
/// filtering) and to dry-run/test modes (which bypass execution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Suspend directory access for each eligible account
    Suspend,

    /// Restore directory access for each eligible account
    Restore,
}

impl Operation {
    /// Lowercase name used in checkpoint files, report files, and log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Suspend => "suspend",
            Operation::Restore => "restore",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account status derived from the raw CSV status value
///
/// The mapping is deliberately conservative: any value that is not a known
/// active or inactive spelling is `Unknown`, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedStatus {
    Active,
    Inactive,
    Unknown,
}

impl NormalizedStatus {
    /// Normalize a raw status value from the CSV
    ///
    /// Case-insensitive: `active` maps to Active; `inactive`, `suspended`,
    /// `disabled` and `deactivated` map to Inactive. Absent, blank, or
    /// unrecognized values map to Unknown.
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return NormalizedStatus::Unknown;
        };
        match raw.trim().to_lowercase().as_str() {
            "" => NormalizedStatus::Unknown,
            "active" => NormalizedStatus::Active,
            "inactive" | "suspended" | "disabled" | "deactivated" => NormalizedStatus::Inactive,
            _ => NormalizedStatus::Unknown,
        }
    }
}

/// Canonical row record produced from one CSV line
///
/// Immutable after resolution. The email is trimmed and lower-cased at
/// construction so that comparisons and checkpoint identifiers are stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Account email, trimmed and lower-cased (required, non-empty)
    pub email: String,

    /// Account identifier as written in the CSV, if the column was present
    ///
    /// May carry a composite `"cloudId:accountId"` form; use
    /// [`Row::resolved_account_id`] to obtain the semantic identifier.
    pub account_id: Option<String>,

    /// Display name, if the column was present
    pub display_name: Option<String>,

    /// Raw status value, if the column was present and non-blank
    pub raw_status: Option<String>,
}

impl Row {
    /// Status derived from the raw CSV value
    pub fn normalized_status(&self) -> NormalizedStatus {
        NormalizedStatus::from_raw(self.raw_status.as_deref())
    }

    /// The semantic account identifier from the CSV, if any
    ///
    /// For composite `"cloudId:accountId"` values only the suffix after the
    /// last `:` is the identifier; otherwise the whole string is.
    pub fn resolved_account_id(&self) -> Option<&str> {
        self.account_id
            .as_deref()
            .map(|id| id.rsplit(':').next().unwrap_or(id))
    }

    /// Stable identifier used for checkpointing and reporting
    ///
    /// Prefers the CSV-provided account id so it is a pure function of the
    /// row, independent of any remote lookup. Falls back to the email.
    pub fn identifier(&self) -> &str {
        self.resolved_account_id().unwrap_or(&self.email)
    }
}

/// A CSV line that could not become a [`Row`]
///
/// Reported in the run summary; never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRow {
    /// 1-based line number in the input file (header is line 1)
    pub line: u64,

    /// Human-readable reason the row was rejected
    pub reason: String,
}

/// Parsed CSV input ready for the batch runner
#[derive(Debug, Clone)]
pub struct RowBatch {
    /// Valid, de-duplicated rows in input order
    pub rows: Vec<Row>,

    /// Rows rejected during parsing/validation
    pub invalid: Vec<InvalidRow>,

    /// Whether the input had a recognized status column
    ///
    /// Feeds the eligibility filter: without a status column every row is
    /// eligible regardless of operation.
    pub status_column_present: bool,

    /// Hex digest of the raw CSV content
    ///
    /// Combined with the operation, this ties a checkpoint to the exact
    /// input it belongs to.
    pub fingerprint: String,
}

/// Outcome of one processed row
///
/// Created exactly once per processed row and appended to the run's result
/// ledger; never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    /// The row this outcome belongs to
    pub row: Row,

    /// Whether a remote call was actually attempted
    ///
    /// False in dry-run mode, where success is synthesized.
    pub attempted: bool,

    /// Whether the operation succeeded (or would have, in dry-run)
    pub succeeded: bool,

    /// Terminal error for this row, if it failed
    pub error: Option<EngineError>,

    /// Number of retries consumed beyond the first attempt
    pub retries_used: u32,
}

/// Final accounting for one run
///
/// Always distinguishes processed-succeeded, processed-failed, and
/// skipped-ineligible/already-done counts. Dry-run and test modes are
/// carried so output can never be mistaken for a real mutation.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// The operation this run performed
    pub operation: Operation,

    /// Whether execution was simulated
    pub dry_run: bool,

    /// Whether the run was limited to the first eligible row
    pub test_mode: bool,

    /// One outcome per processed row, in processing order
    pub outcomes: Vec<RowOutcome>,

    /// Rows excluded by the eligibility filter
    pub skipped_ineligible: usize,

    /// Rows skipped because a checkpoint marked them done
    pub already_done: usize,

    /// Rows rejected during CSV parsing/validation
    pub invalid: Vec<InvalidRow>,
}

impl RunSummary {
    /// Count of rows that succeeded (including synthesized dry-run successes)
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    /// Count of rows that terminally failed
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded).count()
    }
}
