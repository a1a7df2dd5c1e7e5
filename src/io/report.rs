//! Per-run outcome ledger
//!
//! Writes one record per processed row (identifier, requested state, result,
//! retry count) in CSV form, suitable for append-only per-run logging.
//! Credentials never appear in a report. Dry-run and test modes are labeled
//! so a report can never be mistaken for a real mutation.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::types::{EngineError, RunSummary};

/// File name for a new report under `dir`, e.g.
/// `run_report_suspend_ab12cd34ef567890_20260827_141503.csv`
///
/// The CSV fingerprint ties the report to its exact input. If a run in
/// the same second already produced this name, a numeric suffix keeps the
/// earlier report intact.
pub fn report_path(dir: &Path, summary: &RunSummary, fingerprint: &str) -> PathBuf {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let base = format!(
        "run_report_{}_{}_{}",
        summary.operation, fingerprint, timestamp
    );

    let mut path = dir.join(format!("{}.csv", base));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{}_{}.csv", base, n));
        n += 1;
    }
    path
}

/// Write the run summary as a CSV report
///
/// Processed rows come first, then invalid rows with an `invalid` result,
/// so the report accounts for every row the run touched.
pub fn write_report(summary: &RunSummary, output: &mut dyn Write) -> Result<(), EngineError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record([
        "identifier",
        "email",
        "operation",
        "mode",
        "result",
        "error",
        "retries",
    ])?;

    let mode = if summary.dry_run {
        "dry-run"
    } else if summary.test_mode {
        "test"
    } else {
        "live"
    };

    for outcome in &summary.outcomes {
        let result = if outcome.succeeded {
            "succeeded"
        } else {
            "failed"
        };
        writer.write_record(&[
            outcome.row.identifier().to_string(),
            outcome.row.email.clone(),
            summary.operation.to_string(),
            mode.to_string(),
            result.to_string(),
            outcome
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default(),
            outcome.retries_used.to_string(),
        ])?;
    }

    for invalid in &summary.invalid {
        writer.write_record(&[
            format!("line {}", invalid.line),
            String::new(),
            summary.operation.to_string(),
            mode.to_string(),
            "invalid".to_string(),
            invalid.reason.clone(),
            "0".to_string(),
        ])?;
    }

    writer
        .flush()
        .map_err(|e| EngineError::Io {
            message: e.to_string(),
        })?;

    Ok(())
}
