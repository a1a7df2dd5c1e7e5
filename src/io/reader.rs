//! CSV ingestion
//!
//! Reads the input CSV once, resolves the header through the schema
//! resolver, and produces a [`RowBatch`] of canonical rows plus the content
//! fingerprint that ties checkpoints to this exact input.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, missing email column) are returned from
//!   [`read_batch`] before any row is processed.
//! - Individual malformed rows (empty or malformed email, ragged records)
//!   are collected as [`InvalidRow`] entries and reported in the summary;
//!   they never abort the run.
//!
//! Rows are de-duplicated by lower-cased email; the first occurrence wins.

use std::collections::HashSet;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use sha2::{Digest, Sha256};

use crate::io::schema::SchemaMap;
use crate::types::{EngineError, InvalidRow, Row, RowBatch};

/// Length of the hex fingerprint kept from the content digest
const FINGERPRINT_LEN: usize = 16;

/// Read and resolve the input CSV into a [`RowBatch`]
///
/// # Errors
///
/// Returns an error if the file does not exist, cannot be read, has an
/// unparseable header, or lacks an email column.
pub fn read_batch(path: &Path) -> Result<RowBatch, EngineError> {
    if !path.exists() {
        return Err(EngineError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read(path)?;
    let fingerprint = fingerprint(&content);

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_slice());

    let headers = reader.headers()?.clone();
    let schema = SchemaMap::resolve(headers.iter())?;

    let mut rows = Vec::new();
    let mut invalid = Vec::new();
    let mut seen_emails: HashSet<String> = HashSet::new();

    // Header is line 1; the first record is line 2.
    for (idx, record) in reader.records().enumerate() {
        let line = idx as u64 + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                invalid.push(InvalidRow {
                    line,
                    reason: format!("CSV parse error: {}", e),
                });
                continue;
            }
        };

        let email = record
            .get(schema.email)
            .unwrap_or("")
            .trim()
            .to_lowercase();
        if email.is_empty() {
            invalid.push(InvalidRow {
                line,
                reason: "missing email".to_string(),
            });
            continue;
        }
        if !email.contains('@') {
            invalid.push(InvalidRow {
                line,
                reason: format!("malformed email '{}'", email),
            });
            continue;
        }
        if !seen_emails.insert(email.clone()) {
            tracing::debug!(line, email = %email, "duplicate email, keeping first occurrence");
            continue;
        }

        rows.push(Row {
            email,
            account_id: optional_field(&record, schema.account_id),
            display_name: optional_field(&record, schema.display_name),
            raw_status: optional_field(&record, schema.status),
        });
    }

    Ok(RowBatch {
        rows,
        invalid,
        status_column_present: schema.status_column_present(),
        fingerprint,
    })
}

/// Extract an optional column value, mapping blanks to `None`
fn optional_field(record: &csv::StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Hex digest of the raw CSV content, truncated for readable file names
fn fingerprint(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    let mut hex = hex::encode(digest);
    hex.truncate(FINGERPRINT_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_read_batch_missing_file() {
        let result = read_batch(Path::new("nonexistent.csv"));
        assert!(matches!(result, Err(EngineError::FileNotFound { .. })));
    }

    #[test]
    fn test_read_batch_missing_email_column_is_fatal() {
        let file = create_temp_csv("user id,status\nabc,active\n");
        let result = read_batch(file.path());
        assert!(matches!(result, Err(EngineError::Configuration { .. })));
    }

    #[test]
    fn test_read_batch_full_schema() {
        let file = create_temp_csv(
            "Email,Account ID,User name,User status\n\
             Alice@Example.com,cloud-1:abc123,Alice,active\n\
             bob@example.com,,Bob,suspended\n",
        );
        let batch = read_batch(file.path()).unwrap();

        assert!(batch.status_column_present);
        assert_eq!(batch.rows.len(), 2);
        assert!(batch.invalid.is_empty());

        assert_eq!(batch.rows[0].email, "alice@example.com");
        assert_eq!(batch.rows[0].account_id.as_deref(), Some("cloud-1:abc123"));
        assert_eq!(batch.rows[0].resolved_account_id(), Some("abc123"));
        assert_eq!(batch.rows[0].display_name.as_deref(), Some("Alice"));
        assert_eq!(batch.rows[0].raw_status.as_deref(), Some("active"));

        // Blank optional fields become None
        assert_eq!(batch.rows[1].account_id, None);
    }

    #[test]
    fn test_read_batch_email_only_schema() {
        let file = create_temp_csv("email\na@example.com\nb@example.com\n");
        let batch = read_batch(file.path()).unwrap();

        assert!(!batch.status_column_present);
        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.rows[0].account_id, None);
        assert_eq!(batch.rows[0].raw_status, None);
    }

    #[test]
    fn test_read_batch_reports_invalid_rows_and_continues() {
        let file = create_temp_csv(
            "email,status\n\
             a@example.com,active\n\
             ,active\n\
             not-an-email,active\n\
             b@example.com,active\n",
        );
        let batch = read_batch(file.path()).unwrap();

        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.invalid.len(), 2);
        assert_eq!(batch.invalid[0].line, 3);
        assert!(batch.invalid[0].reason.contains("missing email"));
        assert_eq!(batch.invalid[1].line, 4);
        assert!(batch.invalid[1].reason.contains("malformed email"));
    }

    #[test]
    fn test_read_batch_dedupes_by_email_first_wins() {
        let file = create_temp_csv(
            "email,name\n\
             a@example.com,First\n\
             A@EXAMPLE.COM,Second\n",
        );
        let batch = read_batch(file.path()).unwrap();

        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].display_name.as_deref(), Some("First"));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let file_a = create_temp_csv("email\na@example.com\n");
        let file_b = create_temp_csv("email\nb@example.com\n");
        let file_a2 = create_temp_csv("email\na@example.com\n");

        let fp_a = read_batch(file_a.path()).unwrap().fingerprint;
        let fp_b = read_batch(file_b.path()).unwrap().fingerprint;
        let fp_a2 = read_batch(file_a2.path()).unwrap().fingerprint;

        assert_eq!(fp_a.len(), FINGERPRINT_LEN);
        assert_ne!(fp_a, fp_b);
        assert_eq!(fp_a, fp_a2);
    }

    #[test]
    fn test_read_batch_empty_after_header() {
        let file = create_temp_csv("email,status\n");
        let batch = read_batch(file.path()).unwrap();
        assert!(batch.rows.is_empty());
        assert!(batch.invalid.is_empty());
        assert!(batch.status_column_present);
    }
}
