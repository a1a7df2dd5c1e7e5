//! Error types for the bulk lifecycle engine
//!
//! This module defines all error types that can occur during a bulk run.
//! Errors are designed to be descriptive and user-friendly for CLI output.
//!
//! # Error Categories
//!
//! - **Run-level errors**: configuration problems, CSV structure problems,
//!   and checkpoint persistence failures. These abort the run.
//! - **Row-level errors**: validation failures and remote call failures.
//!   These become part of a row's outcome and never abort the run.
//! - **Remote errors**: the closed set of failure modes a status-change call
//!   can produce, split into retryable and terminal kinds.

use thiserror::Error;

/// Failure modes of a remote directory call
///
/// This is a closed set: the retry policy decides retryable vs terminal by
/// matching variants, not by inspecting strings or status codes at the call
/// site.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Credentials were rejected (HTTP 401)
    ///
    /// Terminal: retrying cannot change the outcome.
    #[error("authentication failed (HTTP 401)")]
    Unauthorized,

    /// Credentials lack the required permissions (HTTP 403)
    ///
    /// Terminal: retrying cannot change the outcome.
    #[error("insufficient permissions (HTTP 403)")]
    Forbidden,

    /// The account identifier was not found (HTTP 404)
    ///
    /// Terminal: the row fails immediately and is never retried.
    #[error("account not found (HTTP 404)")]
    NotFound,

    /// The API throttled the request (HTTP 429)
    #[error("rate limited (HTTP 429)")]
    RateLimited,

    /// The API returned a server-side error (HTTP 5xx)
    #[error("server error (HTTP {status})")]
    Server {
        /// The HTTP status code returned
        status: u16,
    },

    /// The request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// The request failed below HTTP (DNS, connect, TLS, ...)
    #[error("network error: {message}")]
    Network {
        /// Description of the transport failure
        message: String,
    },

    /// The API returned an unexpected status code
    ///
    /// Treated as terminal: we don't know what retrying would do.
    #[error("unexpected response (HTTP {status})")]
    Unexpected {
        /// The HTTP status code returned
        status: u16,
    },
}

impl RemoteError {
    /// Whether the retry policy may re-attempt this failure
    ///
    /// Transient network failures and 429/5xx responses are retryable;
    /// 401/403/404 and unexpected statuses are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RemoteError::RateLimited
                | RemoteError::Server { .. }
                | RemoteError::Timeout
                | RemoteError::Network { .. }
        )
    }
}

/// Main error type for the bulk lifecycle engine
///
/// Run-level variants (configuration, parse, persistence, concurrent-run,
/// cancelled) propagate to the caller and terminate the run with a non-zero
/// status. Row-level variants are recorded in row outcomes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Input is unusable before any row is read
    ///
    /// Fatal: e.g. the required `email` column is missing.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem
        message: String,
    },

    /// File not found at the specified path
    ///
    /// Fatal: processing cannot start.
    #[error("file not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// The CSV structure itself could not be parsed
    ///
    /// Fatal when it affects the header; individual malformed records are
    /// reported as [`EngineError::Validation`] instead.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// A row failed validation (empty or malformed email)
    ///
    /// Recoverable: the row is skipped, reported, and the run continues.
    #[error("invalid row at line {line}: {reason}")]
    Validation {
        /// 1-based line number in the input file
        line: u64,
        /// Why the row was rejected
        reason: String,
    },

    /// A remote call failed terminally for one row
    ///
    /// Recoverable: the row is marked failed and the run continues.
    #[error("remote call failed: {0}")]
    Remote(#[from] RemoteError),

    /// The checkpoint could not be persisted
    ///
    /// Fatal: proceeding without durability would break resume safety.
    #[error("checkpoint persistence failed: {message}")]
    Persistence {
        /// Description of the persistence failure
        message: String,
    },

    /// Another run appears to own the checkpoint for this CSV and operation
    ///
    /// Fatal: concurrent runs against the same input are not supported.
    #[error("another run appears active for this CSV and operation (checkpoint updated {age_secs}s ago)")]
    ConcurrentRun {
        /// Seconds since the existing checkpoint was last touched
        age_secs: i64,
    },

    /// The operator interrupted the run between rows
    ///
    /// The checkpoint is left intact for a future resume.
    #[error("run cancelled by operator")]
    Cancelled,
}

// Conversion from io::Error to EngineError
impl From<std::io::Error> for EngineError {
    fn from(error: std::io::Error) -> Self {
        EngineError::Io {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to EngineError
impl From<csv::Error> for EngineError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());
        EngineError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

impl EngineError {
    /// Create a Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        EngineError::Configuration {
            message: message.into(),
        }
    }

    /// Create a Validation error
    pub fn validation(line: u64, reason: impl Into<String>) -> Self {
        EngineError::Validation {
            line,
            reason: reason.into(),
        }
    }

    /// Create a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        EngineError::Persistence {
            message: message.into(),
        }
    }
}
