//! CSV schema resolution
//!
//! Maps arbitrary header names onto the canonical fields (email, account id,
//! display name, status) using a fixed alias table with case-insensitive
//! matching. Resolution happens once per run; column order and unrecognized
//! extra columns are irrelevant.
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::EngineError;

/// Accepted header spellings for the mandatory email column
pub const EMAIL_ALIASES: &[&str] = &["email", "e-mail"];

/// Accepted header spellings for the account id column
pub const ACCOUNT_ID_ALIASES: &[&str] = &["user id", "user_id", "account_id", "account id"];

/// Accepted header spellings for the display name column
pub const DISPLAY_NAME_ALIASES: &[&str] = &["user name", "user_name", "name"];

/// Accepted header spellings for the status column
pub const STATUS_ALIASES: &[&str] = &["user status", "user_status", "status"];

/// Mapping from canonical field to source column index
///
/// `email` is mandatory; all other fields are optional and yield `None`
/// for every row when their column is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaMap {
    /// Index of the email column
    pub email: usize,

    /// Index of the account id column, if present
    pub account_id: Option<usize>,

    /// Index of the display name column, if present
    pub display_name: Option<usize>,

    /// Index of the status column, if present
    pub status: Option<usize>,
}

impl SchemaMap {
    /// Resolve the header row against the alias table
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no email column is found; this
    /// fails the whole run before any row is read.
    pub fn resolve<'a, I>(headers: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let normalized: Vec<String> = headers
            .into_iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let email = find_column(&normalized, EMAIL_ALIASES).ok_or_else(|| {
            EngineError::configuration("required 'email' column not found in CSV header")
        })?;

        Ok(SchemaMap {
            email,
            account_id: find_column(&normalized, ACCOUNT_ID_ALIASES),
            display_name: find_column(&normalized, DISPLAY_NAME_ALIASES),
            status: find_column(&normalized, STATUS_ALIASES),
        })
    }

    /// Whether the input carries a recognized status column
    pub fn status_column_present(&self) -> bool {
        self.status.is_some()
    }
}

/// Find the index of the first header matching any alias
fn find_column(normalized_headers: &[String], aliases: &[&str]) -> Option<usize> {
    for alias in aliases {
        if let Some(idx) = normalized_headers.iter().position(|h| h == alias) {
            return Some(idx);
        }
    }
    None
}
