//! Core trait for the remote directory capability
//!
//! The engine treats the HTTP transport as an external collaborator:
//! "change account status given an identifier". The trait seam lets the
//! batch runner be tested against scripted in-memory fakes and keeps HTTP
//! types out of the core.

use async_trait::async_trait;

use crate::types::{Operation, RemoteError};

/// Remote capability over the cloud identity provider's admin API
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Apply the requested lifecycle change to an account
    ///
    /// `account_id` is the semantic identifier (the suffix of a composite
    /// `cloudId:accountId` form has already been extracted by the caller).
    async fn change_status(
        &self,
        account_id: &str,
        operation: Operation,
    ) -> Result<(), RemoteError>;

    /// Look up an account id by email
    ///
    /// Used only when the CSV did not provide an id. Returns `Ok(None)` when
    /// no account matches the email.
    async fn find_account_id(&self, email: &str) -> Result<Option<String>, RemoteError>;
}
