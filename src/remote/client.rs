//! REST implementation of the directory capability
//!
//! Thin `reqwest` client over the identity provider's admin API. All
//! HTTP-status knowledge lives here: responses are mapped onto the closed
//! [`RemoteError`] set and never leak reqwest types into the core.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::core::traits::DirectoryClient;
use crate::types::{EngineError, Operation, RemoteError};

/// Page size for directory user listings
const PAGE_LIMIT: u32 = 100;

/// `reqwest`-backed [`DirectoryClient`]
pub struct RestDirectoryClient {
    client: reqwest::Client,
    base_url: String,
    org_id: String,
}

#[derive(Debug, Deserialize)]
struct UsersPage {
    #[serde(default)]
    data: Vec<UserEntry>,
    #[serde(default)]
    links: PageLinks,
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    #[serde(default)]
    email: String,
    #[serde(rename = "accountId")]
    account_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PageLinks {
    next: Option<String>,
}

impl RestDirectoryClient {
    /// Build a client from the API configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the API key contains characters
    /// that cannot form a header value, or the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, EngineError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| EngineError::configuration("API key contains invalid characters"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| EngineError::configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(RestDirectoryClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            org_id: config.org_id.clone(),
        })
    }

    /// Probe the admin API with the configured credentials
    ///
    /// Issues a minimal directory listing request so a bad key or org id
    /// surfaces before any row is processed, instead of as per-row
    /// failures mid-batch.
    pub async fn verify_credentials(&self) -> Result<(), RemoteError> {
        let url = format!(
            "{}/admin/v2/orgs/{}/users?limit=1",
            self.base_url, self.org_id
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = resp.status();
        if status.is_success() {
            tracing::debug!("credentials verified");
            Ok(())
        } else {
            Err(Self::status_error(status))
        }
    }

    /// Map a transport failure onto the closed error set
    fn transport_error(e: reqwest::Error) -> RemoteError {
        if e.is_timeout() {
            RemoteError::Timeout
        } else {
            RemoteError::Network {
                message: e.to_string(),
            }
        }
    }

    /// Map a non-success HTTP status onto the closed error set
    fn status_error(status: StatusCode) -> RemoteError {
        match status {
            StatusCode::UNAUTHORIZED => RemoteError::Unauthorized,
            StatusCode::FORBIDDEN => RemoteError::Forbidden,
            StatusCode::NOT_FOUND => RemoteError::NotFound,
            StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited,
            s if s.is_server_error() => RemoteError::Server { status: s.as_u16() },
            s => RemoteError::Unexpected { status: s.as_u16() },
        }
    }
}

#[async_trait]
impl DirectoryClient for RestDirectoryClient {
    async fn change_status(
        &self,
        account_id: &str,
        operation: Operation,
    ) -> Result<(), RemoteError> {
        let action = match operation {
            Operation::Suspend => "suspend-access",
            Operation::Restore => "restore-access",
        };
        let url = format!(
            "{}/admin/v1/orgs/{}/directory/users/{}/{}",
            self.base_url, self.org_id, account_id, action
        );

        let resp = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = resp.status();
        if status.is_success() {
            tracing::debug!(account_id, action, "status change accepted");
            Ok(())
        } else {
            Err(Self::status_error(status))
        }
    }

    async fn find_account_id(&self, email: &str) -> Result<Option<String>, RemoteError> {
        let mut cursor: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/admin/v2/orgs/{}/users?limit={}",
                self.base_url, self.org_id, PAGE_LIMIT
            );
            if let Some(ref c) = cursor {
                url.push_str(&format!("&cursor={}", c));
            }

            let resp = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(Self::transport_error)?;

            let status = resp.status();
            if !status.is_success() {
                return Err(Self::status_error(status));
            }

            let page: UsersPage = resp.json().await.map_err(Self::transport_error)?;
            for entry in &page.data {
                if entry.email.eq_ignore_ascii_case(email) {
                    return Ok(entry.account_id.clone());
                }
            }

            match page.links.next {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            org_id: "org-1".to_string(),
            api_key: "test-key".to_string(),
            timeout: Duration::from_secs(5),
            state_dir: "logs".into(),
        }
    }

    #[tokio::test]
    async fn test_change_status_success_on_204() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/admin/v1/orgs/org-1/directory/users/abc123/suspend-access",
            ))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = RestDirectoryClient::new(&test_config(&server.uri())).unwrap();
        let result = client.change_status("abc123", Operation::Suspend).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_change_status_restore_uses_restore_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/admin/v1/orgs/org-1/directory/users/abc123/restore-access",
            ))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = RestDirectoryClient::new(&test_config(&server.uri())).unwrap();
        let result = client.change_status("abc123", Operation::Restore).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_change_status_maps_status_codes() {
        for (code, expected) in [
            (401, RemoteError::Unauthorized),
            (403, RemoteError::Forbidden),
            (404, RemoteError::NotFound),
            (429, RemoteError::RateLimited),
            (500, RemoteError::Server { status: 500 }),
            (503, RemoteError::Server { status: 503 }),
            (418, RemoteError::Unexpected { status: 418 }),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(code))
                .mount(&server)
                .await;

            let client = RestDirectoryClient::new(&test_config(&server.uri())).unwrap();
            let result = client.change_status("abc123", Operation::Suspend).await;
            assert_eq!(result, Err(expected), "status {}", code);
        }
    }

    #[tokio::test]
    async fn test_find_account_id_matches_case_insensitively() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/v2/orgs/org-1/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"email": "Other@Example.com", "accountId": "other-id"},
                    {"email": "Alice@Example.com", "accountId": "alice-id"}
                ],
                "links": {}
            })))
            .mount(&server)
            .await;

        let client = RestDirectoryClient::new(&test_config(&server.uri())).unwrap();
        let found = client.find_account_id("alice@example.com").await.unwrap();
        assert_eq!(found.as_deref(), Some("alice-id"));
    }

    #[tokio::test]
    async fn test_find_account_id_follows_pagination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/v2/orgs/org-1/users"))
            .and(query_param("cursor", "page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"email": "bob@example.com", "accountId": "bob-id"}],
                "links": {}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/v2/orgs/org-1/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"email": "a@example.com", "accountId": "a-id"}],
                "links": {"next": "page2"}
            })))
            .mount(&server)
            .await;

        let client = RestDirectoryClient::new(&test_config(&server.uri())).unwrap();
        let found = client.find_account_id("bob@example.com").await.unwrap();
        assert_eq!(found.as_deref(), Some("bob-id"));
    }

    #[tokio::test]
    async fn test_verify_credentials_accepts_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/v2/orgs/org-1/users"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [],
                "links": {}
            })))
            .mount(&server)
            .await;

        let client = RestDirectoryClient::new(&test_config(&server.uri())).unwrap();
        assert!(client.verify_credentials().await.is_ok());
    }

    #[tokio::test]
    async fn test_verify_credentials_reports_rejected_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = RestDirectoryClient::new(&test_config(&server.uri())).unwrap();
        assert_eq!(
            client.verify_credentials().await,
            Err(RemoteError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn test_verify_credentials_reports_missing_permissions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = RestDirectoryClient::new(&test_config(&server.uri())).unwrap();
        assert_eq!(
            client.verify_credentials().await,
            Err(RemoteError::Forbidden)
        );
    }

    #[tokio::test]
    async fn test_find_account_id_miss_returns_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [],
                "links": {}
            })))
            .mount(&server)
            .await;

        let client = RestDirectoryClient::new(&test_config(&server.uri())).unwrap();
        let found = client.find_account_id("ghost@example.com").await.unwrap();
        assert_eq!(found, None);
    }
}
