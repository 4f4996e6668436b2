//! Document service seams and their HTTP implementation.
//!
//! [`Library`](crate::fetch::Library) depends only on the [`AuthProvider`]
//! and [`DocumentClient`] traits, so tests and alternative backends can
//! swap in their own. [`DriveClient`] speaks the Drive v3 REST API with
//! `reqwest`; [`StaticTokenAuth`] hands it a bearer token.

use crate::config::LibraryConfig;
use crate::error::{ClientError, LibraryError};
use crate::output::RevisionInfo;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Credentials for one request to the document service.
#[derive(Clone)]
pub struct AuthHandle {
    token: String,
}

impl AuthHandle {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for AuthHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHandle")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Source of credentials, consulted once per uncached fetch.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn credentials(&self) -> Result<AuthHandle, LibraryError>;
}

/// A fixed bearer token, typically read from the environment.
#[derive(Clone)]
pub struct StaticTokenAuth {
    token: String,
}

impl StaticTokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Read the token from environment variable `var`.
    pub fn from_env(var: &str) -> Result<Self, LibraryError> {
        match std::env::var(var) {
            Ok(token) if !token.trim().is_empty() => Ok(Self::new(token.trim())),
            Ok(_) => Err(LibraryError::CredentialsUnavailable {
                detail: format!("{var} is empty"),
            }),
            Err(_) => Err(LibraryError::CredentialsUnavailable {
                detail: format!("{var} is not set"),
            }),
        }
    }
}

impl fmt::Debug for StaticTokenAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenAuth").finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn credentials(&self) -> Result<AuthHandle, LibraryError> {
        if self.token.is_empty() {
            return Err(LibraryError::CredentialsUnavailable {
                detail: "empty token".into(),
            });
        }
        Ok(AuthHandle::bearer(self.token.clone()))
    }
}

/// Remote document store operations.
#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// Export a native document to `mime_type` and return the body as text.
    async fn export_content(
        &self,
        auth: &AuthHandle,
        id: &str,
        mime_type: &str,
    ) -> Result<String, ClientError>;

    /// Download a stored file's bytes as text, unconverted.
    async fn get_raw_content(&self, auth: &AuthHandle, id: &str) -> Result<String, ClientError>;

    /// Look up one revision's metadata.
    async fn get_revision(
        &self,
        auth: &AuthHandle,
        id: &str,
        revision_id: &str,
        fields: &str,
    ) -> Result<RevisionInfo, ClientError>;
}

/// [`DocumentClient`] for the Drive v3 REST API.
#[derive(Debug, Clone)]
pub struct DriveClient {
    http: reqwest::Client,
    base_url: String,
}

impl DriveClient {
    /// Build a client honouring the configured base URL and timeout.
    pub fn new(config: &LibraryConfig) -> Result<Self, LibraryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LibraryError::Internal(format!("HTTP client setup failed: {e}")))?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn file_url(&self, id: &str) -> Result<reqwest::Url, ClientError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ClientError::Transport(format!("bad base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Transport("base URL cannot have a path".into()))?
            .push("files")
            .push(id);
        Ok(url)
    }

    async fn get_text(&self, auth: &AuthHandle, url: reqwest::Url) -> Result<String, ClientError> {
        debug!("GET {}", url);
        let response = self.send(auth, url).await?;
        response
            .text()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn send(
        &self,
        auth: &AuthHandle,
        url: reqwest::Url,
    ) -> Result<reqwest::Response, ClientError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(auth.token())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Transport(format!("timed out: {e}"))
                } else {
                    ClientError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .ok()
                .filter(|body| !body.trim().is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
            return Err(ClientError::Http {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl DocumentClient for DriveClient {
    async fn export_content(
        &self,
        auth: &AuthHandle,
        id: &str,
        mime_type: &str,
    ) -> Result<String, ClientError> {
        let mut url = self.file_url(id)?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Transport("base URL cannot have a path".into()))?
            .push("export");
        url.query_pairs_mut().append_pair("mimeType", mime_type);
        self.get_text(auth, url).await
    }

    async fn get_raw_content(&self, auth: &AuthHandle, id: &str) -> Result<String, ClientError> {
        let mut url = self.file_url(id)?;
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("supportsAllDrives", "true");
        self.get_text(auth, url).await
    }

    async fn get_revision(
        &self,
        auth: &AuthHandle,
        id: &str,
        revision_id: &str,
        fields: &str,
    ) -> Result<RevisionInfo, ClientError> {
        let mut url = self.file_url(id)?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Transport("base URL cannot have a path".into()))?
            .push("revisions")
            .push(revision_id);
        url.query_pairs_mut().append_pair("fields", fields);
        debug!("GET {}", url);
        let response = self.send(auth, url).await?;
        response
            .json::<RevisionInfo>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}
