//! Configuration types for document fetching and formatting.
//!
//! All behaviour is controlled through [`LibraryConfig`], built via its
//! [`LibraryConfigBuilder`]. The same config is shared by the HTTP client,
//! the formatter and the fetch orchestrator.

use crate::error::LibraryError;
use serde::{Deserialize, Serialize};

/// Root of the Drive v3 REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Configuration for a [`crate::fetch::Library`].
///
/// # Example
/// ```rust
/// use library_docs::LibraryConfig;
///
/// let config = LibraryConfig::builder()
///     .request_timeout_secs(10)
///     .default_byline("The Newsroom")
///     .build()
///     .unwrap();
/// assert_eq!(config.revision_id, "1");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Base URL of the document service. Default: [`DEFAULT_API_BASE_URL`].
    pub api_base_url: String,

    /// Per-request HTTP timeout in seconds. Default: 30.
    pub request_timeout_secs: u64,

    /// Revision looked up for authorship metadata. Default: `"1"`.
    ///
    /// The first revision names the person who created the document, which is
    /// what `createdBy` reports.
    pub revision_id: String,

    /// Field mask passed to the revision lookup. Default: `"*"`.
    pub revision_fields: String,

    /// Byline used when neither the body nor the revision names anyone.
    /// Default: `"Unknown"`.
    pub default_byline: String,

    /// Remove the detected byline paragraph from the rendered html. Default: true.
    pub strip_byline_paragraph: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            revision_id: "1".to_string(),
            revision_fields: "*".to_string(),
            default_byline: "Unknown".to_string(),
            strip_byline_paragraph: true,
        }
    }
}

impl LibraryConfig {
    /// Create a new builder for `LibraryConfig`.
    pub fn builder() -> LibraryConfigBuilder {
        LibraryConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`LibraryConfig`].
#[derive(Debug)]
pub struct LibraryConfigBuilder {
    config: LibraryConfig,
}

impl LibraryConfigBuilder {
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn revision_id(mut self, id: impl Into<String>) -> Self {
        self.config.revision_id = id.into();
        self
    }

    pub fn revision_fields(mut self, fields: impl Into<String>) -> Self {
        self.config.revision_fields = fields.into();
        self
    }

    pub fn default_byline(mut self, byline: impl Into<String>) -> Self {
        self.config.default_byline = byline.into();
        self
    }

    pub fn strip_byline_paragraph(mut self, v: bool) -> Self {
        self.config.strip_byline_paragraph = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<LibraryConfig, LibraryError> {
        let c = &self.config;
        if !c.api_base_url.starts_with("http://") && !c.api_base_url.starts_with("https://") {
            return Err(LibraryError::InvalidConfig(format!(
                "API base URL must be http(s), got '{}'",
                c.api_base_url
            )));
        }
        if c.request_timeout_secs == 0 {
            return Err(LibraryError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        if c.revision_id.trim().is_empty() {
            return Err(LibraryError::InvalidConfig(
                "Revision id must not be empty".into(),
            ));
        }
        if c.default_byline.trim().is_empty() {
            return Err(LibraryError::InvalidConfig(
                "Default byline must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
