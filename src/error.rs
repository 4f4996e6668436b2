//! Error types for the library-docs crate.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`LibraryError`], **fatal**: the document cannot be served at all
//!   (no credentials, the content export failed, bad configuration).
//!   Returned as `Err(LibraryError)` from [`crate::fetch::Library::fetch_doc`].
//!
//! * [`ClientError`], **per call**: a single request to the document service
//!   failed. A failed *content* call is wrapped into
//!   [`LibraryError::ContentFetchFailed`]; a failed *revision* call is logged
//!   and replaced by the empty [`crate::output::RevisionInfo`] sentinel.
//!
//! An unsupported resource type is not an error at all: it is served as a
//! normal payload whose `html` explains the limitation.

use thiserror::Error;

/// All fatal errors returned by the library.
#[derive(Debug, Error)]
pub enum LibraryError {
    // ── Auth errors ───────────────────────────────────────────────────────
    /// The auth provider could not produce credentials.
    #[error("Credentials unavailable: {detail}")]
    CredentialsUnavailable { detail: String },

    // ── Transport errors ──────────────────────────────────────────────────
    /// Exporting or downloading the document body failed.
    #[error("Failed to fetch content for document '{id}': {source}")]
    ContentFetchFailed {
        id: String,
        #[source]
        source: ClientError,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failed request to the document service.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The service answered with a non-success status.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// The request never got an answer (DNS, TLS, timeout, reset).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The answer arrived but could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ClientError {
    /// True when the service reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Http { status: 404, .. })
    }
}
