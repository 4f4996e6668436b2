//! Data model shared by the pipeline, the cache and callers.
//!
//! Field names serialise in camelCase so payloads can be handed straight to
//! a JSON front end.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The unit that is formatted, cached and returned to callers.
///
/// `byline` is never empty. `created_by` is the authoritative metadata
/// author and may be empty when no revision data was available.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedPayload {
    pub html: String,
    pub byline: String,
    pub created_by: String,
    pub sections: Vec<Section>,
}

/// A top-level entry of the document outline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Plain text of the heading.
    pub heading: String,
    /// Anchor id of the heading element.
    pub id: String,
    /// In-page link to the heading, `#id`.
    pub url: String,
    /// Heading level that opened the section: 2, or 3 for a promoted subsection heading.
    pub level: u8,
    /// HTML between the heading and the first subsection.
    pub content: String,
    pub subsections: Vec<Subsection>,
}

/// A second-level entry; the outline never nests deeper.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subsection {
    pub heading: String,
    pub id: String,
    pub url: String,
    pub level: u8,
    /// HTML between this heading and the next section or subsection heading.
    pub content: String,
}

/// Revision metadata for a document.
///
/// The default value (all fields empty) is the "unavailable" sentinel used
/// when a type has no revision history or the lookup failed. It is never
/// represented by `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RevisionInfo {
    pub mime_type: String,
    pub modified_time: String,
    pub last_modifying_user: LastModifyingUser,
    /// Any other fields the service returned (`kind`, `published`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The user who made a revision. Empty when unknown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LastModifyingUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RevisionInfo {
    /// The "unsupported/unavailable" sentinel.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True for the sentinel: nothing was learned about the revision.
    pub fn is_empty(&self) -> bool {
        self.mime_type.is_empty()
            && self.modified_time.is_empty()
            && self.last_modifying_user.display_name.is_none()
    }

    /// Display name of the revision author, or `""`.
    pub fn created_by(&self) -> &str {
        self.last_modifying_user
            .display_name
            .as_deref()
            .unwrap_or("")
    }
}
