//! Resource types and the decisions that hang off them.
//!
//! Every branch on resource type (export format, revision support, cache
//! eligibility) is an exhaustive `match` on [`ResourceType`], so adding a
//! type fails to compile until each decision point handles it.

use std::fmt;

/// Mimetype prefix the document service uses for its native formats.
const NATIVE_MIME_PREFIX: &str = "application/vnd.google-apps.";

/// The category of a stored document, as requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// Rich-text document; exported as HTML.
    Document,
    /// Slide deck; exported as plain text (no HTML export exists for slides).
    Presentation,
    /// An uploaded `text/html` file, served byte-for-byte.
    RawHtml,
    /// Anything else, kept verbatim for the placeholder message.
    Unsupported(String),
}

/// How the body of a resource is retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// `files.export` with `text/html`.
    Html,
    /// `files.export` with `text/plain`.
    PlainText,
    /// `files.get` with `alt=media`.
    Raw,
}

impl ExportFormat {
    /// Target mimetype for an export call, `None` for raw downloads.
    pub fn mime_type(self) -> Option<&'static str> {
        match self {
            ExportFormat::Html => Some("text/html"),
            ExportFormat::PlainText => Some("text/plain"),
            ExportFormat::Raw => None,
        }
    }
}

impl ResourceType {
    /// Parse the caller-supplied resource type. Never fails: unknown values
    /// become [`ResourceType::Unsupported`].
    pub fn parse(raw: &str) -> Self {
        match raw {
            "document" => ResourceType::Document,
            "presentation" => ResourceType::Presentation,
            "text/html" => ResourceType::RawHtml,
            other => ResourceType::Unsupported(other.to_string()),
        }
    }

    /// The wire name of this resource type.
    pub fn as_str(&self) -> &str {
        match self {
            ResourceType::Document => "document",
            ResourceType::Presentation => "presentation",
            ResourceType::RawHtml => "text/html",
            ResourceType::Unsupported(raw) => raw,
        }
    }

    /// How the body is retrieved; `None` when the type cannot be displayed.
    pub fn export_format(&self) -> Option<ExportFormat> {
        match self {
            ResourceType::Document => Some(ExportFormat::Html),
            ResourceType::Presentation => Some(ExportFormat::PlainText),
            ResourceType::RawHtml => Some(ExportFormat::Raw),
            ResourceType::Unsupported(_) => None,
        }
    }

    /// Whether the document service keeps per-revision metadata for this type.
    pub fn supports_revisions(&self) -> bool {
        match self {
            ResourceType::Document | ResourceType::Presentation => true,
            ResourceType::RawHtml | ResourceType::Unsupported(_) => false,
        }
    }

    /// The native mimetype reported by revisions of this type.
    pub fn native_mime_type(&self) -> Option<String> {
        match self {
            ResourceType::Document | ResourceType::Presentation => {
                Some(format!("{NATIVE_MIME_PREFIX}{}", self.as_str()))
            }
            ResourceType::RawHtml | ResourceType::Unsupported(_) => None,
        }
    }

    /// Human-readable explanation served in place of unsupported content.
    pub fn unsupported_message(&self) -> String {
        format!("Library does not support viewing {}s yet.", self.as_str())
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when a revision's mimetype belongs to a revision-capable type, which
/// is the condition for caching its payload.
pub fn is_revision_capable_mime(mime_type: &str) -> bool {
    [ResourceType::Document, ResourceType::Presentation]
        .iter()
        .filter_map(ResourceType::native_mime_type)
        .any(|m| m == mime_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_types() {
        assert_eq!(ResourceType::parse("document"), ResourceType::Document);
        assert_eq!(ResourceType::parse("presentation"), ResourceType::Presentation);
        assert_eq!(ResourceType::parse("text/html"), ResourceType::RawHtml);
        assert_eq!(
            ResourceType::parse("spreadsheet"),
            ResourceType::Unsupported("spreadsheet".into())
        );
    }

    #[test]
    fn wire_names_round_trip() {
        for raw in ["document", "presentation", "text/html", "badtype"] {
            assert_eq!(ResourceType::parse(raw).as_str(), raw);
        }
    }

    #[test]
    fn export_formats() {
        assert_eq!(
            ResourceType::Document.export_format().and_then(ExportFormat::mime_type),
            Some("text/html")
        );
        assert_eq!(
            ResourceType::Presentation.export_format().and_then(ExportFormat::mime_type),
            Some("text/plain")
        );
        assert_eq!(ResourceType::RawHtml.export_format(), Some(ExportFormat::Raw));
        assert_eq!(ResourceType::parse("folder").export_format(), None);
    }

    #[test]
    fn revision_support() {
        assert!(ResourceType::Document.supports_revisions());
        assert!(ResourceType::Presentation.supports_revisions());
        assert!(!ResourceType::RawHtml.supports_revisions());
        assert!(!ResourceType::parse("spreadsheet").supports_revisions());
    }

    #[test]
    fn revision_capable_mimes() {
        assert!(is_revision_capable_mime("application/vnd.google-apps.document"));
        assert!(is_revision_capable_mime("application/vnd.google-apps.presentation"));
        assert!(!is_revision_capable_mime("application/vnd.google-apps.spreadsheet"));
        assert!(!is_revision_capable_mime("text/html"));
        assert!(!is_revision_capable_mime(""));
    }

    #[test]
    fn unsupported_message_pluralises_the_raw_name() {
        assert_eq!(
            ResourceType::parse("badtype").unsupported_message(),
            "Library does not support viewing badtypes yet."
        );
    }
}
