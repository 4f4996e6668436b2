//! Turn exported document content plus revision metadata into a
//! [`FormattedPayload`].
//!
//! ```text
//! ExportedContent ──▶ normalize ──▶ byline ──▶ sections ──▶ FormattedPayload
//!                     (html / markdown)
//! ```
//!
//! Raw HTML and placeholder messages skip every stage: they are served
//! exactly as received.

use crate::config::LibraryConfig;
use crate::output::{FormattedPayload, RevisionInfo};
use crate::pipeline::{byline, normalize, sections};
use tracing::debug;

/// Document body as it came back from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportedContent {
    /// Rich-text export (documents).
    Html(String),
    /// Plain-text export (presentations). Markdown syntax is honoured.
    PlainText(String),
    /// A stored HTML file, served unmodified.
    Raw(String),
    /// Explanation shown in place of an unsupported resource.
    Placeholder(String),
}

/// Build the payload for one document.
///
/// `byline` prefers an in-body attribution, then the revision author, then
/// [`LibraryConfig::default_byline`], so it is never empty. `created_by` is
/// always the revision author (possibly empty).
pub fn get_processed_doc_attributes(
    content: &ExportedContent,
    revision: &RevisionInfo,
    config: &LibraryConfig,
) -> FormattedPayload {
    let created_by = revision.created_by().to_string();
    let fallback = if created_by.trim().is_empty() {
        config.default_byline.as_str()
    } else {
        created_by.as_str()
    };

    let normalized = match content {
        ExportedContent::Raw(s) | ExportedContent::Placeholder(s) => {
            return FormattedPayload {
                html: s.clone(),
                byline: fallback.to_string(),
                created_by,
                sections: Vec::new(),
            };
        }
        ExportedContent::Html(s) => normalize::normalize_html(s),
        ExportedContent::PlainText(s) => normalize::render_markdown(s),
    };

    let found = byline::fetch_byline(&normalized, fallback);
    let html = if found.byline_found && config.strip_byline_paragraph {
        found.html
    } else {
        normalized
    };

    let split = sections::split_sections(&html);
    debug!(
        "Formatted document: byline_found={}, {} sections, {} bytes",
        found.byline_found,
        split.sections.len(),
        html.len()
    );

    FormattedPayload {
        html,
        byline: found.byline,
        created_by,
        sections: split.sections,
    }
}
