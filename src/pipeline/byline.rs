//! In-body byline detection.
//!
//! Writers often open a document with an attribution line, `By Jane Doe`,
//! that should replace the metadata author as the displayed byline. Only the
//! first non-empty paragraph is considered, and the pattern is anchored at
//! the start of that paragraph's text: `"I am standing by Port Authority"`
//! is not a byline because "by" is not in byline position.
//!
//! "Paragraph" means a `<p>` element: in markup, `<div>`s, list items and
//! bare text between tags never carry a byline. Input with no tags at all is
//! treated as one paragraph.
//!
//! ## Grammar
//!
//! ```text
//! byline := "by" (any case) WS name [terminator]
//! name   := word (sep word)*
//! word   := Uppercase letter, then letters/apostrophes/hyphens, or an initial "Q."
//! sep    := WS | "," [WS "and"] | WS ("and" | "&") WS
//! terminator := end of text | punctuation, followed by anything
//! ```

use crate::pipeline::markup;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_BYLINE: Lazy<Regex> = Lazy::new(|| {
    let word = r"\p{Lu}(?:\.|[\p{L}\p{M}'\u{2019}\-]*)";
    let sep = r"(?:\s*,\s*(?:and\s+)?|\s+(?:and|&)\s+|\s+)";
    Regex::new(&format!(
        r"(?s)^(?i:by)\s+({word}(?:{sep}{word})*)\s*(?:$|[.,;:!?|(\u{{2013}}\u{{2014}}].*$)"
    ))
    .unwrap()
});

/// Outcome of byline detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Byline {
    /// The detected name, or the fallback author.
    pub byline: String,
    /// True when the byline came from the body.
    pub byline_found: bool,
    /// The input with the byline paragraph removed (unchanged when not found).
    pub html: String,
}

/// Determine the displayed byline for a document body.
///
/// Never fails: when nothing matches, `byline` is `fallback_author`.
pub fn fetch_byline(html: &str, fallback_author: &str) -> Byline {
    let not_found = || Byline {
        byline: fallback_author.to_string(),
        byline_found: false,
        html: html.to_string(),
    };

    let Some((text, outer)) = leading_fragment(html) else {
        return not_found();
    };
    let Some(name) = match_byline(&text) else {
        return not_found();
    };

    let mut stripped = String::with_capacity(html.len());
    stripped.push_str(&html[..outer.start]);
    stripped.push_str(&html[outer.end..]);
    Byline {
        byline: name,
        byline_found: true,
        html: stripped.trim().to_string(),
    }
}

/// Apply the anchored byline grammar to a paragraph's text.
pub fn match_byline(text: &str) -> Option<String> {
    RE_BYLINE
        .captures(text.trim())
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Text and byte range of the first paragraph with visible text. Tag-free
/// input counts as a single paragraph.
fn leading_fragment(html: &str) -> Option<(String, std::ops::Range<usize>)> {
    let tags = markup::tags(html);
    if tags.is_empty() {
        let text = markup::text_content(html);
        return (!text.is_empty()).then(|| (text, 0..html.len()));
    }

    let mut i = 0;
    while i < tags.len() {
        if tags[i].opens("p") {
            let el = markup::element_at(html, &tags, i);
            let text = markup::text_content(&html[el.inner.clone()]);
            if !text.is_empty() {
                return Some((text, el.outer));
            }
            i = el.next.max(i + 1);
        } else {
            i += 1;
        }
    }
    None
}
