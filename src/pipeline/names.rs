//! Title cleanup and URL slugs.
//!
//! Document titles in the store carry ordering prefixes (`"003 - Budget"`),
//! trailing site labels (`"Budget | Newsroom"`) and file extensions from
//! uploads. [`clean_name`] removes that noise for display; [`slugify`] turns
//! a title or heading into a URL-safe path segment.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_LEADING_ORDINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[\s\-\u{2013}\u{2014}]*").unwrap());

/// Whitespace-delimited `|` and everything after it, up to the end. Only the
/// last segment matches because the tail may not contain another `|`.
static RE_TRAILING_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\|\s+[^|]*$").unwrap());

static RE_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[A-Za-z]{2,4}$").unwrap());

static RE_SLUG_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-]+").unwrap());
static RE_SLUG_INVALID: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\-]").unwrap());
static RE_SLUG_HYPHENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").unwrap());

/// Clean a stored title for display.
///
/// Applied in order:
/// 1. trim surrounding whitespace
/// 2. drop a leading run of digits and the spaces, hyphens, en or em dashes after it
/// 3. drop the last whitespace-surrounded `|` segment (`"one | two | three"` → `"one | two"`)
/// 4. drop a trailing `.ext` (2–4 letters) unless nothing would remain
///
/// ```rust
/// use library_docs::pipeline::names::clean_name;
///
/// assert_eq!(clean_name("123 – Budget | Newsroom"), "Budget");
/// assert_eq!(clean_name("nytimes.com.txt"), "nytimes.com");
/// ```
pub fn clean_name(raw: &str) -> String {
    let s = raw.trim();
    let s = RE_LEADING_ORDINAL.replace(s, "");
    let s = RE_TRAILING_SEGMENT.replace(&s, "");
    let s = s.trim();

    let without_ext = RE_EXTENSION.replace(s, "");
    if without_ext.trim().is_empty() {
        s.to_string()
    } else {
        without_ext.trim().to_string()
    }
}

/// Convert a title into a URL-safe slug made only of `[a-z0-9-]`.
///
/// Whitespace and hyphen runs become a single hyphen, every other character
/// outside the alphabet is dropped, and the result never starts or ends with
/// a hyphen. `slugify(slugify(x)) == slugify(x)`.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let hyphenated = RE_SLUG_SEPARATORS.replace_all(&lower, "-");
    let stripped = RE_SLUG_INVALID.replace_all(&hyphenated, "");
    let collapsed = RE_SLUG_HYPHENS.replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}

/// Append an ordinal suffix to a slug to keep ids unique within a document.
///
/// `occurrence` is 1-based; the first occurrence keeps the bare slug.
pub fn disambiguate(slug: &str, occurrence: usize) -> String {
    if occurrence <= 1 {
        slug.to_string()
    } else {
        format!("{slug}-{occurrence}")
    }
}
