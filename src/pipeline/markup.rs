//! Lenient tag-stream scanner.
//!
//! Byline detection and section splitting only need to know where elements
//! start and end, never a full tree. This module walks the tag stream with
//! regexes and recovers from anything malformed instead of rejecting it:
//!
//! - a tag with an unterminated quote is not a tag, it is text
//! - tags inside `<!-- comments -->` are ignored
//! - an element with no closing tag ends at the next block-level opening tag
//!   (or at the end of input)
//!
//! [`balance`] goes one step further and rewrites a fragment so that every
//! element it opens is closed.
//!
//! Every function here is total: no input makes it fail or panic.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static RE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<(/?)([A-Za-z][A-Za-z0-9]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#).unwrap()
});

static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?(?:-->|$)").unwrap());

static RE_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .unwrap()
});

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\u{00A0}]+").unwrap());

/// Elements that start a new block; an unclosed element ends before one of these.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "dd", "dt", "figure", "footer",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p", "pre", "section",
    "table", "tbody", "td", "th", "thead", "tr", "ul",
];

/// Elements that never have content or a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Blocks that may only hold inline content; a block opening inside one closes it.
const INLINE_ONLY_BLOCKS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6"];

/// One opening or closing tag found in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Lowercased element name.
    pub name: String,
    pub closing: bool,
    pub self_closing: bool,
    /// Raw attribute text between the name and `>`.
    pub attrs: &'a str,
    /// Byte span of the whole tag.
    pub span: Range<usize>,
}

impl Tag<'_> {
    /// True for an opening tag named `name`.
    pub fn opens(&self, name: &str) -> bool {
        !self.closing && self.name == name
    }

    /// Value of attribute `name`, if present.
    pub fn attr(&self, name: &str) -> Option<String> {
        attr(self.attrs, name)
    }
}

/// The extent of one element, as recovered by [`element_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Index of the opening tag in the tag list.
    pub open: usize,
    /// Byte range of the content between the tags.
    pub inner: Range<usize>,
    /// Byte range from the opening `<` to the end of the closing tag.
    pub outer: Range<usize>,
    /// Index of the first tag after the element.
    pub next: usize,
}

/// True when `name` starts a block.
pub fn is_block(name: &str) -> bool {
    BLOCK_TAGS.contains(&name)
}

/// All tags in document order, skipping those inside comments.
pub fn tags(html: &str) -> Vec<Tag<'_>> {
    let comments: Vec<Range<usize>> = RE_COMMENT.find_iter(html).map(|m| m.range()).collect();
    let in_comment = |pos: usize| comments.iter().any(|c| c.contains(&pos));

    RE_TAG
        .captures_iter(html)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if in_comment(whole.start()) {
                return None;
            }
            let attrs = caps.get(3).map_or("", |m| m.as_str());
            Some(Tag {
                name: caps[2].to_ascii_lowercase(),
                closing: !caps[1].is_empty(),
                self_closing: attrs.trim_end().ends_with('/'),
                attrs,
                span: whole.range(),
            })
        })
        .collect()
}

/// Recover the extent of the element opened by `tags[open]`.
///
/// Nested elements of the same name are balanced. If no closing tag is
/// found the element ends at the next block-level opening tag outside of it,
/// or at the end of input.
pub fn element_at(html: &str, tags: &[Tag<'_>], open: usize) -> Element {
    let start_tag = &tags[open];
    let inner_start = start_tag.span.end;

    if start_tag.self_closing {
        return Element {
            open,
            inner: inner_start..inner_start,
            outer: start_tag.span.clone(),
            next: open + 1,
        };
    }

    let mut depth = 0usize;
    for (i, tag) in tags.iter().enumerate().skip(open + 1) {
        if tag.name == start_tag.name {
            if tag.closing {
                if depth == 0 {
                    return Element {
                        open,
                        inner: inner_start..tag.span.start,
                        outer: start_tag.span.start..tag.span.end,
                        next: i + 1,
                    };
                }
                depth -= 1;
            } else if !tag.self_closing {
                depth += 1;
            }
        }
    }

    // Unclosed: stop at the next block opener.
    let stop = tags
        .iter()
        .enumerate()
        .skip(open + 1)
        .find(|(_, t)| !t.closing && is_block(&t.name));
    match stop {
        Some((i, t)) => Element {
            open,
            inner: inner_start..t.span.start,
            outer: start_tag.span.start..t.span.start,
            next: i,
        },
        None => Element {
            open,
            inner: inner_start..html.len(),
            outer: start_tag.span.start..html.len(),
            next: tags.len(),
        },
    }
}

/// Close every element a fragment leaves open.
///
/// - a closing tag with a matching open element first closes whatever was
///   opened inside it
/// - a closing tag with no matching open element is dropped
/// - a block opening inside `<p>` or a heading closes that element first
/// - anything still open at the end is closed there
///
/// Text, comments and the original tag text are copied through unchanged.
pub fn balance(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + 16);
    let mut open: Vec<String> = Vec::new();
    let mut pos = 0;

    let close_from = |out: &mut String, open: &mut Vec<String>, from: usize| {
        for name in open.drain(from..).rev() {
            out.push_str("</");
            out.push_str(&name);
            out.push('>');
        }
    };

    for tag in tags(html) {
        out.push_str(&html[pos..tag.span.start]);
        pos = tag.span.end;
        let raw = &html[tag.span.clone()];

        if tag.closing {
            if let Some(i) = open.iter().rposition(|n| *n == tag.name) {
                close_from(&mut out, &mut open, i + 1);
                open.pop();
                out.push_str(raw);
            }
            continue;
        }

        if is_block(&tag.name) {
            if let Some(i) = open.iter().position(|n| INLINE_ONLY_BLOCKS.contains(&n.as_str())) {
                close_from(&mut out, &mut open, i);
            }
        }
        out.push_str(raw);
        if !tag.self_closing && !VOID_TAGS.contains(&tag.name.as_str()) {
            open.push(tag.name);
        }
    }

    out.push_str(&html[pos..]);
    close_from(&mut out, &mut open, 0);
    out
}

/// Look up attribute `name` (case-insensitive) in raw attribute text.
///
/// A bare attribute (`<p hidden>`) yields an empty string.
pub fn attr(attrs: &str, name: &str) -> Option<String> {
    RE_ATTR.captures_iter(attrs).find_map(|caps| {
        if !caps[1].eq_ignore_ascii_case(name) {
            return None;
        }
        let raw = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        Some(html_escape::decode_html_entities(raw).into_owned())
    })
}

/// Visible text of a fragment: tags dropped, entities decoded, whitespace
/// collapsed to single spaces. Block boundaries count as whitespace.
pub fn text_content(fragment: &str) -> String {
    let without_comments = RE_COMMENT.replace_all(fragment, "");
    let stripped = RE_TAG.replace_all(&without_comments, |caps: &regex::Captures<'_>| {
        let name = caps[2].to_ascii_lowercase();
        if name == "br" || is_block(&name) {
            " "
        } else {
            ""
        }
    });
    let decoded = html_escape::decode_html_entities(&stripped);
    RE_WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}
