//! Export normalisation: editor HTML in, embeddable HTML body out.
//!
//! Rich-text exports arrive as full documents: a `<head>` full of generated
//! CSS classes, spans carrying the actual emphasis, redirect-wrapped links and
//! comment anchors. This module reduces that to a plain body fragment.
//!
//! ## Passes
//!
//! 1. Collect class-based emphasis from the embedded `<style>` sheet
//! 2. Streaming rewrite (lol_html): drop `<head>`/`<script>`/`<style>` and
//!    friends, unwrap `<html>`/`<body>`, turn emphasis spans into
//!    `<strong>`/`<em>`, unwrap other spans, unwrap redirect links, drop
//!    comment anchors, strip presentational and event-handler attributes
//! 3. Close whatever pass 2 left open; an emphasis span that ran to the end
//!    of its paragraph otherwise loses the paragraph's closing tag
//! 4. Remove elements left empty by pass 2
//! 5. Give every heading without an `id` a slug id
//!
//! A rewrite failure leaves the input untouched for the later passes; none of
//! the passes can fail.

use crate::pipeline::markup;
use crate::pipeline::names::{disambiguate, slugify};
use lol_html::html_content::{ContentType, Element};
use lol_html::{element, rewrite_str, RewriteStrSettings};
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Run every normalisation pass over an HTML export.
pub fn normalize_html(raw: &str) -> String {
    let class_styles = collect_class_emphasis(raw);
    let s = rewrite_export(raw, &class_styles);
    let s = markup::balance(&s);
    let s = remove_empty_elements(&s);
    let s = ensure_heading_ids(&s);
    s.trim().to_string()
}

/// Render a plain-text or Markdown export to HTML, then normalise it.
pub fn render_markdown(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    normalize_html(&out)
}

// ── Pass 1: class-based emphasis ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Emphasis {
    bold: bool,
    italic: bool,
}

impl Emphasis {
    fn from_declarations(css: &str) -> Self {
        Self {
            bold: RE_BOLD.is_match(css),
            italic: RE_ITALIC.is_match(css),
        }
    }

    fn merge(self, other: Emphasis) -> Self {
        Self {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
        }
    }
}

static RE_STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>(.*?)</style>").unwrap());
static RE_CLASS_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.([A-Za-z_][-A-Za-z0-9_]*)\s*\{([^}]*)\}").unwrap());
static RE_BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)font-weight\s*:\s*(?:bold|bolder|[6-9]00)").unwrap());
static RE_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)font-style\s*:\s*italic").unwrap());

fn collect_class_emphasis(raw: &str) -> HashMap<String, Emphasis> {
    let mut map = HashMap::new();
    for block in RE_STYLE_BLOCK.captures_iter(raw) {
        for rule in RE_CLASS_RULE.captures_iter(&block[1]) {
            let emphasis = Emphasis::from_declarations(&rule[2]);
            if emphasis != Emphasis::default() {
                map.insert(rule[1].to_string(), emphasis);
            }
        }
    }
    debug!("Collected {} emphasis classes", map.len());
    map
}

// ── Pass 2: streaming rewrite ────────────────────────────────────────────────

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

fn rewrite_export(raw: &str, class_styles: &HashMap<String, Emphasis>) -> String {
    let result = rewrite_str(
        raw,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", |el| {
                let tag = el.tag_name().to_ascii_lowercase();
                match tag.as_str() {
                    "head" | "script" | "style" | "meta" | "link" | "title" | "noscript" => {
                        el.remove();
                        return Ok(());
                    }
                    "html" | "body" => {
                        el.remove_and_keep_content();
                        return Ok(());
                    }
                    "span" => rewrite_span(el, class_styles)?,
                    "a" => {
                        if is_comment_anchor(el) {
                            el.remove();
                            return Ok(());
                        }
                        unwrap_redirect(el)?;
                    }
                    _ => {}
                }
                strip_attributes(el);
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    );

    match result {
        Ok(s) => s,
        Err(e) => {
            warn!("HTML rewrite failed, keeping export as-is: {}", e);
            raw.to_string()
        }
    }
}

fn rewrite_span(el: &mut Element<'_, '_>, class_styles: &HashMap<String, Emphasis>) -> HandlerResult {
    let inline = el
        .get_attribute("style")
        .map(|s| Emphasis::from_declarations(&s))
        .unwrap_or_default();
    let emphasis = el
        .get_attribute("class")
        .unwrap_or_default()
        .split_whitespace()
        .filter_map(|c| class_styles.get(c).copied())
        .fold(inline, Emphasis::merge);

    match (emphasis.bold, emphasis.italic) {
        (true, true) => {
            el.set_tag_name("strong")?;
            el.prepend("<em>", ContentType::Html);
            el.append("</em>", ContentType::Html);
        }
        (true, false) => el.set_tag_name("strong")?,
        (false, true) => el.set_tag_name("em")?,
        (false, false) => el.remove_and_keep_content(),
    }
    Ok(())
}

/// Comment references and comment bodies both link to `#cmnt…` anchors.
fn is_comment_anchor(el: &Element<'_, '_>) -> bool {
    el.get_attribute("href")
        .is_some_and(|href| href.starts_with("#cmnt"))
}

/// `https://www.google.com/url?q=<target>&sa=D&…` → `<target>`.
fn unwrap_redirect(el: &mut Element<'_, '_>) -> HandlerResult {
    let Some(href) = el.get_attribute("href") else {
        return Ok(());
    };
    if let Some(target) = redirect_target(&href) {
        el.set_attribute("href", &target)?;
    }
    Ok(())
}

fn redirect_target(href: &str) -> Option<String> {
    let url = reqwest::Url::parse(href).ok()?;
    let is_redirect = matches!(url.host_str(), Some("www.google.com" | "google.com"))
        && url.path() == "/url";
    if !is_redirect {
        return None;
    }
    url.query_pairs()
        .find(|(k, _)| k == "q")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

fn strip_attributes(el: &mut Element<'_, '_>) {
    let doomed: Vec<String> = el
        .attributes()
        .iter()
        .map(|a| a.name())
        .filter(|name| name == "style" || name == "class" || name.starts_with("on"))
        .collect();
    for name in doomed {
        el.remove_attribute(&name);
    }
}

// ── Pass 3: empty elements ───────────────────────────────────────────────────
//
// Named `<a id>` bookmarks are deliberately absent from the list: they are
// empty by construction and in-document links point at them.

static RE_EMPTY_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"<(p|span|sup|sub|strong|em|b|i|u|h[1-6])(?:\s[^>]*)?>(?:\s|&nbsp;|\u{00A0})*</(p|span|sup|sub|strong|em|b|i|u|h[1-6])>",
    )
    .unwrap()
});

fn remove_empty_elements(input: &str) -> String {
    let mut current = input.to_string();
    // Each round peels one layer of nesting.
    for _ in 0..8 {
        let next = RE_EMPTY_ELEMENT
            .replace_all(&current, |caps: &regex::Captures<'_>| {
                if caps[1].eq_ignore_ascii_case(&caps[2]) {
                    String::new()
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

// ── Pass 4: heading ids ──────────────────────────────────────────────────────

static RE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h([1-6])((?:\s[^>]*)?)>(.*?)</h([1-6])>").unwrap());

/// Give every `h1`–`h6` without an `id` one derived from its text.
///
/// Existing ids are left alone and never reused; repeated slugs get `-2`,
/// `-3`, … suffixes.
pub fn ensure_heading_ids(input: &str) -> String {
    let existing: HashSet<String> = markup::tags(input)
        .iter()
        .filter_map(|t| t.attr("id"))
        .collect();
    let mut seen: HashMap<String, usize> = HashMap::new();

    RE_HEADING
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let attrs = &caps[2];
            if caps[1] != caps[4] || markup::attr(attrs, "id").is_some() {
                return caps[0].to_string();
            }
            let slug = slugify(&markup::text_content(&caps[3]));
            if slug.is_empty() {
                return caps[0].to_string();
            }
            let id = loop {
                let n = seen.entry(slug.clone()).or_insert(0);
                *n += 1;
                let candidate = disambiguate(&slug, *n);
                if !existing.contains(&candidate) {
                    break candidate;
                }
            };
            format!("<h{}{} id=\"{}\">{}</h{}>", &caps[1], attrs, id, &caps[3], &caps[4])
        })
        .into_owned()
}
