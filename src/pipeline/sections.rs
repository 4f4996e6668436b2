//! Two-level document outline from heading markup.
//!
//! `<h2>` opens a section and `<h3>` opens a subsection of the latest
//! section. Content is attached to whichever heading precedes it; content
//! before the first heading is returned separately as the preamble.
//!
//! An `<h3>` seen before any `<h2>` has no parent, so it is promoted to a
//! section of its own (level 3) and keeps its content. Headings whose text
//! is empty are treated as ordinary content.

use crate::output::{Section, Subsection};
use crate::pipeline::markup;
use crate::pipeline::names::{disambiguate, slugify};
use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// Result of [`split_sections`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitSections {
    pub sections: Vec<Section>,
    /// HTML before the first heading (the whole input when there are none).
    pub preamble: String,
}

#[derive(Debug)]
struct Heading {
    level: u8,
    text: String,
    id: Option<String>,
    outer: Range<usize>,
}

/// Partition an HTML body into sections and subsections.
pub fn split_sections(html: &str) -> SplitSections {
    let headings = scan_headings(html);

    let preamble_end = headings.first().map_or(html.len(), |h| h.outer.start);
    let preamble = html[..preamble_end].trim().to_string();

    let mut ids = AnchorIds::reserving(&headings);
    let mut sections: Vec<Section> = Vec::new();
    let mut seen_section_heading = false;

    for (i, heading) in headings.iter().enumerate() {
        let body_end = headings.get(i + 1).map_or(html.len(), |h| h.outer.start);
        let content = html[heading.outer.end..body_end].trim().to_string();
        let id = ids.assign(heading);
        let url = format!("#{id}");

        if heading.level == 3 && seen_section_heading {
            if let Some(parent) = sections.last_mut() {
                parent.subsections.push(Subsection {
                    heading: heading.text.clone(),
                    id,
                    url,
                    level: 3,
                    content,
                });
                continue;
            }
        }

        seen_section_heading |= heading.level == 2;
        sections.push(Section {
            heading: heading.text.clone(),
            id,
            url,
            level: heading.level,
            content,
            subsections: Vec::new(),
        });
    }

    SplitSections { sections, preamble }
}

fn scan_headings(html: &str) -> Vec<Heading> {
    let tags = markup::tags(html);
    let mut headings = Vec::new();
    let mut i = 0;

    while i < tags.len() {
        let tag = &tags[i];
        let level = match tag.name.as_str() {
            "h2" if !tag.closing => 2,
            "h3" if !tag.closing => 3,
            _ => {
                i += 1;
                continue;
            }
        };
        let el = markup::element_at(html, &tags, i);
        let text = markup::text_content(&html[el.inner.clone()]);
        if !text.is_empty() {
            headings.push(Heading {
                level,
                text,
                id: tag.attr("id").filter(|id| !id.is_empty()),
                outer: el.outer.clone(),
            });
        }
        i = el.next.max(i + 1);
    }
    headings
}

/// Hands out anchor ids: the heading's own `id` when it has one, otherwise a
/// slug of its text made unique within the document. Explicit ids are
/// reserved up front so a generated slug never takes one.
struct AnchorIds {
    reserved: HashSet<String>,
    seen: HashMap<String, usize>,
}

impl AnchorIds {
    fn reserving(headings: &[Heading]) -> Self {
        Self {
            reserved: headings.iter().filter_map(|h| h.id.clone()).collect(),
            seen: HashMap::new(),
        }
    }

    fn assign(&mut self, heading: &Heading) -> String {
        if let Some(id) = &heading.id {
            return id.clone();
        }
        let mut slug = slugify(&heading.text);
        if slug.is_empty() {
            slug = "section".to_string();
        }
        loop {
            let n = self.seen.entry(slug.clone()).or_insert(0);
            *n += 1;
            let candidate = disambiguate(&slug, *n);
            if !self.reserved.contains(&candidate) {
                return candidate;
            }
        }
    }
}
