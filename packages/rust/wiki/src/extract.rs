//! Parser for plain-text extracts with wiki-style section headings.
//!
//! `exsectionformat=wiki` renders headings as `== Title ==` lines preceded by
//! a blank line. The number of `=` minus one is the section level, so `==`
//! is level 1 and `===` level 2.

use std::sync::LazyLock;

use regex::Regex;
use wikimd_shared::Section;

/// Summary plus section tree recovered from an extract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedExtract {
    /// Text before the first heading.
    pub summary: String,
    /// Top-level sections with nested children.
    pub sections: Vec<Section>,
}

/// Split an extract into summary and nested sections.
pub fn parse_extract(extract: &str) -> ParsedExtract {
    static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\n\n *(==+) (.*?) (==+) *\n").expect("valid regex")
    });

    let mut summary = String::new();
    let mut open: Vec<Section> = Vec::new();
    let mut top: Vec<Section> = Vec::new();
    let mut prev_end = 0;

    for caps in SECTION_RE.captures_iter(extract) {
        let (Some(whole), Some(marks), Some(title)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };

        let text = extract[prev_end..whole.start()].trim();
        match open.last_mut() {
            Some(current) => current.body = text.to_string(),
            None => summary = text.to_string(),
        }

        let level = marks.as_str().len() - 1;
        close_until(&mut open, &mut top, level);
        open.push(Section::new(title.as_str().trim(), level, ""));
        prev_end = whole.end();
    }

    let rest = extract[prev_end..].trim();
    match open.last_mut() {
        Some(current) => current.body = rest.to_string(),
        None => summary = rest.to_string(),
    }
    close_until(&mut open, &mut top, 0);

    ParsedExtract {
        summary,
        sections: top,
    }
}

/// Pop open sections at `level` or deeper, attaching each to its parent.
fn close_until(open: &mut Vec<Section>, top: &mut Vec<Section>, level: usize) {
    while open.last().is_some_and(|s| s.level >= level) {
        let Some(done) = open.pop() else { break };
        match open.last_mut() {
            Some(parent) => parent.children.push(done),
            None => top.push(done),
        }
    }
}
