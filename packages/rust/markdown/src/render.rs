//! Section tree to Markdown rendering.

use wikimd_shared::{MathStyle, Section};

use crate::sanitize::sanitize;

/// Markdown heading of the given depth, followed by a blank line.
pub fn heading(text: &str, depth: usize) -> String {
    format!("{} {text}\n\n", "#".repeat(depth))
}

/// Inline Markdown link.
pub fn link(text: &str, url: &str) -> String {
    format!("[{text}]({url})")
}

/// Render one section and its subsections, parent first.
pub fn render_section(section: &Section, style: MathStyle) -> String {
    let mut md = heading(&section.title, section.level + 1);
    md.push_str(&sanitize(&section.body, style));
    md.push_str("\n\n");
    md.push_str(&render_sections(&section.children, style));
    md
}

/// Render a list of sibling sections in order. Empty input renders to `""`.
pub fn render_sections(sections: &[Section], style: MathStyle) -> String {
    sections
        .iter()
        .map(|section| render_section(section, style))
        .collect()
}
