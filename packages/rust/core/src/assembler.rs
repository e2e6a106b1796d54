//! Document assembler.
//!
//! Composes a fetched page into one Markdown document with a fixed layout:
//!
//! ```text
//! # [title](url)
//!
//! ## Summary
//!
//! <summary>
//!
//! <sections, minus trailing reference lists>
//! ## References
//!
//! - ref1
//! - ref2
//!
//! ## URL
//!
//! <url>
//! ```

use tracing::{debug, instrument};

use wikimd_markdown::{heading, link, render_sections, sanitize};
use wikimd_shared::{MathStyle, Page, Section};

/// Top-level sections dropped from the output. They only list further links,
/// and the references are rendered from structured data instead.
pub const EXCLUDED_SECTIONS: [&str; 3] = ["See also", "References", "Further reading"];

/// Assemble the document for `page`. Links are not resolved here.
#[instrument(skip_all, fields(title = %page.title, sections = page.sections.len()))]
pub fn assemble<L>(page: &Page<L>, style: MathStyle) -> String {
    let mut md = heading(&link(&page.title, &page.url), 1);

    md.push_str(&heading("Summary", 2));
    md.push_str(&sanitize(&page.summary, style));
    md.push_str("\n\n");

    let kept = kept_sections(&page.sections);
    debug!(
        kept = kept.len(),
        dropped = page.sections.len() - kept.len(),
        "filtered sections"
    );
    md.push_str(&render_sections(&kept, style));

    md.push_str(&heading("References", 2));
    md.push_str(&reference_list(&page.references));
    md.push_str("\n\n");

    md.push_str(&heading("URL", 2));
    md.push_str(&page.url);
    md.push_str("\n\n");

    md
}

/// Top-level sections not in [`EXCLUDED_SECTIONS`]. Nested ones are untouched.
fn kept_sections(sections: &[Section]) -> Vec<Section> {
    sections
        .iter()
        .filter(|s| !EXCLUDED_SECTIONS.contains(&s.title.as_str()))
        .cloned()
        .collect()
}

fn reference_list(references: &[String]) -> String {
    references
        .iter()
        .map(|r| format!("- {r}"))
        .collect::<Vec<_>>()
        .join("\n")
}
