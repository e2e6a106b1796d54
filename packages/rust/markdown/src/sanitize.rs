//! Text sanitization pipeline for section bodies and summaries.
//!
//! Each pass is a function `&str -> String` applied in sequence:
//! display-math collapsing, then sentence breaking.

use tracing::debug;
use wikimd_shared::MathStyle;

use crate::math::{convert_marker_line, detect_math_start, end_of_math_block};

/// Run the full sanitization pipeline on a plain-text body.
pub fn sanitize(text: &str, style: MathStyle) -> String {
    let mut result = convert_math_blocks(text, style);
    result = break_sentences(&result);
    result
}

// ---------------------------------------------------------------------------
// Pass 1: Collapse display-math blocks
// ---------------------------------------------------------------------------

/// Replace every detected math block with its converted marker line.
///
/// Each round removes at least one blank line and inserts a non-blank one,
/// so the loop ends once no blank run qualifies.
fn convert_math_blocks(text: &str, style: MathStyle) -> String {
    let mut lines: Vec<String> = text.split('\n').map(str::to_owned).collect();
    let mut blocks = 0usize;

    while let Some(start) = detect_math_start(&lines) {
        let end = end_of_math_block(&lines[start..]);
        let len = end.len;
        let converted = convert_marker_line(end.marker, style);

        lines.splice(start..start + len, std::iter::once(converted));
        blocks += 1;
    }

    if blocks > 0 {
        debug!(blocks, "collapsed display-math blocks");
    }

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Pass 2: One sentence per line
// ---------------------------------------------------------------------------

/// Put a newline after every `.`.
///
/// Not abbreviation-aware: `e.g.` and decimal numbers are split too.
fn break_sentences(text: &str) -> String {
    text.replace('.', ".\n")
}
