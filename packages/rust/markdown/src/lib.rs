//! Plain-text extract to Markdown conversion.
//!
//! Converts encyclopedia section trees into Markdown: display-math blocks in
//! plain-text bodies are collapsed into `$`-delimited lines, sentences are
//! broken onto their own lines, and sections become nested headings.

pub mod math;
mod render;
mod sanitize;

pub use math::{
    DISPLAYSTYLE_MARKER, MATH_DELIMITER, MathBlockEnd, convert_marker_line, detect_math_start,
    end_of_math_block,
};
pub use render::{heading, link, render_section, render_sections};
pub use sanitize::sanitize;
