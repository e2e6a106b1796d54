//! Display-math detection and conversion for plain-text extracts.
//!
//! Plain-text extracts render a display formula as a run of blank or
//! indentation-only lines around the formula's text, followed by a line
//! holding the TeX source prefixed with `\displaystyle`. These helpers find
//! such runs and collapse each into a single `$`-delimited line.

use wikimd_shared::MathStyle;

/// Substring that flags a line as the TeX source of a display formula.
pub const DISPLAYSTYLE_MARKER: &str = "\\displaystyle";

/// Delimiter placed around converted formulas.
pub const MATH_DELIMITER: char = '$';

/// A blank line only opens a block if more than this many lines pass before
/// the next non-blank one.
const MAX_SHORT_RUN: usize = 2;

/// End of a detected math block, relative to the window it was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathBlockEnd<'a> {
    /// Number of lines the block spans from the window start.
    pub len: usize,
    /// Last marker line seen in the block, or `""` if there was none.
    pub marker: &'a str,
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Index of the blank line that opens the first candidate math block.
///
/// A blank line opens a candidate when none is open. The next non-blank line
/// either confirms it (more than two lines since the blank) or abandons it.
pub fn detect_math_start<S: AsRef<str>>(lines: &[S]) -> Option<usize> {
    let mut start: Option<usize> = None;

    for (i, line) in lines.iter().enumerate() {
        if is_blank(line.as_ref()) {
            if start.is_none() {
                start = Some(i);
            }
            continue;
        }

        if let Some(open) = start {
            if i - open > MAX_SHORT_RUN {
                return Some(open);
            }
            start = None;
        }
    }

    None
}

/// Scan a window that starts at a detected block and find where it ends.
///
/// The block ends at the first blank line after a marker line. Without such a
/// line the block runs to the end of the window.
pub fn end_of_math_block<S: AsRef<str>>(window: &[S]) -> MathBlockEnd<'_> {
    let mut marker: Option<&str> = None;

    for (i, line) in window.iter().enumerate() {
        let line = line.as_ref();
        if line.contains(DISPLAYSTYLE_MARKER) {
            marker = Some(line);
            continue;
        }

        if let Some(found) = marker {
            if is_blank(line) {
                return MathBlockEnd {
                    len: i,
                    marker: found,
                };
            }
        }
    }

    MathBlockEnd {
        len: window.len(),
        marker: marker.unwrap_or_default(),
    }
}

/// Turn a marker line into a Markdown math expression.
pub fn convert_marker_line(line: &str, style: MathStyle) -> String {
    match style {
        MathStyle::Overwrite => overwrite_ends(line.trim()),
        MathStyle::Wrap => wrap_formula(line.trim()),
    }
}

/// Replace the first and then the last character with the delimiter.
///
/// Length is preserved for inputs of two or more characters; shorter inputs
/// collapse to a single delimiter.
fn overwrite_ends(trimmed: &str) -> String {
    let mut out = String::with_capacity(trimmed.len() + 1);
    out.push(MATH_DELIMITER);
    out.extend(trimmed.chars().skip(1));
    out.pop();
    out.push(MATH_DELIMITER);
    out
}

fn wrap_formula(trimmed: &str) -> String {
    let inner = strip_outer_braces(trimmed);
    let inner = inner
        .trim_start()
        .strip_prefix(DISPLAYSTYLE_MARKER)
        .unwrap_or(inner)
        .trim();
    format!("{MATH_DELIMITER}{inner}{MATH_DELIMITER}")
}

/// Drop a `{...}` pair only when the opening brace closes at the very end.
fn strip_outer_braces(s: &str) -> &str {
    let Some(body) = s.strip_prefix('{').and_then(|r| r.strip_suffix('}')) else {
        return s;
    };

    let mut depth = 0usize;
    for c in body.chars() {
        match c {
            '{' => depth += 1,
            '}' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return s,
            },
            _ => {}
        }
    }

    if depth == 0 { body } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Detection ---

    #[test]
    fn detect_reports_blank_run_longer_than_two() {
        let lines = ["a", " ", "  ", "    ", "x"];
        assert_eq!(detect_math_start(&lines), Some(1));
    }

    #[test]
    fn detect_abandons_single_blank_before_text() {
        assert_eq!(detect_math_start(&["a", "", "b", "c"]), None);
        assert_eq!(detect_math_start(&["a", "", "b", "c", "d", "e"]), None);
    }

    #[test]
    fn detect_without_blank_lines_finds_nothing() {
        assert_eq!(detect_math_start(&["one", "two", "three"]), None);
        assert_eq!(detect_math_start::<&str>(&[]), None);
    }

    #[test]
    fn detect_reopens_after_abandoned_candidate() {
        let lines = ["a", "", "b", "", "", "", "c"];
        assert_eq!(detect_math_start(&lines), Some(3));
    }

    #[test]
    fn detect_trailing_blanks_are_not_a_block() {
        assert_eq!(detect_math_start(&["a", "", "", "", ""]), None);
    }

    #[test]
    fn detect_opens_at_first_of_consecutive_blanks() {
        let lines = ["", "", "", "x", "", "", "", "y"];
        assert_eq!(detect_math_start(&lines), Some(0));
    }

    // --- End of block ---

    #[test]
    fn end_stops_at_blank_after_marker() {
        let window = ["", "  x", "  {\\displaystyle x}", "", "after"];
        let end = end_of_math_block(&window);
        assert_eq!(end.len, 3);
        assert_eq!(end.marker, "  {\\displaystyle x}");
    }

    #[test]
    fn end_whitespace_only_line_also_terminates() {
        let window = ["", "{\\displaystyle y}", "   ", "after"];
        let end = end_of_math_block(&window);
        assert_eq!(end.len, 2);
    }

    #[test]
    fn end_without_trailing_blank_consumes_window() {
        let window = ["", "x", "{\\displaystyle x}", "more"];
        let end = end_of_math_block(&window);
        assert_eq!(end.len, 4);
        assert_eq!(end.marker, "{\\displaystyle x}");
    }

    #[test]
    fn end_keeps_last_marker() {
        let window = ["", "{\\displaystyle a}", "{\\displaystyle b}", ""];
        let end = end_of_math_block(&window);
        assert_eq!(end.marker, "{\\displaystyle b}");
        assert_eq!(end.len, 3);
    }

    #[test]
    fn end_without_marker_is_empty() {
        let window = ["", "", "", "text", ""];
        let end = end_of_math_block(&window);
        assert_eq!(end.len, 5);
        assert_eq!(end.marker, "");
    }

    // --- Conversion ---

    #[test]
    fn overwrite_replaces_first_and_last_char() {
        let input = "\\displaystyle x^2 + y^2";
        let out = convert_marker_line(input, MathStyle::Overwrite);
        assert_eq!(out, "$displaystyle x^2 + y^$");
        assert_eq!(out.chars().count(), input.chars().count());
    }

    #[test]
    fn overwrite_trims_first() {
        let out = convert_marker_line("    {\\displaystyle E=mc^{2}}  ", MathStyle::Overwrite);
        assert_eq!(out, "$\\displaystyle E=mc^{2}$");
    }

    #[test]
    fn overwrite_degenerate_inputs() {
        assert_eq!(convert_marker_line("", MathStyle::Overwrite), "$");
        assert_eq!(convert_marker_line("x", MathStyle::Overwrite), "$");
        assert_eq!(convert_marker_line("xy", MathStyle::Overwrite), "$$");
    }

    #[test]
    fn overwrite_counts_chars_not_bytes() {
        let out = convert_marker_line("αβγ", MathStyle::Overwrite);
        assert_eq!(out, "$β$");
    }

    #[test]
    fn wrap_strips_marker_and_braces() {
        let out = convert_marker_line("  {\\displaystyle E=mc^{2}}", MathStyle::Wrap);
        assert_eq!(out, "$E=mc^{2}$");
    }

    #[test]
    fn wrap_bare_marker() {
        let out = convert_marker_line("\\displaystyle x^2 + y^2 = z^2", MathStyle::Wrap);
        assert_eq!(out, "$x^2 + y^2 = z^2$");
    }

    #[test]
    fn wrap_keeps_unbalanced_outer_braces() {
        let out = convert_marker_line("{\\displaystyle a}{b}", MathStyle::Wrap);
        assert_eq!(out, "${\\displaystyle a}{b}$");
    }
}
