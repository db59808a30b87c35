//! Display formatting for LLM answers and static guidance.
//!
//! Purely textual: no validation of what the model said, only marker and
//! glyph cleanup plus section/heading layout for the result panel.

use crate::llm_client::prompts::{STRENGTH_TAG, WEAKNESS_TAG};

pub const EMPTY_PLACEHOLDER: &str = "<p>No content to display.</p>";

/// Bullet glyphs the model likes to emit; stripped before display.
const BULLET_GLYPHS: [char; 3] = ['*', '+', '•'];

const SECTION_SEPARATOR: &str = "\n\n\n\n";
const LINE_BREAK: &str = "<br>";

/// Converts raw model output into display markup.
///
/// Sections are separated by four newlines. A section whose first line ends
/// in `:` is rendered as a sub-heading followed by its non-empty lines; any
/// other section is kept as-is. Items are joined with `<br>`. Input with
/// nothing left after cleanup renders as `EMPTY_PLACEHOLDER`.
pub fn format(raw: &str) -> String {
    let cleaned = strip_markers(&raw.replace(BULLET_GLYPHS, ""));

    let mut items: Vec<&str> = Vec::new();
    for section in cleaned.split(SECTION_SEPARATOR) {
        let section = section.trim();
        if section.is_empty() {
            continue;
        }

        let mut lines = section.split('\n');
        let heading = lines.next().unwrap_or_default().trim();
        if heading.ends_with(':') {
            items.push(heading);
            items.extend(lines.map(str::trim).filter(|line| !line.is_empty()));
        } else {
            items.push(section);
        }
    }

    if items.is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }
    items.join(LINE_BREAK)
}

/// Removes the `[STRENGTH]` / `[WEAKNESS]` markers.
pub fn strip_markers(text: &str) -> String {
    text.replace(STRENGTH_TAG, "").replace(WEAKNESS_TAG, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_uses_placeholder() {
        assert_eq!(format(""), EMPTY_PLACEHOLDER);
        assert_eq!(format("   \n\n  "), EMPTY_PLACEHOLDER);
        assert_eq!(format("**********++"), EMPTY_PLACEHOLDER);
        assert_eq!(format("[STRENGTH] [WEAKNESS]"), EMPTY_PLACEHOLDER);
    }

    #[test]
    fn test_markers_and_glyphs_are_removed() {
        let out = format("[STRENGTH] * Strong Rust background\n[WEAKNESS] • No metrics");
        assert!(!out.contains("[STRENGTH]"));
        assert!(!out.contains("[WEAKNESS]"));
        assert!(!out.contains('*'));
        assert!(!out.contains('•'));
        assert!(out.contains("Strong Rust background"));
        assert!(out.contains("No metrics"));
    }

    #[test]
    fn test_heading_section_is_split_into_lines() {
        let out = format("Strengths:\n  Clear summary  \n\n  Good metrics\n\n\n\nClosing remark");
        assert_eq!(out, "Strengths:<br>Clear summary<br>Good metrics<br>Closing remark");
    }

    #[test]
    fn test_plain_section_is_kept_whole() {
        let out = format("First line\nSecond line");
        assert_eq!(out, "First line\nSecond line");
    }

    #[test]
    fn test_blank_sections_are_skipped() {
        let out = format("\n\n\n\n   \n\n\n\nOnly:\nthis");
        assert_eq!(out, "Only:<br>this");
    }

    #[test]
    fn test_format_is_idempotent_on_clean_text() {
        let samples = [
            "Overview:\nSolid experience\nGood education\n\n\n\nRecommendations:\nAdd numbers\n\n\n\nFinal words\nacross two lines",
            "Just a sentence.",
            "Heading only:",
            "Plain first\nthen more:\n\n\n\nNext:\nitem",
            "",
            "   ",
            "\n\n",
            "* + •",
            EMPTY_PLACEHOLDER,
        ];
        for sample in samples {
            let once = format(sample);
            let twice = format(&once);
            assert_eq!(once, twice, "format not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_strip_markers_leaves_other_brackets() {
        assert_eq!(strip_markers("[STRENGTH] a [note] [WEAKNESS] b"), " a [note]  b");
    }
}
