//! Display cleanup for answers.
//!
//! Models like to answer in LaTeX and Markdown. The host renders plain text,
//! so markup is stripped and the answer is split into paragraphs. No attempt
//! is made to interpret the mathematics.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_DISPLAY_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\[|\\\]").unwrap());
static RE_TEXT_COMMAND: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\text\{([^}]+)\}").unwrap());
static RE_OTHER_COMMAND: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[a-zA-Z]+").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Split an answer into cleaned, non-empty paragraphs.
pub fn format_answer(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(clean_paragraph)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Strip markup from one paragraph and collapse its whitespace.
pub fn clean_paragraph(paragraph: &str) -> String {
    let s = RE_DISPLAY_BRACKETS.replace_all(paragraph, "");
    let s = RE_TEXT_COMMAND.replace_all(&s, "$1");
    let s = RE_OTHER_COMMAND.replace_all(&s, "");
    let s = s.replace('*', "");
    RE_WHITESPACE.replace_all(&s, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_split_on_blank_lines() {
        let paragraphs = format_answer("First part.\n\nSecond part.\n\n\n\nThird.");
        assert_eq!(paragraphs, vec!["First part.", "Second part.", "Third."]);
    }

    #[test]
    fn test_display_math_brackets_removed() {
        assert_eq!(clean_paragraph(r"\[ F = ma \]"), "F = ma");
    }

    #[test]
    fn test_text_command_unwrapped() {
        assert_eq!(
            clean_paragraph(r"v = 3 \text{m/s} upward"),
            "v = 3 m/s upward"
        );
    }

    #[test]
    fn test_other_commands_dropped() {
        assert_eq!(clean_paragraph(r"a \times b"), "a b");
    }

    #[test]
    fn test_emphasis_and_whitespace() {
        assert_eq!(
            clean_paragraph("**Step 1:**   compute\n the   force"),
            "Step 1: compute the force"
        );
    }

    #[test]
    fn test_markup_only_paragraph_is_dropped() {
        assert_eq!(format_answer("Answer\n\n\\[ \\]\n\n**"), vec!["Answer"]);
    }
}
