//! Line-oriented parser for the model's end-of-session summary.
//!
//! ```text
//! INSIGHTS:
//! - I keep waiting for permission
//!
//! LINKS:
//! - [[Fear of Failure]]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Structured outcome of a finished session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub insights: Vec<String>,
    pub links: Vec<String>,
}

impl SummaryResult {
    pub fn is_empty(&self) -> bool {
        self.insights.is_empty() && self.links.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Insights,
    Links,
}

/// Single-pass state machine over summary lines. Total: malformed input
/// yields empty lists, never an error. Link syntax is not validated.
#[derive(Debug)]
pub struct SummaryParser {
    section: Section,
    result: SummaryResult,
}

impl SummaryParser {
    pub fn new() -> Self {
        Self {
            section: Section::None,
            result: SummaryResult::default(),
        }
    }

    pub fn feed_line(&mut self, line: &str) {
        let trimmed = line.trim();

        if trimmed.eq_ignore_ascii_case("INSIGHTS:") {
            self.section = Section::Insights;
        } else if trimmed.eq_ignore_ascii_case("LINKS:") {
            self.section = Section::Links;
        } else if let Some(rest) = trimmed.strip_prefix("- ") {
            let item = rest.trim();
            if item.is_empty() {
                return;
            }
            match self.section {
                Section::Insights => self.result.insights.push(item.to_string()),
                Section::Links => self.result.links.push(item.to_string()),
                Section::None => {}
            }
        }
    }

    pub fn finish(self) -> SummaryResult {
        self.result
    }
}

impl Default for SummaryParser {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse_summary(text: &str) -> SummaryResult {
    let mut parser = SummaryParser::new();
    for line in text.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

/// Union of confirmed and raw links: confirmed first, then first-seen order,
/// no duplicates.
pub fn merge_links(confirmed: &[String], raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    confirmed
        .iter()
        .chain(raw.iter())
        .filter(|link| seen.insert(link.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parses_both_sections() {
        let result = parse_summary("INSIGHTS:\n- a\n- b\n\nLINKS:\n- [[X]]\n- [[Y]]");
        assert_eq!(result.insights, strings(&["a", "b"]));
        assert_eq!(result.links, strings(&["[[X]]", "[[Y]]"]));
    }

    #[test]
    fn test_ignores_content_before_a_header_and_non_dash_lines() {
        let result = parse_summary("noise\n- ignored\nINSIGHTS:\n- kept");
        assert_eq!(result.insights, strings(&["kept"]));
        assert!(result.links.is_empty());

        let result = parse_summary("INSIGHTS:\nprose line\n* star bullet\n- real");
        assert_eq!(result.insights, strings(&["real"]));
    }

    #[test]
    fn test_headers_are_case_insensitive_and_trimmed() {
        let result = parse_summary("  insights:  \n- one\n\tLinks:\n- [[Two]]");
        assert_eq!(result.insights, strings(&["one"]));
        assert_eq!(result.links, strings(&["[[Two]]"]));
    }

    #[test]
    fn test_header_with_trailing_text_is_not_a_header() {
        let result = parse_summary("INSIGHTS: below\n- orphan");
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_bullets_are_dropped_and_items_trimmed() {
        let result = parse_summary("INSIGHTS:\n- \n-   spaced out   \n-nodash");
        assert_eq!(result.insights, strings(&["spaced out"]));
    }

    #[test]
    fn test_total_on_garbage() {
        assert!(parse_summary("").is_empty());
        assert!(parse_summary("\n\n\r\n").is_empty());
        assert!(parse_summary("LINKS:").is_empty());
    }

    #[test]
    fn test_sections_can_reopen() {
        let result = parse_summary("LINKS:\n- [[A]]\nINSIGHTS:\n- i\nLINKS:\n- [[B]]");
        assert_eq!(result.links, strings(&["[[A]]", "[[B]]"]));
        assert_eq!(result.insights, strings(&["i"]));
    }

    #[test]
    fn test_merge_puts_confirmed_first_without_duplicates() {
        let merged = merge_links(
            &strings(&["[[B]]"]),
            &strings(&["[[A]]", "[[B]]", "[[C]]"]),
        );
        assert_eq!(merged, strings(&["[[B]]", "[[A]]", "[[C]]"]));
    }

    #[test]
    fn test_merge_dedupes_within_raw_links() {
        let merged = merge_links(&[], &strings(&["[[A]]", "[[A]]", "[[B]]"]));
        assert_eq!(merged, strings(&["[[A]]", "[[B]]"]));
    }
}
