//! Presentation-only keyword highlighting of an analysis report.
//! Operates on a copy of the stored result; the stored value is never the
//! marked-up form.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// A run of report text; `highlight` marks the ATS keywords the UI calls out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub highlight: bool,
}

fn keyword_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)skills|score|improvement|formatting").expect("keyword pattern is valid")
    })
}

/// Splits `report` into plain and highlighted segments. Concatenating the
/// segment texts reproduces `report` byte-for-byte.
pub fn highlight_keywords(report: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;
    for m in keyword_pattern().find_iter(report) {
        if m.start() > last {
            segments.push(Segment {
                text: report[last..m.start()].to_string(),
                highlight: false,
            });
        }
        segments.push(Segment {
            text: m.as_str().to_string(),
            highlight: true,
        });
        last = m.end();
    }
    if last < report.len() {
        segments.push(Segment {
            text: report[last..].to_string(),
            highlight: false,
        });
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concat(segments: &[Segment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_concatenation_reproduces_report() {
        let report = "Score: 82. Skills: strong. Formatting: good.";
        assert_eq!(concat(&highlight_keywords(report)), report);
    }

    #[test]
    fn test_keywords_are_marked_with_original_casing() {
        let segments = highlight_keywords("Your SKILLS need improvement, the score is fair.");
        let marked: Vec<&str> = segments
            .iter()
            .filter(|s| s.highlight)
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(marked, vec!["SKILLS", "improvement", "score"]);
    }

    #[test]
    fn test_report_without_keywords_is_one_plain_segment() {
        let segments = highlight_keywords("Nothing of note here.");
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].highlight);
    }

    #[test]
    fn test_empty_report_yields_no_segments() {
        assert!(highlight_keywords("").is_empty());
    }
}
