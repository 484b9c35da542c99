//! Archive summaries

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analyzer::{dates_in_line, parse_header, ParsedSection};
use crate::text::code_line_mask;

/// Limits for [`generate_summary`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryOptions {
    /// Bodies up to this many lines are kept verbatim
    pub max_lines: usize,
    pub max_highlights: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            max_lines: 10,
            max_highlights: 15,
        }
    }
}

/// Summarize a section for its archive document
///
/// Short bodies are returned as-is. Longer ones become a bullet list of
/// highlights (sub-headers, bold bullets, checked items, lines mentioning
/// `Complete` or `Implement`), the span of explicit dates found, and a size
/// footer. Fenced code never contributes highlights.
pub fn generate_summary(section: &ParsedSection, options: &SummaryOptions) -> String {
    let body = section.content.trim();
    let lines: Vec<&str> = body.lines().collect();
    if lines.len() <= options.max_lines {
        return body.to_string();
    }

    let in_code = code_line_mask(&lines);
    let mut seen = HashSet::new();
    let mut highlights = Vec::new();
    for (line, code) in lines.iter().zip(in_code) {
        if highlights.len() >= options.max_highlights {
            break;
        }
        if code {
            continue;
        }
        if let Some(h) = highlight(line) {
            if seen.insert(h.clone()) {
                highlights.push(h);
            }
        }
    }

    let mut out = Vec::new();
    if !highlights.is_empty() {
        out.push("Highlights:".to_string());
        out.extend(highlights.iter().map(|h| format!("- {}", h)));
        out.push(String::new());
    }
    if let Some((first, last)) = date_span(&lines) {
        if first == last {
            out.push(format!("Date: {}", first.format("%Y-%m-%d")));
        } else {
            out.push(format!(
                "Date range: {} to {}",
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            ));
        }
    }
    out.push(format!(
        "Original: {} lines, ~{} tokens",
        section.line_count, section.estimated_tokens
    ));
    out.join("\n")
}

fn highlight(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some((_, name)) = parse_header(trimmed) {
        return Some(name);
    }

    let item = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "));
    if let Some(item) = item {
        let item = item.trim();
        if let Some(done) = item
            .strip_prefix("[x]")
            .or_else(|| item.strip_prefix("[X]"))
        {
            return non_empty(done);
        }
        if item.starts_with("**") {
            return non_empty(&item.replace("**", ""));
        }
    }

    if trimmed.contains("Complete") || trimmed.contains("Implement") {
        return non_empty(item.unwrap_or(trimmed));
    }
    None
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn date_span(lines: &[&str]) -> Option<(NaiveDate, NaiveDate)> {
    lines
        .iter()
        .flat_map(|line| dates_in_line(line, None))
        .map(|(_, date)| date)
        .fold(None, |span, date| match span {
            None => Some((date, date)),
            Some((lo, hi)) => Some((lo.min(date), hi.max(date))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::count_tokens;

    fn section(body: &str) -> ParsedSection {
        let line_count = body.split('\n').count() + 1;
        ParsedSection {
            name: "Test".to_string(),
            level: 2,
            start_line: 1,
            end_line: line_count,
            line_count,
            content: body.to_string(),
            estimated_tokens: count_tokens(body.trim()),
        }
    }

    #[test]
    fn test_short_body_verbatim() {
        let s = section("\nfirst\nsecond\n");
        assert_eq!(generate_summary(&s, &SummaryOptions::default()), "first\nsecond");
    }

    #[test]
    fn test_long_body_highlights_and_dates() {
        let mut content = String::from("### Phase 1\n");
        content.push_str("- [x] Shipped login on 2024-03-01\n");
        content.push_str("- **Auth** rewritten\n");
        content.push_str("Implemented caching layer\n");
        content.push_str("- [x] Shipped login on 2024-03-01\n");
        for i in 0..10 {
            content.push_str(&format!("plain line {}\n", i));
        }
        content.push_str("Finished June 9, 2024\n");

        let s = section(&content);
        let summary = generate_summary(&s, &SummaryOptions::default());

        assert!(summary.starts_with("Highlights:\n"));
        assert!(summary.contains("- Phase 1"));
        assert!(summary.contains("- Shipped login on 2024-03-01"));
        assert!(summary.contains("- Auth rewritten"));
        assert!(summary.contains("- Implemented caching layer"));
        assert_eq!(summary.matches("Shipped login").count(), 1);
        assert!(summary.contains("Date range: 2024-03-01 to 2024-06-09"));
        assert!(summary.ends_with(&format!(
            "Original: {} lines, ~{} tokens",
            s.line_count, s.estimated_tokens
        )));
    }

    #[test]
    fn test_highlights_capped() {
        let mut content = String::new();
        for i in 0..30 {
            content.push_str(&format!("- [x] task {}\n", i));
        }
        let options = SummaryOptions {
            max_lines: 5,
            max_highlights: 3,
        };
        let summary = generate_summary(&section(&content), &options);
        assert_eq!(summary.lines().filter(|l| l.starts_with("- ")).count(), 3);
    }

    #[test]
    fn test_code_is_not_highlighted() {
        let mut content = String::from("```\n# not a header\n- [x] not done\n```\n");
        content.push_str(&"text\n".repeat(12));
        let summary = generate_summary(&section(&content), &SummaryOptions::default());
        assert!(!summary.contains("Highlights:"));
        assert!(summary.starts_with("Original:"));
    }
}
