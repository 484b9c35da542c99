//! Threshold-based issue detection
//!
//! Six independent heuristics run over every classified section. A section
//! that trips none of them produces no issue; nothing here fails.

use std::collections::BTreeSet;
use std::time::Instant;

use tracing::debug;

use crate::analyzer::{count_tokens, split_lines, AnalysisResult, StaleDate};
use crate::classifier::{Actionability, ClassifiedSection, SectionType};
use crate::issue::{sort_issues, DetectedIssue, IssueType};
use crate::text::code_blocks;

pub const OVERSIZED_LINES: usize = 100;
pub const OVERSIZED_TOKENS: usize = 2500;
pub const VERBOSE_HISTORY_LINES: usize = 50;
pub const MIN_STALE_DATES: usize = 3;
pub const LOW_ACTIONABILITY_STALENESS: f64 = 0.6;
pub const LOW_ACTIONABILITY_LINES: usize = 30;
pub const MAX_EXAMPLES: usize = 5;
/// Examples kept when estimating savings for excessive examples
pub const KEPT_EXAMPLES: usize = 2;
pub const MIN_SETUP_KEYWORDS: usize = 2;

/// Install/setup phrasing that usually duplicates a README
///
/// English-only: documents written in other languages will not trip the
/// duplicate-content heuristic.
pub const SETUP_KEYWORDS: &[&str] = &[
    "npm install",
    "yarn install",
    "pnpm install",
    "pip install",
    "cargo install",
    "brew install",
    "apt-get install",
    "git clone",
    "prerequisites",
    "installation",
    "getting started",
    "setup",
];

/// Run every heuristic over every section, most severe issues first
pub fn detect_issues(
    analysis: &AnalysisResult,
    classified: &[ClassifiedSection],
) -> Vec<DetectedIssue> {
    let start = Instant::now();
    let lines = split_lines(&analysis.raw_content);
    let mut issues = Vec::new();

    for section in classified {
        let in_section: Vec<&StaleDate> = analysis.stale_dates_in(&section.section).collect();
        issues.extend(
            [
                detect_oversized(section),
                detect_verbose_history(section),
                detect_stale_dates(section, &in_section, &lines),
                detect_low_actionability(section),
                detect_excessive_examples(section),
                detect_duplicate_setup(section),
            ]
            .into_iter()
            .flatten(),
        );
    }

    sort_issues(&mut issues);

    debug!(
        sections = classified.len(),
        issues = issues.len(),
        elapsed = ?start.elapsed(),
        "detect_issues"
    );

    issues
}

pub(crate) fn percent_of(tokens: usize, percent: usize) -> usize {
    (tokens * percent + 50) / 100
}

fn detect_oversized(section: &ClassifiedSection) -> Option<DetectedIssue> {
    let lines = section.section.line_count;
    let tokens = section.section.estimated_tokens;
    if lines <= OVERSIZED_LINES && tokens <= OVERSIZED_TOKENS {
        return None;
    }
    let issue = DetectedIssue::for_section(
        IssueType::OversizedSection,
        section,
        percent_of(tokens, 50),
        0.8,
    )
    .with_description(format!(
        "Section '{}' is {} lines (~{} tokens)",
        section.name(),
        lines,
        tokens
    ))
    .with_suggested_action("Condense to essential guidance or archive historical detail")
    .with_detail("lines", lines)
    .with_detail("tokens", tokens);
    Some(issue)
}

fn detect_verbose_history(section: &ClassifiedSection) -> Option<DetectedIssue> {
    let historical = matches!(
        section.section_type,
        SectionType::CompletedWork | SectionType::WorkSessions
    );
    let lines = section.section.line_count;
    if !historical || lines <= VERBOSE_HISTORY_LINES {
        return None;
    }
    let issue = DetectedIssue::for_section(
        IssueType::VerboseCompletedWork,
        section,
        percent_of(section.section.estimated_tokens, 90),
        0.9,
    )
    .with_description(format!(
        "Historical section '{}' has {} lines of past work",
        section.name(),
        lines
    ))
    .with_suggested_action("Archive to an external file and keep a one-line reference")
    .with_detail("lines", lines);
    Some(issue)
}

fn detect_stale_dates(
    section: &ClassifiedSection,
    in_section: &[&StaleDate],
    lines: &[&str],
) -> Option<DetectedIssue> {
    if in_section.len() < MIN_STALE_DATES {
        return None;
    }
    let stale_lines: BTreeSet<usize> = in_section.iter().map(|d| d.line_number).collect();
    let savings = stale_lines
        .iter()
        .filter_map(|n| lines.get(n - 1))
        .map(|line| count_tokens(line.trim()))
        .sum();
    let oldest = in_section.iter().map(|d| d.days_old).max().unwrap_or(0);
    let dates: Vec<&str> = in_section.iter().map(|d| d.date_string.as_str()).collect();

    let issue = DetectedIssue::for_section(IssueType::StaleDates, section, savings, 0.7)
        .with_description(format!(
            "Section '{}' references {} stale dates (oldest {} days)",
            section.name(),
            in_section.len(),
            oldest
        ))
        .with_suggested_action("Review dated entries and drop or archive the outdated ones")
        .with_detail("count", in_section.len())
        .with_detail("oldest_days", oldest)
        .with_detail("dates", dates);
    Some(issue)
}

fn detect_low_actionability(section: &ClassifiedSection) -> Option<DetectedIssue> {
    let lines = section.section.line_count;
    if section.actionability != Actionability::Low
        || section.staleness <= LOW_ACTIONABILITY_STALENESS
        || lines <= LOW_ACTIONABILITY_LINES
    {
        return None;
    }
    let issue = DetectedIssue::for_section(
        IssueType::LowActionability,
        section,
        percent_of(section.section.estimated_tokens, 95),
        section.staleness,
    )
    .with_description(format!(
        "Section '{}' is stale ({:.2}) and rarely actionable",
        section.name(),
        section.staleness
    ))
    .with_suggested_action("Archive; it is unlikely to guide current work")
    .with_detail("staleness", section.staleness)
    .with_detail("lines", lines);
    Some(issue)
}

fn detect_excessive_examples(section: &ClassifiedSection) -> Option<DetectedIssue> {
    let blocks = code_blocks(&section.section.content);
    if blocks.len() <= MAX_EXAMPLES {
        return None;
    }
    let body: Vec<&str> = section.section.content.lines().collect();
    let example_tokens: usize = blocks
        .iter()
        .map(|b| count_tokens(&body[b.open..=b.close].join("\n")))
        .sum();
    let avg = example_tokens / blocks.len();
    let savings = (blocks.len() - KEPT_EXAMPLES) * avg;

    let issue = DetectedIssue::for_section(IssueType::ExcessiveExamples, section, savings, 0.75)
        .with_description(format!(
            "Section '{}' has {} code examples",
            section.name(),
            blocks.len()
        ))
        .with_suggested_action(format!("Keep the {} most representative examples", KEPT_EXAMPLES))
        .with_detail("code_blocks", blocks.len())
        .with_detail("keep_examples", KEPT_EXAMPLES)
        .with_detail("avg_tokens_per_example", avg);
    Some(issue)
}

fn detect_duplicate_setup(section: &ClassifiedSection) -> Option<DetectedIssue> {
    if !matches!(
        section.section_type,
        SectionType::Commands | SectionType::TechStack
    ) {
        return None;
    }
    let content = section.section.content.to_lowercase();
    let matched: Vec<&str> = SETUP_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| content.contains(kw))
        .collect();
    if matched.len() < MIN_SETUP_KEYWORDS {
        return None;
    }
    let issue = DetectedIssue::for_section(
        IssueType::DuplicateContent,
        section,
        percent_of(section.section.estimated_tokens, 50),
        0.6,
    )
    .with_description(format!(
        "Section '{}' repeats install/setup instructions",
        section.name()
    ))
    .with_suggested_action("Replace with a reference to README.md")
    .with_detail("keywords", matched)
    .with_detail("reference", "README.md");
    Some(issue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use crate::classifier::classify_sections;
    use crate::issue::Severity;
    use chrono::NaiveDate;

    fn run(content: &str) -> Vec<DetectedIssue> {
        let analyzer =
            Analyzer::new().with_reference_date(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        let analysis = analyzer.analyze_content(content, "CLAUDE.md");
        let classified = classify_sections(&analysis.sections, &analysis.stale_dates);
        detect_issues(&analysis, &classified)
    }

    fn types(issues: &[DetectedIssue]) -> Vec<IssueType> {
        issues.iter().map(|i| i.issue_type).collect()
    }

    #[test]
    fn test_clean_document_has_no_issues() {
        let issues = run("# Overview\nA small tool.\n\n## Commands\n- `cargo test`\n");
        assert!(issues.is_empty());
    }

    #[test]
    fn test_oversized_by_lines() {
        let content = format!("## Architecture\n{}", "module detail\n".repeat(120));
        let issues = run(&content);
        assert_eq!(types(&issues), vec![IssueType::OversizedSection]);
        assert_eq!(issues[0].line_range.start, 1);
        assert_eq!(issues[0].line_range.end, 122);
    }

    #[test]
    fn test_oversized_by_tokens() {
        let content = format!("## Architecture\n{}", "x".repeat(12_000));
        let issues = run(&content);
        assert_eq!(types(&issues), vec![IssueType::OversizedSection]);
        assert_eq!(issues[0].estimated_savings, 1500);
        assert_eq!(issues[0].severity, Severity::Medium);
    }

    #[test]
    fn test_verbose_completed_work() {
        let content = format!("## Completed Work\n{}", "- refactor module\n".repeat(60));
        let issues = run(&content);
        assert!(types(&issues).contains(&IssueType::VerboseCompletedWork));
    }

    #[test]
    fn test_stale_dates_needs_three() {
        let two = "## Timeline\n- 2024-01-01 start\n- 2024-02-01 beta\n";
        assert!(!types(&run(two)).contains(&IssueType::StaleDates));

        let three = "## Timeline\n- 2024-01-01 start\n- 2024-02-01 beta\n- 2024-03-01 ga\n";
        let issues = run(three);
        let stale = issues
            .iter()
            .find(|i| i.issue_type == IssueType::StaleDates)
            .unwrap();
        assert_eq!(stale.detail_usize("count"), Some(3));
        assert_eq!(
            stale.estimated_savings,
            count_tokens("- 2024-01-01 start")
                + count_tokens("- 2024-02-01 beta")
                + count_tokens("- 2024-03-01 ga")
        );
    }

    #[test]
    fn test_low_actionability_old_notes() {
        let mut content = String::from("## Old Notes\n\n");
        content.push_str(&"line\n".repeat(60));
        content.push_str("Deployed January 5, 2023.");
        let issues = run(&content);
        let low = issues
            .iter()
            .find(|i| i.issue_type == IssueType::LowActionability)
            .unwrap();
        assert_eq!(low.section_type, SectionType::Notes);
        assert_eq!(low.severity, Severity::Low);
        assert!(low.estimated_savings > 0);
    }

    #[test]
    fn test_excessive_examples_savings() {
        let mut content = String::from("## Examples\n");
        for i in 0..6 {
            content.push_str(&format!("```\nexample {}\n```\n", i));
        }
        let issues = run(&content);
        let ex = issues
            .iter()
            .find(|i| i.issue_type == IssueType::ExcessiveExamples)
            .unwrap();
        let per_block = count_tokens("```\nexample 0\n```");
        assert_eq!(ex.estimated_savings, 4 * per_block);
        assert_eq!(ex.detail_usize("code_blocks"), Some(6));
        assert_eq!(ex.detail_usize("keep_examples"), Some(KEPT_EXAMPLES));
    }

    #[test]
    fn test_five_examples_is_fine() {
        let mut content = String::from("## Examples\n");
        for i in 0..5 {
            content.push_str(&format!("```\nexample {}\n```\n", i));
        }
        assert!(!types(&run(&content)).contains(&IssueType::ExcessiveExamples));
    }

    #[test]
    fn test_duplicate_setup_in_commands() {
        let content = "## Commands\nGetting started:\n- git clone repo\n- npm install\n";
        let issues = run(content);
        let dup = issues
            .iter()
            .find(|i| i.issue_type == IssueType::DuplicateContent)
            .unwrap();
        assert_eq!(dup.section_type, SectionType::Commands);
        assert_eq!(dup.detail_str("reference"), Some("README.md"));
    }

    #[test]
    fn test_duplicate_setup_ignored_outside_commands() {
        let content = "## Conventions\nAlways run npm install after git clone.\n";
        assert!(!types(&run(content)).contains(&IssueType::DuplicateContent));
    }

    #[test]
    fn test_issues_sorted_by_severity_then_savings() {
        let content = format!(
            "## Architecture\n{}\n## Completed Work\n{}",
            "x".repeat(50_000),
            "- refactor module\n".repeat(60)
        );
        let issues = run(&content);
        for pair in issues.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.severity.rank() < b.severity.rank()
                    || (a.severity == b.severity && a.estimated_savings >= b.estimated_savings)
            );
        }
        assert_eq!(issues[0].severity, Severity::High);
    }
}
