//! End-to-end pipeline tests: analyze, classify, detect, plan, apply, archive

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, SecondsFormat, TimeZone, Utc};
use regex::Regex;

use ctxopt_core::analyzer::{parse_sections, AnalysisResult, Analyzer};
use ctxopt_core::archive::{
    create_archive, extract_original_content, find_archive_references,
    generate_restore_instructions,
};
use ctxopt_core::classifier::{classify_sections, ClassifiedSection, SectionType};
use ctxopt_core::detector::detect_issues;
use ctxopt_core::issue::{calculate_severity, DetectedIssue, IssueType, LineRange};
use ctxopt_core::optimizer::{
    apply_plan, generate_plan_at, get_recommended_strategy, ActionType, OptimizationAction,
    Strategy,
};
use ctxopt_core::rules::{collect_issues, IssueSource, RuleSet};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn analyze(content: &str) -> (AnalysisResult, Vec<ClassifiedSection>) {
    let analysis = Analyzer::new()
        .with_reference_date(today())
        .analyze_content(content, "/work/app/CLAUDE.md");
    let classified = classify_sections(&analysis.sections, &analysis.stale_dates);
    (analysis, classified)
}

fn issues(
    source: IssueSource,
    analysis: &AnalysisResult,
    classified: &[ClassifiedSection],
) -> Vec<DetectedIssue> {
    collect_issues(source, analysis, classified, &RuleSet::with_defaults())
}

/// A realistic document mixing live guidance and history
fn realistic_document() -> String {
    let mut doc = String::from("Preamble before any header.\n\n");
    doc.push_str("# Project Overview\nThis project is designed to help teams ship.\n\n");
    doc.push_str("## Current Status\nCurrently working on the billing migration.\n\n");
    doc.push_str("## Commands\n- `npm run build`\n- `npm test`\n\n");
    doc.push_str("## Completed Work\n");
    for i in 0..70 {
        doc.push_str(&format!(
            "- [x] Implemented feature {} on 2025-{:02}-{:02}\n",
            i,
            i % 12 + 1,
            i % 28 + 1
        ));
    }
    doc.push_str("\n## Examples\n");
    for i in 0..7 {
        doc.push_str(&format!("Example {}: calling the client\n```ts\nclient.call({});\n```\n", i, i));
    }
    doc.push_str("\n## Session Notes\n");
    for i in 0..40 {
        doc.push_str(&format!("Worked on refactor step {} during the session\n", i));
    }
    doc
}

#[test]
fn test_old_notes_raise_low_actionability() {
    let mut content = String::from("## Old Notes\n\n");
    content.push_str(&"line\n".repeat(60));
    content.push_str("Deployed January 5, 2023.");

    let (analysis, classified) = analyze(&content);
    assert_eq!(classified[0].section_type, SectionType::Notes);
    assert!(classified[0].staleness > 0.6);

    let found = detect_issues(&analysis, &classified);
    let issue = found
        .iter()
        .find(|i| matches!(i.issue_type, IssueType::LowActionability | IssueType::StaleDates))
        .unwrap();
    assert_eq!(issue.severity, calculate_severity(issue.estimated_savings));
}

#[test]
fn test_completed_work_archived_under_moderate() {
    let mut content = String::from("# Project\nThis project is designed to help.\n## Completed Work\n");
    for i in 0..29 {
        content.push_str(&format!(
            "- [x] Implemented feature {} on 2025-{:02}-15\n",
            i,
            i % 9 + 1
        ));
    }
    content.push_str("## Commands\n- `npm test`");

    let (analysis, classified) = analyze(&content);
    let completed = classified.iter().find(|c| c.name() == "Completed Work").unwrap();
    assert_eq!(completed.section.line_count, 30);

    let found = issues(IssueSource::Both, &analysis, &classified);
    let created = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
    let plan = generate_plan_at(&analysis, &classified, &found, Strategy::Moderate, None, created).unwrap();

    assert_eq!(plan.actions.len(), 1);
    let action = &plan.actions[0];
    assert_eq!(action.action_type, ActionType::Archive);
    let shape = Regex::new(r"^> \*\*Archived:\*\* See `\.claude/archives/.*`.*\d+ lines").unwrap();
    assert!(shape.is_match(&action.after), "{}", action.after);
    assert!(plan.warnings.iter().any(|w| w.starts_with("Completed Work")));
}

fn remove_action(start: usize, end: usize) -> OptimizationAction {
    OptimizationAction {
        action_type: ActionType::Remove,
        section_name: format!("lines {}-{}", start, end),
        section_type: SectionType::Unknown,
        description: "remove".into(),
        before: String::new(),
        after: String::new(),
        lines_saved: end - start + 1,
        tokens_saved: 0,
        line_range: LineRange::new(start, end),
        priority: 2,
        archive_path: None,
        keep_lines: None,
        keep_examples: None,
        reference: None,
        reason: None,
        source_issue: None,
    }
}

#[test]
fn test_apply_processes_later_ranges_first() {
    let content: String = (1..=30)
        .map(|i| format!("line {}", i))
        .collect::<Vec<_>>()
        .join("\n");
    let (analysis, classified) = analyze(&content);
    let mut plan = generate_plan_at(&analysis, &classified, &[], Strategy::Moderate, None, Utc::now()).unwrap();
    plan.actions = vec![remove_action(5, 10), remove_action(20, 25)];

    let result = apply_plan(&plan, &content);
    assert!(result.success);

    let saved: usize = plan.actions.iter().map(|a| a.lines_saved).sum();
    assert_eq!(result.new_lines, result.original_lines - saved);

    let expected: Vec<String> = (1..=30)
        .filter(|i| !(5..=10).contains(i) && !(20..=25).contains(i))
        .map(|i| format!("line {}", i))
        .collect();
    assert_eq!(result.new_content, expected.join("\n"));
}

#[test]
fn test_excessive_examples_condensed_keeping_two_examples() {
    let mut content = String::from("## Examples\n");
    for i in 0..6 {
        content.push_str(&format!("Example {}: usage\n```\ncode {}\nmore {}\n```\n", i, i, i));
    }

    let (analysis, classified) = analyze(&content);
    let found = issues(IssueSource::Rules, &analysis, &classified);
    assert!(found.iter().any(|i| i.issue_type == IssueType::ExcessiveExamples));

    let plan = generate_plan_at(&analysis, &classified, &found, Strategy::Aggressive, None, Utc::now()).unwrap();
    let condense = plan
        .actions
        .iter()
        .find(|a| a.action_type == ActionType::Condense)
        .unwrap();
    assert_eq!(condense.keep_lines, Some(20));
    assert_eq!(condense.keep_examples, Some(2));

    let result = apply_plan(&plan, &content);
    assert!(result.success);
    let reparsed = parse_sections(&result.new_content);
    assert_eq!(reparsed.len(), 1);
    // header + six prose lines + two 4-line examples + blank + note
    assert_eq!(reparsed[0].line_count, 1 + 6 + 8 + 2);
    assert_eq!(condense.lines_saved, 32 - reparsed[0].line_count);
    assert_eq!(result.new_content.matches("```").count(), 4);
    assert!(result.new_content.contains("code 0\nmore 0"));
    assert!(result.new_content.contains("code 1\nmore 1"));
    assert!(!result.new_content.contains("code 2"));
    assert!(result.new_content.contains("Example 5: usage"));
}

#[test]
fn test_large_document_recommends_aggressive() {
    let content = format!("# Big\n{}", "x".repeat(100_000));
    let (analysis, _) = analyze(&content);
    assert!(analysis.total_tokens >= 25_000);
    assert_eq!(get_recommended_strategy(&analysis, &[]), Strategy::Aggressive);
}

#[test]
fn test_sections_partition_document() {
    let content = realistic_document();
    let (analysis, _) = analyze(&content);
    let covered: usize = analysis.sections.iter().map(|s| s.line_count).sum();
    let pre_header = analysis.sections[0].start_line - 1;
    assert_eq!(covered + pre_header, analysis.total_lines);
    for pair in analysis.sections.windows(2) {
        assert_eq!(pair[0].end_line + 1, pair[1].start_line);
    }
}

#[test]
fn test_full_pipeline_apply_is_consistent() {
    let content = realistic_document();
    let (analysis, classified) = analyze(&content);
    let found = issues(IssueSource::Both, &analysis, &classified);
    let created = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
    let plan = generate_plan_at(&analysis, &classified, &found, Strategy::Aggressive, None, created).unwrap();
    assert!(!plan.actions.is_empty());
    assert!(plan.preserved_sections.contains(&"Current Status".to_string()));

    let result = apply_plan(&plan, &content);
    assert!(result.success, "{:?}", result.failed_actions);
    assert_eq!(result.new_lines, result.original_lines - plan.summary.lines_saved);
    assert!(result.new_tokens < result.original_tokens);

    let reparsed = parse_sections(&result.new_content);
    let names: Vec<&str> = reparsed.iter().map(|s| s.name.as_str()).collect();
    assert!(names.contains(&"Current Status"));

    for archive in &result.archives {
        let refs = find_archive_references(&result.new_content);
        assert!(refs.iter().any(|r| r.path == archive.relative_path));
        assert!(archive.path.starts_with("/work/app/.claude/archives"));
    }
}

#[test]
fn test_archive_restore_round_trip() {
    let content = realistic_document();
    let (_, classified) = analyze(&content);
    let section = classified.iter().find(|c| c.name() == "Completed Work").unwrap();

    let archive = create_archive(section, Path::new("/work/app"), "history");
    let instructions = generate_restore_instructions(&archive);
    assert!(instructions.contains(&archive.metadata.section_name));
    assert!(instructions.contains(
        &archive
            .metadata
            .archived_at
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    assert_eq!(
        extract_original_content(&archive.content).as_deref(),
        Some(section.section.content.as_str())
    );
    assert_eq!(
        archive.path,
        PathBuf::from("/work/app").join(&archive.relative_path)
    );
}
