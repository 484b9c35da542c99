//! Integration tests for the ctxopt CLI
//!
//! These tests run the ctxopt binary against documents in temp directories.

use std::fs;
use std::path::Path;

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use tempfile::tempdir;

/// Get a Command for ctxopt
fn ctxopt() -> Command {
    cargo_bin_cmd!("ctxopt")
}

/// Overview, a 30-line completed-work log, and a short commands section
fn completed_work_document() -> String {
    let mut doc = String::from("# Project\nThis project is designed to help.\n## Completed Work\n");
    for i in 0..29 {
        doc.push_str(&format!(
            "- [x] Implemented feature {} on 2025-{:02}-15\n",
            i,
            i % 9 + 1
        ));
    }
    doc.push_str("## Commands\n- `npm test`\n");
    doc
}

fn write_doc(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("CLAUDE.md");
    fs::write(&path, content).unwrap();
    path
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// Help and usage
// ============================================================================

#[test]
fn test_help_lists_commands() {
    ctxopt()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("apply"));
}

#[test]
fn test_unknown_strategy_is_usage_error() {
    let dir = tempdir().unwrap();
    let doc = write_doc(dir.path(), &completed_work_document());

    ctxopt()
        .arg("plan")
        .arg(&doc)
        .args(["--strategy", "reckless"])
        .assert()
        .code(2);
}

#[test]
fn test_custom_strategy_without_config_is_usage_error() {
    let dir = tempdir().unwrap();
    let doc = write_doc(dir.path(), &completed_work_document());

    ctxopt()
        .arg("plan")
        .arg(&doc)
        .args(["--strategy", "custom"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("custom"));
}

#[test]
fn test_missing_document_is_data_error() {
    let dir = tempdir().unwrap();

    ctxopt()
        .arg("analyze")
        .arg(dir.path().join("CLAUDE.md"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("document not found"));
}

#[test]
fn test_missing_document_json_error_envelope() {
    let dir = tempdir().unwrap();

    let output = ctxopt()
        .args(["--format", "json", "analyze"])
        .arg(dir.path().join("CLAUDE.md"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let err: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["error"]["type"], "document_not_found");
    assert_eq!(err["error"]["code"], 3);
}

// ============================================================================
// analyze / issues / plan
// ============================================================================

#[test]
fn test_analyze_human_lists_sections() {
    let dir = tempdir().unwrap();
    let doc = write_doc(dir.path(), &completed_work_document());

    ctxopt()
        .arg("analyze")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 sections"))
        .stdout(predicate::str::contains("Completed Work"))
        .stdout(predicate::str::contains("completed-work"));
}

#[test]
fn test_analyze_json_sections() {
    let dir = tempdir().unwrap();
    let doc = write_doc(dir.path(), &completed_work_document());

    let json = stdout_json(ctxopt().args(["--format", "json", "analyze"]).arg(&doc));
    let sections = json["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 3);
    assert_eq!(sections[1]["name"], "Completed Work");
    assert_eq!(sections[1]["type"], "completed-work");
    assert_eq!(sections[1]["line_count"], 30);
}

#[test]
fn test_analyze_document_without_headers() {
    let dir = tempdir().unwrap();
    let doc = write_doc(dir.path(), "just some prose\nwith no headers\n");

    ctxopt()
        .arg("analyze")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("No sections found"));
}

#[test]
fn test_issues_json_sorted_by_severity() {
    let dir = tempdir().unwrap();
    let doc = write_doc(dir.path(), &completed_work_document());

    let json = stdout_json(ctxopt().args(["--format", "json", "issues"]).arg(&doc));
    let issues = json.as_array().unwrap();
    assert!(!issues.is_empty());
    let rank = |s: &str| match s {
        "high" => 0,
        "medium" => 1,
        _ => 2,
    };
    let ranks: Vec<i32> = issues
        .iter()
        .map(|i| rank(i["severity"].as_str().unwrap()))
        .collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_issues_source_rules_only() {
    let dir = tempdir().unwrap();
    let doc = write_doc(dir.path(), &completed_work_document());

    let json = stdout_json(
        ctxopt()
            .args(["--format", "json", "issues"])
            .arg(&doc)
            .args(["--source", "rules"]),
    );
    for issue in json.as_array().unwrap() {
        assert!(issue["details"]["rule"].is_string(), "{}", issue);
    }
}

#[test]
fn test_plan_json_archives_completed_work() {
    let dir = tempdir().unwrap();
    let doc = write_doc(dir.path(), &completed_work_document());

    let json = stdout_json(
        ctxopt()
            .args(["--format", "json", "plan"])
            .arg(&doc)
            .args(["--strategy", "moderate"]),
    );
    assert_eq!(json["strategy"], "moderate");
    let actions = json["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0]["type"], "archive");
    assert_eq!(actions[0]["section_name"], "Completed Work");
    assert!(json["preserved_sections"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("Project")));
}

#[test]
fn test_plan_human_summary() {
    let dir = tempdir().unwrap();
    let doc = write_doc(dir.path(), &completed_work_document());

    ctxopt()
        .arg("plan")
        .arg(&doc)
        .args(["-s", "moderate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Strategy: moderate"))
        .stdout(predicate::str::contains("archive \"Completed Work\""));
}

// ============================================================================
// apply / archives
// ============================================================================

#[test]
fn test_apply_dry_run_writes_nothing() {
    let dir = tempdir().unwrap();
    let original = completed_work_document();
    let doc = write_doc(dir.path(), &original);

    ctxopt()
        .arg("apply")
        .arg(&doc)
        .args(["--strategy", "moderate", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert_eq!(fs::read_to_string(&doc).unwrap(), original);
    assert!(!dir.path().join(".claude").exists());
}

#[test]
fn test_apply_writes_archive_and_reference() {
    let dir = tempdir().unwrap();
    let doc = write_doc(dir.path(), &completed_work_document());

    ctxopt()
        .arg("apply")
        .arg(&doc)
        .args(["--strategy", "moderate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 1 actions"));

    let updated = fs::read_to_string(&doc).unwrap();
    assert!(updated.contains("> **Archived:** See `.claude/archives/CLAUDE-completed-work-"));
    assert!(!updated.contains("Implemented feature 5 "));
    assert!(updated.contains("## Commands"));
    assert!(updated.ends_with('\n'));

    let archives: Vec<_> = fs::read_dir(dir.path().join(".claude/archives"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(archives.len(), 1);
    let archive = fs::read_to_string(&archives[0]).unwrap();
    assert!(archive.starts_with("# Archive: Completed Work"));
    assert!(archive.contains("## Original Content"));
    assert!(archive.contains("Highlights:"));
    assert!(archive.contains("- [x] Implemented feature 28 on 2025-02-15"));

    let json = stdout_json(ctxopt().args(["--format", "json", "archives"]).arg(&doc));
    let refs = json.as_array().unwrap();
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0]["section_name"], "Completed Work");
    assert_eq!(refs[0]["line_count"], 30);
}

#[test]
fn test_apply_uses_configured_summary_limits() {
    let dir = tempdir().unwrap();
    let doc = write_doc(dir.path(), &completed_work_document());
    fs::create_dir_all(dir.path().join(".claude")).unwrap();
    fs::write(
        dir.path().join(".claude/optimizer.toml"),
        "[summary]\nmax_lines = 100\n",
    )
    .unwrap();

    ctxopt()
        .arg("apply")
        .arg(&doc)
        .args(["--strategy", "moderate"])
        .assert()
        .success();

    let archives: Vec<_> = fs::read_dir(dir.path().join(".claude/archives"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(archives.len(), 1);
    let archive = fs::read_to_string(&archives[0]).unwrap();
    assert!(!archive.contains("Highlights:"), "{}", archive);
    assert!(archive.contains("## Summary\n\n- [x] Implemented feature 0"));
}

#[test]
fn test_apply_nothing_to_optimize() {
    let dir = tempdir().unwrap();
    let original = "# Commands\n- `cargo test`\n";
    let doc = write_doc(dir.path(), original);

    ctxopt()
        .arg("apply")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to optimize"));
    assert_eq!(fs::read_to_string(&doc).unwrap(), original);
}

#[test]
fn test_archives_none() {
    let dir = tempdir().unwrap();
    let doc = write_doc(dir.path(), "# Commands\n- `cargo test`\n");

    ctxopt()
        .arg("archives")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("No archive references"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_invalid_extra_rule_is_data_error() {
    let dir = tempdir().unwrap();
    let doc = write_doc(dir.path(), &completed_work_document());
    fs::create_dir_all(dir.path().join(".claude")).unwrap();
    fs::write(
        dir.path().join(".claude/optimizer.toml"),
        r#"
[[rules.extra]]
name = "broken"
issue_type = "outdated-reference"
priority = 1
action = { type = "flag", message = "check" }

[rules.extra.matcher]
content_pattern = "("
"#,
    )
    .unwrap();

    ctxopt()
        .arg("issues")
        .arg(&doc)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("invalid rule broken"));
}

#[test]
fn test_config_default_strategy_used() {
    let dir = tempdir().unwrap();
    let doc = write_doc(dir.path(), &completed_work_document());
    let config = dir.path().join("opt.toml");
    fs::write(&config, "default_strategy = \"conservative\"\n").unwrap();

    let json = stdout_json(
        ctxopt()
            .args(["--format", "json", "--config"])
            .arg(&config)
            .arg("plan")
            .arg(&doc),
    );
    assert_eq!(json["strategy"], "conservative");
}
