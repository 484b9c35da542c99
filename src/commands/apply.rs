//! `ctxopt apply` command - rewrite a document and write its archives

use std::fs;
use std::path::Path;

use serde_json::json;
use tracing::{debug, info};

use ctxopt_core::archive::ArchiveContent;
use ctxopt_core::error::{OptimizerError, Result};
use ctxopt_core::format::format_tokens;
use ctxopt_core::optimizer::{apply_plan_with, preview_plan_with, OptimizationResult, Strategy};
use ctxopt_core::rules::IssueSource;

use crate::cli::{Cli, OutputFormat};
use crate::commands::helpers::{print_json, Document};
use crate::commands::plan::print_plan;

/// Separator between archives of the same section written in one month
const ARCHIVE_SEPARATOR: &str = "\n---\n\n";

/// Execute the apply command
pub fn execute(
    cli: &Cli,
    file: &Path,
    strategy: Option<Strategy>,
    source: Option<IssueSource>,
    dry_run: bool,
) -> Result<()> {
    let doc = Document::load(cli, file)?;
    let plan = doc.plan(strategy, source)?;
    let content = &doc.analysis.raw_content;

    if dry_run {
        let preview = preview_plan_with(&plan, content, &doc.config.summary);
        return match cli.format {
            OutputFormat::Json => print_json(&json!({
                "dry_run": true,
                "plan": plan,
                "preview": preview,
            })),
            OutputFormat::Human => {
                print_plan(cli, &plan);
                if !cli.quiet {
                    for action in &preview.actions {
                        println!();
                        println!("--- {} (lines {})", action.section_name, action.line_range);
                        println!("{}", action.after);
                    }
                }
                println!();
                println!("Dry run: no files written.");
                Ok(())
            }
        };
    }

    if plan.is_empty() {
        return match cli.format {
            OutputFormat::Json => print_json(&json!({ "dry_run": false, "plan": plan })),
            OutputFormat::Human => {
                println!("Nothing to optimize.");
                Ok(())
            }
        };
    }

    let result = apply_plan_with(&plan, content, &doc.config.summary);
    for archive in &result.archives {
        write_archive(archive)?;
    }
    fs::write(file, document_text(&result, content))?;
    info!(
        file = %file.display(),
        applied = result.applied_actions.len(),
        archives = result.archives.len(),
        "document optimized"
    );

    match cli.format {
        OutputFormat::Json => print_json(&json!({
            "dry_run": false,
            "plan": plan,
            "result": result,
        }))?,
        OutputFormat::Human => print_result(cli, &result),
    }

    if result.success {
        Ok(())
    } else {
        Err(OptimizerError::failed(
            "apply plan",
            format!("{} actions failed", result.failed_actions.len()),
        ))
    }
}

/// New document text, keeping the original's trailing newline
fn document_text(result: &OptimizationResult, original: &str) -> String {
    let mut text = result.new_content.clone();
    if original.ends_with('\n') && !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// Write an archive, appending to an existing archive for the same month
fn write_archive(archive: &ArchiveContent) -> Result<()> {
    if let Some(parent) = archive.path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = if archive.path.exists() {
        let mut existing = fs::read_to_string(&archive.path)?;
        existing.push_str(ARCHIVE_SEPARATOR);
        existing.push_str(&archive.content);
        existing
    } else {
        archive.content.clone()
    };
    fs::write(&archive.path, text)?;
    debug!(path = %archive.path.display(), "write_archive");
    Ok(())
}

fn print_result(cli: &Cli, result: &OptimizationResult) {
    println!(
        "Applied {} actions: {} -> {} lines, ~{} -> ~{} tokens",
        result.applied_actions.len(),
        result.original_lines,
        result.new_lines,
        format_tokens(result.original_tokens),
        format_tokens(result.new_tokens)
    );
    if !cli.quiet {
        for archive in &result.archives {
            println!("  archived \"{}\" to {}", archive.metadata.section_name, archive.relative_path);
        }
    }
    for failed in &result.failed_actions {
        eprintln!(
            "  failed {} \"{}\" (lines {}): {}",
            failed.action.action_type,
            failed.action.section_name,
            failed.action.line_range,
            failed.error
        );
    }
}
