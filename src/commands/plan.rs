//! `ctxopt plan` command - show what an optimization would do

use std::path::Path;

use ctxopt_core::error::Result;
use ctxopt_core::format::format_tokens;
use ctxopt_core::optimizer::{OptimizationPlan, Strategy};
use ctxopt_core::rules::IssueSource;

use crate::cli::{Cli, OutputFormat};
use crate::commands::helpers::{print_json, Document};

/// Execute the plan command
pub fn execute(
    cli: &Cli,
    file: &Path,
    strategy: Option<Strategy>,
    source: Option<IssueSource>,
) -> Result<()> {
    let doc = Document::load(cli, file)?;
    let plan = doc.plan(strategy, source)?;

    match cli.format {
        OutputFormat::Json => print_json(&plan),
        OutputFormat::Human => {
            print_plan(cli, &plan);
            Ok(())
        }
    }
}

/// Human-readable plan listing, shared with `apply --dry-run`
pub fn print_plan(cli: &Cli, plan: &OptimizationPlan) {
    let summary = &plan.summary;
    println!(
        "Strategy: {} ({} actions)",
        plan.strategy, summary.action_count
    );
    println!(
        "Lines:  {} -> {} (-{})",
        summary.current_lines, summary.projected_lines, summary.lines_saved
    );
    println!(
        "Tokens: ~{} -> ~{} (-{}, {:.1}%)",
        format_tokens(summary.current_tokens),
        format_tokens(summary.projected_tokens),
        format_tokens(summary.tokens_saved),
        summary.reduction_percent
    );

    if plan.is_empty() {
        println!();
        println!("Nothing to optimize.");
    } else {
        println!();
        for action in &plan.actions {
            println!(
                "{}. {} \"{}\" (lines {}): -{} lines, ~{} tokens",
                action.priority,
                action.action_type,
                action.section_name,
                action.line_range,
                action.lines_saved,
                format_tokens(action.tokens_saved)
            );
            if !cli.quiet {
                println!("    {}", action.description);
                if let Some(path) = &action.archive_path {
                    println!("    archive: {}", path);
                }
            }
        }
    }

    if !cli.quiet {
        if !plan.preserved_sections.is_empty() {
            println!();
            println!("Preserved: {}", plan.preserved_sections.join(", "));
        }
        if !plan.warnings.is_empty() {
            println!();
            println!("Warnings:");
            for warning in &plan.warnings {
                println!("  - {}", warning);
            }
        }
    }
}
