//! `ctxopt analyze` command - per-section breakdown of a document

use std::path::Path;

use ctxopt_core::error::Result;
use ctxopt_core::format::format_tokens;
use serde_json::json;

use crate::cli::{Cli, OutputFormat};
use crate::commands::helpers::{print_json, Document};

/// Execute the analyze command
pub fn execute(cli: &Cli, file: &Path) -> Result<()> {
    let doc = Document::load(cli, file)?;
    let analysis = &doc.analysis;

    match cli.format {
        OutputFormat::Json => print_json(&json!({
            "file_path": analysis.file_path,
            "total_lines": analysis.total_lines,
            "total_tokens": analysis.total_tokens,
            "analyzed_at": analysis.analyzed_at,
            "sections": doc.classified,
            "stale_dates": analysis.stale_dates,
        })),
        OutputFormat::Human => {
            println!(
                "{}: {} lines, ~{} tokens, {} sections, {} stale dates",
                analysis.file_path,
                analysis.total_lines,
                format_tokens(analysis.total_tokens),
                analysis.sections.len(),
                analysis.stale_dates.len()
            );
            if doc.classified.is_empty() {
                if !cli.quiet {
                    println!("No sections found (the document has no markdown headers).");
                }
                return Ok(());
            }
            println!();
            println!(
                "{:<9} {:>7}  {:<14} {:<7} {:>5}  {:<9} Section",
                "Lines", "Tokens", "Type", "Act.", "Stale", "Rec."
            );
            for c in &doc.classified {
                let s = &c.section;
                println!(
                    "{:<9} {:>7}  {:<14} {:<7} {:>5.2}  {:<9} {}{}",
                    format!("{}-{}", s.start_line, s.end_line),
                    format_tokens(s.estimated_tokens),
                    c.section_type.to_string(),
                    c.actionability.to_string(),
                    c.staleness,
                    c.recommendation.to_string(),
                    "  ".repeat(usize::from(s.level.saturating_sub(1))),
                    s.name
                );
            }
            if !cli.quiet && !analysis.stale_dates.is_empty() {
                println!();
                println!("Stale dates:");
                for d in &analysis.stale_dates {
                    println!(
                        "  line {:>4}: {} ({} days old)",
                        d.line_number, d.date_string, d.days_old
                    );
                }
            }
            Ok(())
        }
    }
}
