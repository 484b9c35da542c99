//! `ctxopt issues` command - list detected issues

use std::path::Path;

use ctxopt_core::error::Result;
use ctxopt_core::format::format_tokens;
use ctxopt_core::issue::total_savings;
use ctxopt_core::rules::IssueSource;

use crate::cli::{Cli, OutputFormat};
use crate::commands::helpers::{print_json, Document};

/// Execute the issues command
pub fn execute(cli: &Cli, file: &Path, source: Option<IssueSource>) -> Result<()> {
    let doc = Document::load(cli, file)?;
    let issues = doc.issues(source)?;

    match cli.format {
        OutputFormat::Json => print_json(&issues),
        OutputFormat::Human => {
            if issues.is_empty() {
                println!("No issues found.");
                return Ok(());
            }
            for issue in &issues {
                println!(
                    "[{}] {} in \"{}\" (lines {}): ~{} tokens",
                    issue.severity,
                    issue.issue_type,
                    issue.section_name,
                    issue.line_range,
                    format_tokens(issue.estimated_savings)
                );
                if !cli.quiet {
                    println!("    {}", issue.description);
                    println!("    -> {}", issue.suggested_action);
                }
            }
            println!();
            println!(
                "{} issues, ~{} tokens recoverable",
                issues.len(),
                format_tokens(total_savings(&issues))
            );
            Ok(())
        }
    }
}
