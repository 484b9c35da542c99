//! `ctxopt archives` command - list archive references left in a document

use std::fs;
use std::path::Path;

use ctxopt_core::archive::find_archive_references;
use ctxopt_core::error::{OptimizerError, Result};

use crate::cli::{Cli, OutputFormat};
use crate::commands::helpers::{print_json, project_root};

/// Execute the archives command
pub fn execute(cli: &Cli, file: &Path) -> Result<()> {
    if !file.is_file() {
        return Err(OptimizerError::DocumentNotFound {
            path: file.to_path_buf(),
        });
    }
    let content = fs::read_to_string(file)?;
    let references = find_archive_references(&content);

    match cli.format {
        OutputFormat::Json => print_json(&references),
        OutputFormat::Human => {
            if references.is_empty() {
                println!("No archive references found.");
                return Ok(());
            }
            let root = project_root(file);
            for reference in &references {
                let missing = if root.join(&reference.path).exists() {
                    ""
                } else {
                    " (missing)"
                };
                let lines = reference
                    .line_count
                    .map(|n| format!(", {} lines", n))
                    .unwrap_or_default();
                println!(
                    "line {}: {} -> {}{}{}",
                    reference.line_number,
                    reference.section_name.as_deref().unwrap_or("(top)"),
                    reference.path,
                    lines,
                    missing
                );
            }
            Ok(())
        }
    }
}
