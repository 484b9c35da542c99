//! Archive documents for sections moved out of the live context
//!
//! The archiver only builds file contents and paths. Persisting an
//! [`ArchiveContent`] is the caller's job.

mod reference;
mod summary;

pub use reference::{find_archive_references, format_archive_reference, ArchiveReference};
pub use summary::{generate_summary, SummaryOptions};

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::analyzer::ParsedSection;
use crate::classifier::{ClassifiedSection, SectionType};
use crate::text::slugify_capped;

/// Archive directory, relative to the project root
pub const ARCHIVE_DIR: &str = ".claude/archives";
pub const MAX_SLUG_LEN: usize = 50;
pub const DEFAULT_SOURCE_FILE: &str = "CLAUDE.md";

const SUMMARY_HEADING: &str = "## Summary";
const ORIGINAL_HEADING: &str = "## Original Content";

/// Project-relative archive path for a section archived on `date`
pub fn archive_relative_path(section_name: &str, date: NaiveDate) -> String {
    format!(
        "{}/CLAUDE-{}-{}.md",
        ARCHIVE_DIR,
        slugify_capped(section_name, MAX_SLUG_LEN),
        date.format("%Y-%m")
    )
}

/// `<project>/.claude/archives/CLAUDE-<slug>-<YYYY-MM>.md`
pub fn get_archive_path(project_path: &Path, section_name: &str, date: NaiveDate) -> PathBuf {
    project_path.join(archive_relative_path(section_name, date))
}

/// Facts recorded about an archived section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    pub section_name: String,
    pub section_type: SectionType,
    pub source_file: String,
    pub archived_at: DateTime<Utc>,
    pub original_lines: usize,
    pub original_tokens: usize,
    pub reason: String,
    pub summary: String,
    /// Hex SHA-256 of the original section body
    pub content_hash: String,
}

/// An archive file ready to be written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveContent {
    pub path: PathBuf,
    /// `path` relative to the project root, as written into references
    pub relative_path: String,
    pub content: String,
    pub metadata: ArchiveMetadata,
}

/// Builds archive documents for one project
#[derive(Debug, Clone)]
pub struct Archiver {
    project_path: PathBuf,
    source_file: String,
    summary: SummaryOptions,
}

impl Archiver {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            source_file: DEFAULT_SOURCE_FILE.to_string(),
            summary: SummaryOptions::default(),
        }
    }

    /// Name of the live document recorded in archive metadata
    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = source_file.into();
        self
    }

    pub fn with_summary_options(mut self, options: SummaryOptions) -> Self {
        self.summary = options;
        self
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    /// Archive a classified section as of now
    pub fn create_archive(&self, section: &ClassifiedSection, reason: &str) -> ArchiveContent {
        self.create_archive_at(&section.section, section.section_type, reason, Utc::now())
    }

    /// Archive a section with an explicit timestamp
    pub fn create_archive_at(
        &self,
        section: &ParsedSection,
        section_type: SectionType,
        reason: &str,
        archived_at: DateTime<Utc>,
    ) -> ArchiveContent {
        let relative_path = archive_relative_path(&section.name, archived_at.date_naive());
        let metadata = ArchiveMetadata {
            section_name: section.name.clone(),
            section_type,
            source_file: self.source_file.clone(),
            archived_at,
            original_lines: section.line_count,
            original_tokens: section.estimated_tokens,
            reason: reason.to_string(),
            summary: generate_summary(section, &self.summary),
            content_hash: content_hash(&section.content),
        };
        let content = render_archive(&metadata, &section.content);

        debug!(
            section = %section.name,
            path = %relative_path,
            lines = section.line_count,
            "create_archive"
        );

        ArchiveContent {
            path: self.project_path.join(&relative_path),
            relative_path,
            content,
            metadata,
        }
    }
}

/// Archive `section` under `project_path`, timestamped now
pub fn create_archive(
    section: &ClassifiedSection,
    project_path: &Path,
    reason: &str,
) -> ArchiveContent {
    Archiver::new(project_path).create_archive(section, reason)
}

/// Hex SHA-256 of `text`
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

fn table_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

fn render_archive(metadata: &ArchiveMetadata, original: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Archive: {}\n\n", metadata.section_name));
    out.push_str("| Source | Section | Type | Archived | Original Lines | Original Tokens | Reason |\n");
    out.push_str("|---|---|---|---|---|---|---|\n");
    out.push_str(&format!(
        "| {} | {} | {} | {} | {} | {} | {} |\n\n",
        table_cell(&metadata.source_file),
        table_cell(&metadata.section_name),
        metadata.section_type,
        metadata.archived_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        metadata.original_lines,
        metadata.original_tokens,
        table_cell(&metadata.reason),
    ));
    out.push_str(SUMMARY_HEADING);
    out.push_str("\n\n");
    out.push_str(&metadata.summary);
    out.push_str("\n\n");
    out.push_str(ORIGINAL_HEADING);
    out.push_str("\n\n");
    out.push_str(original);
    out.push('\n');
    out
}

/// The verbatim section body stored in an archive document
///
/// Returns `None` if the document has no original-content heading.
pub fn extract_original_content(archive: &str) -> Option<String> {
    let marker = format!("\n{}\n\n", ORIGINAL_HEADING);
    let start = archive.find(&marker)? + marker.len();
    let body = &archive[start..];
    Some(body.strip_suffix('\n').unwrap_or(body).to_string())
}

/// Human-readable steps for putting an archived section back
pub fn generate_restore_instructions(archive: &ArchiveContent) -> String {
    let m = &archive.metadata;
    let archived = m.archived_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut out = Vec::new();
    out.push(format!("## Restore \"{}\"", m.section_name));
    out.push(String::new());
    out.push(format!(
        "Archived from `{}` at {} ({} lines, ~{} tokens).",
        m.source_file, archived, m.original_lines, m.original_tokens
    ));
    out.push(format!("Reason: {}", m.reason));
    out.push(String::new());
    out.push(format!("1. Open `{}`.", archive.relative_path));
    out.push(format!(
        "2. Copy everything below the `{}` heading.",
        ORIGINAL_HEADING
    ));
    out.push(format!(
        "3. In `{}`, find the archive reference under the \"{}\" header and replace it with the copied text.",
        m.source_file, m.section_name
    ));
    out.push(format!(
        "4. Optionally confirm the restored body hashes to sha256:{}.",
        m.content_hash
    ));
    out.push(format!(
        "5. Delete `{}` once the section is back in place.",
        archive.relative_path
    ));
    out.join("\n")
}
