//! Document analysis: sections, token estimates and stale dates
//!
//! The analyzer is pure over its input text. Only [`Analyzer::analyze_file`]
//! touches the filesystem.

mod dates;
mod sections;

pub use dates::{detect_stale_dates, StaleDate};
pub(crate) use dates::dates_in_line;
pub use sections::{count_tokens, parse_header, parse_sections, split_lines, ParsedSection};

use std::fs;
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OptimizerConfig;
use crate::error::{OptimizerError, Result};

/// Default age in days after which a date reference counts as stale
pub const DEFAULT_STALE_AFTER_DAYS: i64 = 30;

/// Full analysis of one context document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub file_path: String,
    pub total_lines: usize,
    pub total_tokens: usize,
    pub sections: Vec<ParsedSection>,
    pub stale_dates: Vec<StaleDate>,
    pub raw_content: String,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// Stale dates that fall inside `section`
    pub fn stale_dates_in<'a>(
        &'a self,
        section: &'a ParsedSection,
    ) -> impl Iterator<Item = &'a StaleDate> + 'a {
        self.stale_dates
            .iter()
            .filter(move |d| section.contains_line(d.line_number))
    }
}

/// Section and date analysis with an explicit reference date
#[derive(Debug, Clone)]
pub struct Analyzer {
    reference_date: NaiveDate,
    stale_after_days: i64,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    /// Create an analyzer dated today with the default staleness threshold
    pub fn new() -> Self {
        Self {
            reference_date: Local::now().date_naive(),
            stale_after_days: DEFAULT_STALE_AFTER_DAYS,
        }
    }

    /// Create an analyzer using the configured staleness threshold
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new().with_stale_after_days(config.stale_after_days)
    }

    /// Measure date ages from `date` instead of today
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }

    /// Override the staleness threshold
    pub fn with_stale_after_days(mut self, days: i64) -> Self {
        self.stale_after_days = days;
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Stale dates in `content` relative to the reference date
    pub fn detect_stale_dates(&self, content: &str) -> Vec<StaleDate> {
        detect_stale_dates(content, self.reference_date, self.stale_after_days)
    }

    /// Analyze already-read document text. Never fails.
    pub fn analyze_content(&self, content: &str, path: &str) -> AnalysisResult {
        let start = Instant::now();
        let sections = parse_sections(content);
        let stale_dates = self.detect_stale_dates(content);
        let result = AnalysisResult {
            file_path: path.to_string(),
            total_lines: split_lines(content).len(),
            total_tokens: count_tokens(content),
            sections,
            stale_dates,
            raw_content: content.to_string(),
            analyzed_at: Utc::now(),
        };

        debug!(
            path,
            total_lines = result.total_lines,
            total_tokens = result.total_tokens,
            sections = result.sections.len(),
            stale_dates = result.stale_dates.len(),
            elapsed = ?start.elapsed(),
            "analyze_content"
        );

        result
    }

    /// Read and analyze a document from disk
    pub fn analyze_file(&self, path: &Path) -> Result<AnalysisResult> {
        if !path.exists() {
            return Err(OptimizerError::DocumentNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(self.analyze_content(&content, &path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn analyzer() -> Analyzer {
        Analyzer::new().with_reference_date(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
    }

    #[test]
    fn test_analyze_content_totals() {
        let content = "# Project\nA tool.\n\n## History\nShipped 2024-05-01\n";
        let result = analyzer().analyze_content(content, "CLAUDE.md");
        assert_eq!(result.file_path, "CLAUDE.md");
        assert_eq!(result.total_lines, 6);
        assert_eq!(result.total_tokens, count_tokens(content));
        assert_eq!(result.sections.len(), 2);
        assert_eq!(result.stale_dates.len(), 1);
        assert_eq!(result.stale_dates[0].line_number, 5);
        assert_eq!(result.raw_content, content);
    }

    #[test]
    fn test_analyze_content_without_headers() {
        let content = "plain text\nwith 2024-01-01 in it";
        let result = analyzer().analyze_content(content, "notes.md");
        assert!(result.sections.is_empty());
        assert_eq!(result.total_lines, 2);
        assert!(result.total_tokens > 0);
        assert_eq!(result.stale_dates.len(), 1);
    }

    #[test]
    fn test_stale_dates_in_section() {
        let content = "# A\n2024-01-01\n# B\n2024-02-02\n2024-03-03";
        let result = analyzer().analyze_content(content, "CLAUDE.md");
        let b = &result.sections[1];
        assert_eq!(result.stale_dates_in(b).count(), 2);
    }

    #[test]
    fn test_stale_threshold_override() {
        let content = "# A\nreviewed 2026-08-01";
        let strict = analyzer().with_stale_after_days(30);
        let lenient = analyzer().with_stale_after_days(365);
        assert_eq!(strict.analyze_content(content, "x").stale_dates.len(), 1);
        assert!(lenient.analyze_content(content, "x").stale_dates.is_empty());
    }

    #[test]
    fn test_analyze_file_missing() {
        let dir = tempdir().unwrap();
        let err = analyzer()
            .analyze_file(&dir.path().join("CLAUDE.md"))
            .unwrap_err();
        assert!(matches!(err, OptimizerError::DocumentNotFound { .. }));
    }

    #[test]
    fn test_analyze_file_reads_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("CLAUDE.md");
        fs::write(&path, "# Title\nbody\n").unwrap();
        let result = analyzer().analyze_file(&path).unwrap();
        assert_eq!(result.sections.len(), 1);
        assert_eq!(result.file_path, path.display().to_string());
    }
}
