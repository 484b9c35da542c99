//! Issue shape shared by the detector and the rule engine

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifiedSection, SectionType};
use crate::error::OptimizerError;

/// Savings (tokens) at or above which an issue is high severity
pub const HIGH_SEVERITY_TOKENS: usize = 5000;
/// Savings (tokens) at or above which an issue is medium severity
pub const MEDIUM_SEVERITY_TOKENS: usize = 1000;

/// Kind of token-wasting problem found in a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    OversizedSection,
    VerboseCompletedWork,
    OutdatedReference,
    DuplicateContent,
    StaleDates,
    LowActionability,
    ExcessiveExamples,
}

impl IssueType {
    pub const ALL: [IssueType; 7] = [
        IssueType::OversizedSection,
        IssueType::VerboseCompletedWork,
        IssueType::OutdatedReference,
        IssueType::DuplicateContent,
        IssueType::StaleDates,
        IssueType::LowActionability,
        IssueType::ExcessiveExamples,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::OversizedSection => "oversized-section",
            IssueType::VerboseCompletedWork => "verbose-completed-work",
            IssueType::OutdatedReference => "outdated-reference",
            IssueType::DuplicateContent => "duplicate-content",
            IssueType::StaleDates => "stale-dates",
            IssueType::LowActionability => "low-actionability",
            IssueType::ExcessiveExamples => "excessive-examples",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        IssueType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| OptimizerError::invalid_value("issue type", s))
    }
}

/// Issue severity, derived from estimated savings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Sort rank, 0 for the most severe
    pub fn rank(&self) -> u8 {
        match self {
            Severity::High => 0,
            Severity::Medium => 1,
            Severity::Low => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

/// Severity for an estimated token saving
pub fn calculate_severity(savings: usize) -> Severity {
    if savings >= HIGH_SEVERITY_TOKENS {
        Severity::High
    } else if savings >= MEDIUM_SEVERITY_TOKENS {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Inclusive, 1-indexed line range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of lines covered; zero for an inverted range
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overlaps(&self, other: &LineRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A token-wasting problem in one section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedIssue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub section_name: String,
    pub section_type: SectionType,
    pub description: String,
    pub suggested_action: String,
    pub estimated_savings: usize,
    pub confidence: f64,
    pub line_range: LineRange,
    #[serde(default)]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl DetectedIssue {
    /// Start an issue for `section`; severity follows the savings
    pub fn for_section(
        issue_type: IssueType,
        section: &ClassifiedSection,
        estimated_savings: usize,
        confidence: f64,
    ) -> Self {
        Self {
            issue_type,
            severity: calculate_severity(estimated_savings),
            section_name: section.section.name.clone(),
            section_type: section.section_type,
            description: String::new(),
            suggested_action: String::new(),
            estimated_savings,
            confidence: confidence.clamp(0.0, 1.0),
            line_range: LineRange::new(section.section.start_line, section.section.end_line),
            details: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_suggested_action(mut self, action: impl Into<String>) -> Self {
        self.suggested_action = action.into();
        self
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// String detail, if present
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(|v| v.as_str())
    }

    /// Unsigned integer detail, if present
    pub fn detail_usize(&self, key: &str) -> Option<usize> {
        self.details
            .get(key)
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
    }
}

/// Order by severity (high first), then by estimated savings descending
pub fn compare_issues(a: &DetectedIssue, b: &DetectedIssue) -> Ordering {
    a.severity
        .rank()
        .cmp(&b.severity.rank())
        .then_with(|| b.estimated_savings.cmp(&a.estimated_savings))
}

/// Stable sort by [`compare_issues`]
pub fn sort_issues(issues: &mut [DetectedIssue]) {
    issues.sort_by(compare_issues);
}

/// Total estimated savings across issues
pub fn total_savings(issues: &[DetectedIssue]) -> usize {
    issues.iter().map(|i| i.estimated_savings).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(savings: usize) -> DetectedIssue {
        DetectedIssue {
            issue_type: IssueType::OversizedSection,
            severity: calculate_severity(savings),
            section_name: format!("s{}", savings),
            section_type: SectionType::Unknown,
            description: String::new(),
            suggested_action: String::new(),
            estimated_savings: savings,
            confidence: 0.5,
            line_range: LineRange::new(1, 2),
            details: BTreeMap::new(),
        }
    }

    #[test]
    fn test_calculate_severity_thresholds() {
        assert_eq!(calculate_severity(0), Severity::Low);
        assert_eq!(calculate_severity(999), Severity::Low);
        assert_eq!(calculate_severity(1000), Severity::Medium);
        assert_eq!(calculate_severity(4999), Severity::Medium);
        assert_eq!(calculate_severity(5000), Severity::High);
    }

    #[test]
    fn test_sort_issues_severity_then_savings() {
        let mut issues = vec![issue(10), issue(6000), issue(1500), issue(900), issue(2500)];
        sort_issues(&mut issues);
        let savings: Vec<_> = issues.iter().map(|i| i.estimated_savings).collect();
        assert_eq!(savings, vec![6000, 2500, 1500, 900, 10]);
    }

    #[test]
    fn test_issue_type_parse_accepts_underscores() {
        assert_eq!(
            "low_actionability".parse::<IssueType>().unwrap(),
            IssueType::LowActionability
        );
        assert!("nope".parse::<IssueType>().is_err());
    }

    #[test]
    fn test_line_range_helpers() {
        let r = LineRange::new(5, 10);
        assert_eq!(r.len(), 6);
        assert!(r.overlaps(&LineRange::new(10, 12)));
        assert!(!r.overlaps(&LineRange::new(11, 12)));
        assert!(LineRange::new(5, 4).is_empty());
        assert_eq!(r.to_string(), "5-10");
    }

    #[test]
    fn test_issue_serializes_kebab_type() {
        let json = serde_json::to_value(issue(1)).unwrap();
        assert_eq!(json["type"], "oversized-section");
        assert_eq!(json["severity"], "low");
        assert_eq!(json["line_range"]["start"], 1);
    }
}
