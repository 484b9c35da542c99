//! Section classification
//!
//! Assigns each parsed section a semantic type, an actionability level, a
//! staleness score and a recommendation using a fixed keyword table and
//! threshold rules. Classification is deterministic and never fails: a
//! section that matches nothing is `unknown` with zero confidence.

mod categories;
mod scoring;

pub use categories::{
    category_rule, default_actionability, default_recommendation, CategoryRule, CATEGORY_RULES,
    CONTENT_WEIGHT, HEADER_WEIGHT,
};
pub use scoring::{assess_actionability, assess_staleness, get_recommendation, STALE_PHRASES};

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzer::{ParsedSection, StaleDate};
use crate::error::OptimizerError;

/// Semantic category of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionType {
    Overview,
    CurrentPhase,
    TechStack,
    Commands,
    Conventions,
    CompletedWork,
    WorkSessions,
    Testing,
    DataModel,
    Notes,
    Unknown,
}

impl SectionType {
    pub const ALL: [SectionType; 11] = [
        SectionType::Overview,
        SectionType::CurrentPhase,
        SectionType::TechStack,
        SectionType::Commands,
        SectionType::Conventions,
        SectionType::CompletedWork,
        SectionType::WorkSessions,
        SectionType::Testing,
        SectionType::DataModel,
        SectionType::Notes,
        SectionType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Overview => "overview",
            SectionType::CurrentPhase => "current-phase",
            SectionType::TechStack => "tech-stack",
            SectionType::Commands => "commands",
            SectionType::Conventions => "conventions",
            SectionType::CompletedWork => "completed-work",
            SectionType::WorkSessions => "work-sessions",
            SectionType::Testing => "testing",
            SectionType::DataModel => "data-model",
            SectionType::Notes => "notes",
            SectionType::Unknown => "unknown",
        }
    }

    /// Types that record past activity rather than current guidance
    pub fn is_historical(&self) -> bool {
        matches!(
            self,
            SectionType::CompletedWork | SectionType::WorkSessions | SectionType::Notes
        )
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionType {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        SectionType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| OptimizerError::invalid_value("section type", s))
    }
}

/// How useful a section is to an active coding session
///
/// Ordered from least to most useful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actionability {
    Low,
    Medium,
    High,
}

impl Actionability {
    /// One level less useful; `low` stays `low`
    pub fn downgrade(self) -> Self {
        match self {
            Actionability::High => Actionability::Medium,
            Actionability::Medium | Actionability::Low => Actionability::Low,
        }
    }
}

impl fmt::Display for Actionability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actionability::Low => write!(f, "low"),
            Actionability::Medium => write!(f, "medium"),
            Actionability::High => write!(f, "high"),
        }
    }
}

/// Suggested treatment for a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Keep,
    Archive,
    Condense,
    Review,
    Dedupe,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Recommendation::Keep => "keep",
            Recommendation::Archive => "archive",
            Recommendation::Condense => "condense",
            Recommendation::Review => "review",
            Recommendation::Dedupe => "dedupe",
        };
        f.write_str(s)
    }
}

/// Result of matching a section against the category table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub section_type: SectionType,
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
}

/// A parsed section with its classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedSection {
    #[serde(flatten)]
    pub section: ParsedSection,
    #[serde(rename = "type")]
    pub section_type: SectionType,
    pub actionability: Actionability,
    pub staleness: f64,
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
    pub recommendation: Recommendation,
}

impl ClassifiedSection {
    pub fn name(&self) -> &str {
        &self.section.name
    }
}

/// Match a section header and body against the category table
///
/// Header keywords weigh 3, body keywords 1. The highest score wins; ties go
/// to the earlier table entry.
pub fn classify_section(name: &str, content: &str) -> Classification {
    let name_lower = name.to_lowercase();
    let content_lower = content.to_lowercase();

    let mut best: Option<(u32, &CategoryRule, Vec<String>)> = None;

    for rule in CATEGORY_RULES {
        let mut score = 0;
        let mut matched = Vec::new();
        for kw in rule.header_keywords {
            if name_lower.contains(kw) {
                score += HEADER_WEIGHT;
                matched.push((*kw).to_string());
            }
        }
        for kw in rule.content_keywords {
            if content_lower.contains(kw) {
                score += CONTENT_WEIGHT;
                matched.push((*kw).to_string());
            }
        }
        if score == 0 {
            continue;
        }
        if best.as_ref().map_or(true, |(top, _, _)| score > *top) {
            best = Some((score, rule, matched));
        }
    }

    match best {
        Some((score, rule, matched_keywords)) => Classification {
            section_type: rule.section_type,
            confidence: (f64::from(score) / 10.0).min(1.0),
            matched_keywords,
        },
        None => Classification {
            section_type: SectionType::Unknown,
            confidence: 0.0,
            matched_keywords: Vec::new(),
        },
    }
}

/// Classify one parsed section
pub fn classify(section: &ParsedSection, stale_dates: &[StaleDate]) -> ClassifiedSection {
    let classification = classify_section(&section.name, &section.content);
    let section_type = classification.section_type;
    let actionability = assess_actionability(section, section_type, stale_dates);
    let staleness = assess_staleness(section, section_type, stale_dates);
    let recommendation =
        get_recommendation(section_type, actionability, staleness, section.line_count);

    ClassifiedSection {
        section: section.clone(),
        section_type,
        actionability,
        staleness,
        confidence: classification.confidence,
        matched_keywords: classification.matched_keywords,
        recommendation,
    }
}

/// Classify every section of a document
pub fn classify_sections(
    sections: &[ParsedSection],
    stale_dates: &[StaleDate],
) -> Vec<ClassifiedSection> {
    let start = Instant::now();
    let classified: Vec<ClassifiedSection> = sections
        .iter()
        .map(|section| classify(section, stale_dates))
        .collect();

    debug!(
        sections = classified.len(),
        unknown = classified
            .iter()
            .filter(|c| c.section_type == SectionType::Unknown)
            .count(),
        elapsed = ?start.elapsed(),
        "classify_sections"
    );

    classified
}
