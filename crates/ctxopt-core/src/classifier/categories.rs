//! Section category table
//!
//! Declared order is the tie-break priority: on equal scores the earlier
//! entry wins.

use super::{Actionability, Recommendation, SectionType};

/// Weight of a keyword found in the section header
pub const HEADER_WEIGHT: u32 = 3;
/// Weight of a keyword found in the section body
pub const CONTENT_WEIGHT: u32 = 1;

/// Keyword rule for one section category
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub section_type: SectionType,
    pub header_keywords: &'static [&'static str],
    pub content_keywords: &'static [&'static str],
    pub default_actionability: Actionability,
    pub default_recommendation: Recommendation,
}

pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        section_type: SectionType::CurrentPhase,
        header_keywords: &[
            "current phase",
            "current status",
            "current focus",
            "in progress",
            "active work",
            "next steps",
            "roadmap",
            "status",
        ],
        content_keywords: &["in progress", "next step", "blocked", "currently", "priority", "wip"],
        default_actionability: Actionability::High,
        default_recommendation: Recommendation::Keep,
    },
    CategoryRule {
        section_type: SectionType::Overview,
        header_keywords: &["overview", "introduction", "about", "project", "summary", "purpose"],
        content_keywords: &["this project", "purpose", "goal", "designed to", "built with"],
        default_actionability: Actionability::Medium,
        default_recommendation: Recommendation::Keep,
    },
    CategoryRule {
        section_type: SectionType::Commands,
        header_keywords: &[
            "commands",
            "scripts",
            "usage",
            "quick start",
            "getting started",
            "setup",
            "installation",
            "development",
        ],
        content_keywords: &["npm ", "cargo ", "pip ", "make ", "yarn ", "install", "build", "```bash", "```sh"],
        default_actionability: Actionability::High,
        default_recommendation: Recommendation::Keep,
    },
    CategoryRule {
        section_type: SectionType::Conventions,
        header_keywords: &[
            "conventions",
            "guidelines",
            "style",
            "standards",
            "rules",
            "best practices",
        ],
        content_keywords: &["always", "never", "must", "should", "prefer", "avoid", "naming"],
        default_actionability: Actionability::High,
        default_recommendation: Recommendation::Keep,
    },
    CategoryRule {
        section_type: SectionType::TechStack,
        header_keywords: &["tech stack", "technology", "stack", "dependencies", "architecture", "frameworks"],
        content_keywords: &[
            "react",
            "rust",
            "python",
            "typescript",
            "node",
            "postgres",
            "framework",
            "library",
        ],
        default_actionability: Actionability::Medium,
        default_recommendation: Recommendation::Keep,
    },
    CategoryRule {
        section_type: SectionType::Testing,
        header_keywords: &["testing", "tests", "test strategy", "qa", "coverage"],
        content_keywords: &["test", "coverage", "jest", "pytest", "assert", "mock", "fixture"],
        default_actionability: Actionability::Medium,
        default_recommendation: Recommendation::Keep,
    },
    CategoryRule {
        section_type: SectionType::DataModel,
        header_keywords: &["data model", "schema", "database", "models", "entities", "types"],
        content_keywords: &["table", "column", "foreign key", "primary key", "field", "relation", "migration"],
        default_actionability: Actionability::Medium,
        default_recommendation: Recommendation::Keep,
    },
    CategoryRule {
        section_type: SectionType::CompletedWork,
        header_keywords: &[
            "completed",
            "done",
            "finished",
            "changelog",
            "history",
            "accomplishments",
            "implemented",
        ],
        content_keywords: &["completed", "implemented", "fixed", "added", "✅", "[x]", "shipped", "merged"],
        default_actionability: Actionability::Low,
        default_recommendation: Recommendation::Archive,
    },
    CategoryRule {
        section_type: SectionType::WorkSessions,
        header_keywords: &["session", "work log", "journal", "daily log", "progress log", "sprint"],
        content_keywords: &["session", "today", "yesterday", "worked on", "spent", "pairing"],
        default_actionability: Actionability::Low,
        default_recommendation: Recommendation::Archive,
    },
    CategoryRule {
        section_type: SectionType::Notes,
        header_keywords: &["notes", "misc", "ideas", "scratch", "thoughts", "todo"],
        content_keywords: &["note:", "remember", "idea", "maybe", "consider", "fyi"],
        default_actionability: Actionability::Low,
        default_recommendation: Recommendation::Review,
    },
];

/// Look up the table entry for a section type
pub fn category_rule(section_type: SectionType) -> Option<&'static CategoryRule> {
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.section_type == section_type)
}

/// Default actionability for a type; `unknown` sections are medium
pub fn default_actionability(section_type: SectionType) -> Actionability {
    category_rule(section_type)
        .map(|rule| rule.default_actionability)
        .unwrap_or(Actionability::Medium)
}

/// Default recommendation for a type; `unknown` sections are reviewed
pub fn default_recommendation(section_type: SectionType) -> Recommendation {
    category_rule(section_type)
        .map(|rule| rule.default_recommendation)
        .unwrap_or(Recommendation::Review)
}
