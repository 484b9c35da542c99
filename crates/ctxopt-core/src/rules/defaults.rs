//! Built-in rule table

use crate::classifier::{Actionability, SectionType};
use crate::issue::IssueType;

use super::{OptimizationRule, RuleAction, RuleMatcher};

fn rule(
    name: &str,
    description: &str,
    issue_type: IssueType,
    priority: u32,
    confidence: f64,
    matcher: RuleMatcher,
    action: RuleAction,
) -> OptimizationRule {
    OptimizationRule {
        name: name.to_string(),
        description: description.to_string(),
        matcher,
        action,
        issue_type,
        priority,
        confidence,
        enabled: true,
    }
}

/// The shipped rules, highest priority first
pub fn default_rules() -> Vec<OptimizationRule> {
    let mut rules = archive_rules();
    rules.extend(condense_rules());
    rules.extend(content_rules());
    rules
}

fn archive_rules() -> Vec<OptimizationRule> {
    vec![
        rule(
            "archive-session-logs",
            "Session logs belong in an archive, not in live context",
            IssueType::VerboseCompletedWork,
            100,
            0.9,
            RuleMatcher {
                name_pattern: Some(r"(?i)\b(session|sprint|daily)\s+(log|notes|journal)s?\b".into()),
                min_lines: Some(20),
                ..Default::default()
            },
            RuleAction::Archive {
                reason: "Session log".into(),
            },
        ),
        rule(
            "archive-completed-work",
            "Completed work history rarely guides current sessions",
            IssueType::VerboseCompletedWork,
            95,
            0.9,
            RuleMatcher {
                section_types: vec![SectionType::CompletedWork, SectionType::WorkSessions],
                min_lines: Some(30),
                ..Default::default()
            },
            RuleAction::Archive {
                reason: "Completed work history".into(),
            },
        ),
        rule(
            "archive-stale-low-actionability",
            "Stale sections with little actionable guidance",
            IssueType::LowActionability,
            90,
            0.8,
            RuleMatcher {
                max_actionability: Some(Actionability::Low),
                min_staleness: Some(0.6),
                min_lines: Some(30),
                ..Default::default()
            },
            RuleAction::Archive {
                reason: "Stale, low-actionability content".into(),
            },
        ),
    ]
}

fn condense_rules() -> Vec<OptimizationRule> {
    vec![
        rule(
            "condense-oversized-lines",
            "Sections over 100 lines dilute the context window",
            IssueType::OversizedSection,
            80,
            0.8,
            RuleMatcher {
                min_lines: Some(100),
                ..Default::default()
            },
            RuleAction::Condense { keep_lines: 40 },
        ),
        rule(
            "condense-oversized-tokens",
            "Sections over 2500 tokens dilute the context window",
            IssueType::OversizedSection,
            79,
            0.75,
            RuleMatcher {
                min_tokens: Some(2500),
                ..Default::default()
            },
            RuleAction::Condense { keep_lines: 40 },
        ),
        rule(
            "condense-excessive-examples",
            "More than five code examples in one section",
            IssueType::ExcessiveExamples,
            70,
            0.75,
            RuleMatcher {
                min_code_blocks: Some(6),
                ..Default::default()
            },
            RuleAction::Condense { keep_lines: 20 },
        ),
    ]
}

fn content_rules() -> Vec<OptimizationRule> {
    vec![
        rule(
            "dedupe-install-instructions",
            "Install instructions usually duplicate the README",
            IssueType::DuplicateContent,
            60,
            0.6,
            RuleMatcher {
                section_types: vec![SectionType::Commands, SectionType::TechStack],
                content_pattern: Some(r"(?i)\b(npm|yarn|pnpm|pip|cargo|brew)\s+install\b".into()),
                min_lines: Some(10),
                ..Default::default()
            },
            RuleAction::Dedupe {
                reference: "README.md".into(),
            },
        ),
        rule(
            "flag-deprecated-references",
            "Mentions of deprecated or removed functionality",
            IssueType::OutdatedReference,
            50,
            0.6,
            RuleMatcher {
                content_pattern: Some(
                    r"(?i)\b(deprecated|obsolete|no longer (used|supported|maintained))\b".into(),
                ),
                ..Default::default()
            },
            RuleAction::Flag {
                message: "Verify these references still apply".into(),
            },
        ),
        rule(
            "remove-placeholder",
            "Sections holding only a placeholder",
            IssueType::LowActionability,
            40,
            0.9,
            RuleMatcher {
                content_pattern: Some(r"(?i)\A\s*(tbd|todo|coming soon|n/a)\.?\s*\z".into()),
                ..Default::default()
            },
            RuleAction::Remove,
        ),
    ]
}
