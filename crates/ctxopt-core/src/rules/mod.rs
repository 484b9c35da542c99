//! Declarative optimization rules
//!
//! Rules are plain records: a matcher of ANDed conditions, an action, and a
//! priority. A [`RuleSet`] compiles the patterns once and evaluates every
//! rule against every section in a single function. Each `(section, issue
//! type)` pair is claimed by the first, highest-priority rule that matches.

mod defaults;

pub use defaults::default_rules;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analyzer::AnalysisResult;
use crate::classifier::{Actionability, ClassifiedSection, SectionType};
use crate::config::RulesConfig;
use crate::detector::{detect_issues, percent_of};
use crate::error::{OptimizerError, Result};
use crate::issue::{sort_issues, DetectedIssue, IssueType};
use crate::text::code_blocks;

fn default_confidence() -> f64 {
    0.8
}

fn default_enabled() -> bool {
    true
}

/// Conditions a section must meet; absent conditions match anything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleMatcher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub section_types: Vec<SectionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_lines: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_tokens: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_staleness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_actionability: Option<Actionability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_code_blocks: Option<usize>,
}

/// What a matching rule proposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RuleAction {
    Archive { reason: String },
    Condense { keep_lines: usize },
    Remove,
    Flag { message: String },
    Dedupe { reference: String },
}

impl RuleAction {
    pub fn kind(&self) -> &'static str {
        match self {
            RuleAction::Archive { .. } => "archive",
            RuleAction::Condense { .. } => "condense",
            RuleAction::Remove => "remove",
            RuleAction::Flag { .. } => "flag",
            RuleAction::Dedupe { .. } => "dedupe",
        }
    }

    /// Tokens this action would recover from `section`
    pub fn estimate_savings(&self, section: &ClassifiedSection) -> usize {
        let tokens = section.section.estimated_tokens;
        match self {
            RuleAction::Archive { .. } => percent_of(tokens, 95),
            RuleAction::Condense { keep_lines } => {
                let lines = section.section.line_count;
                if lines == 0 || *keep_lines >= lines {
                    return 0;
                }
                let kept = *keep_lines as f64 / lines as f64;
                (tokens as f64 * (1.0 - kept)).round() as usize
            }
            RuleAction::Dedupe { .. } => percent_of(tokens, 90),
            RuleAction::Remove => tokens,
            RuleAction::Flag { .. } => 0,
        }
    }

    fn suggestion(&self) -> String {
        match self {
            RuleAction::Archive { reason } => format!("Archive section ({})", reason),
            RuleAction::Condense { keep_lines } => {
                format!("Condense to at most {} lines", keep_lines)
            }
            RuleAction::Remove => "Remove section".to_string(),
            RuleAction::Flag { message } => message.clone(),
            RuleAction::Dedupe { reference } => format!("Replace with a reference to {}", reference),
        }
    }
}

/// A declarative rule record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRule {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub issue_type: IssueType,
    #[serde(default)]
    pub priority: u32,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub action: RuleAction,
    #[serde(default)]
    pub matcher: RuleMatcher,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: OptimizationRule,
    name_re: Option<Regex>,
    content_re: Option<Regex>,
    /// Set when a pattern failed to compile; the rule never matches
    broken: bool,
}

impl CompiledRule {
    fn compile(rule: OptimizationRule) -> std::result::Result<Self, (OptimizationRule, String)> {
        let name_re = match rule.matcher.name_pattern.as_deref().map(Regex::new).transpose() {
            Ok(re) => re,
            Err(e) => return Err((rule, e.to_string())),
        };
        let content_re = match rule.matcher.content_pattern.as_deref().map(Regex::new).transpose() {
            Ok(re) => re,
            Err(e) => return Err((rule, e.to_string())),
        };
        Ok(Self {
            rule,
            name_re,
            content_re,
            broken: false,
        })
    }

    fn disabled(rule: OptimizationRule) -> Self {
        Self {
            rule,
            name_re: None,
            content_re: None,
            broken: true,
        }
    }

    fn matches(&self, section: &ClassifiedSection) -> bool {
        if self.broken || !self.rule.enabled {
            return false;
        }
        let m = &self.rule.matcher;
        let s = &section.section;

        if let Some(re) = &self.name_re {
            if !re.is_match(&s.name) {
                return false;
            }
        }
        if let Some(re) = &self.content_re {
            if !re.is_match(&s.content) {
                return false;
            }
        }
        if !m.section_types.is_empty() && !m.section_types.contains(&section.section_type) {
            return false;
        }
        if m.min_lines.is_some_and(|n| s.line_count < n)
            || m.max_lines.is_some_and(|n| s.line_count > n)
            || m.min_tokens.is_some_and(|n| s.estimated_tokens < n)
            || m.min_staleness.is_some_and(|n| section.staleness < n)
            || m.max_actionability.is_some_and(|a| section.actionability > a)
        {
            return false;
        }
        if let Some(n) = m.min_code_blocks {
            if code_blocks(&s.content).len() < n {
                return false;
            }
        }
        true
    }

    fn to_issue(&self, section: &ClassifiedSection) -> DetectedIssue {
        let rule = &self.rule;
        let savings = rule.action.estimate_savings(section);
        let description = if rule.description.is_empty() {
            format!("Matched rule '{}'", rule.name)
        } else {
            rule.description.clone()
        };

        let mut issue = DetectedIssue::for_section(rule.issue_type, section, savings, rule.confidence)
            .with_description(description)
            .with_suggested_action(rule.action.suggestion())
            .with_detail("rule", rule.name.as_str())
            .with_detail("action", rule.action.kind());

        match &rule.action {
            RuleAction::Archive { reason } => issue = issue.with_detail("reason", reason.as_str()),
            RuleAction::Condense { keep_lines } => {
                issue = issue.with_detail("keep_lines", *keep_lines as u64)
            }
            RuleAction::Dedupe { reference } => {
                issue = issue.with_detail("reference", reference.as_str())
            }
            RuleAction::Flag { message } => issue = issue.with_detail("message", message.as_str()),
            RuleAction::Remove => {}
        }
        issue
    }
}

/// Rules with their patterns compiled, sorted by descending priority
///
/// Build once and reuse across documents; nothing is cached globally.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Compile `rules`, logging and disabling any whose pattern is invalid
    pub fn new(rules: Vec<OptimizationRule>) -> Self {
        let compiled = rules
            .into_iter()
            .map(|rule| match CompiledRule::compile(rule) {
                Ok(c) => c,
                Err((rule, reason)) => {
                    warn!(rule = %rule.name, %reason, "rule pattern does not compile; rule disabled");
                    CompiledRule::disabled(rule)
                }
            })
            .collect();
        Self::sorted(compiled)
    }

    /// Compile `rules`, failing on the first invalid pattern
    pub fn strict(rules: Vec<OptimizationRule>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            match CompiledRule::compile(rule) {
                Ok(c) => compiled.push(c),
                Err((rule, reason)) => return Err(OptimizerError::invalid_rule(&rule.name, reason)),
            }
        }
        Ok(Self::sorted(compiled))
    }

    /// The shipped rule table
    pub fn with_defaults() -> Self {
        Self::new(default_rules())
    }

    /// Defaults minus `disabled`, plus `extra` (which must compile)
    pub fn from_config(config: &RulesConfig) -> Result<Self> {
        let disabled: HashSet<&str> = config.disabled.iter().map(String::as_str).collect();
        let known: HashSet<String> = default_rules().into_iter().map(|r| r.name).collect();
        for name in &disabled {
            if !known.contains(*name) {
                warn!(rule = %name, "disabled rule is not a default rule");
            }
        }

        let mut rules: Vec<OptimizationRule> = default_rules()
            .into_iter()
            .filter(|r| !disabled.contains(r.name.as_str()))
            .collect();
        rules.extend(config.extra.iter().cloned());
        Self::strict(rules)
    }

    fn sorted(mut rules: Vec<CompiledRule>) -> Self {
        rules.sort_by(|a, b| b.rule.priority.cmp(&a.rule.priority));
        Self { rules }
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> impl Iterator<Item = &OptimizationRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule against every section
    pub fn apply(&self, classified: &[ClassifiedSection]) -> Vec<DetectedIssue> {
        let start = Instant::now();
        let mut issues = Vec::new();

        for section in classified {
            let mut claimed: HashSet<IssueType> = HashSet::new();
            for compiled in &self.rules {
                if claimed.contains(&compiled.rule.issue_type) || !compiled.matches(section) {
                    continue;
                }
                claimed.insert(compiled.rule.issue_type);
                issues.push(compiled.to_issue(section));
            }
        }

        sort_issues(&mut issues);

        debug!(
            rules = self.rules.len(),
            sections = classified.len(),
            issues = issues.len(),
            elapsed = ?start.elapsed(),
            "apply_rules"
        );

        issues
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Evaluate `rules` against `classified`
pub fn apply_rules(classified: &[ClassifiedSection], rules: &RuleSet) -> Vec<DetectedIssue> {
    rules.apply(classified)
}

/// Which issue generator(s) feed the planner
///
/// The two sources estimate savings with different formulas; `Both`
/// concatenates their issues without reconciling them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSource {
    Detector,
    Rules,
    #[default]
    Both,
}

impl fmt::Display for IssueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSource::Detector => write!(f, "detector"),
            IssueSource::Rules => write!(f, "rules"),
            IssueSource::Both => write!(f, "both"),
        }
    }
}

impl FromStr for IssueSource {
    type Err = OptimizerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "detector" => Ok(IssueSource::Detector),
            "rules" => Ok(IssueSource::Rules),
            "both" => Ok(IssueSource::Both),
            other => Err(OptimizerError::unsupported(
                "issue source",
                other,
                "detector, rules, both",
            )),
        }
    }
}

/// Gather issues from the selected source(s), most severe first
pub fn collect_issues(
    source: IssueSource,
    analysis: &AnalysisResult,
    classified: &[ClassifiedSection],
    rules: &RuleSet,
) -> Vec<DetectedIssue> {
    let mut issues = match source {
        IssueSource::Detector => detect_issues(analysis, classified),
        IssueSource::Rules => rules.apply(classified),
        IssueSource::Both => {
            let mut all = detect_issues(analysis, classified);
            all.extend(rules.apply(classified));
            all
        }
    };
    sort_issues(&mut issues);
    issues
}
