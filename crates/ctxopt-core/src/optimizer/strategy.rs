//! Strategy presets and strategy recommendation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analyzer::AnalysisResult;
use crate::bail_usage;
use crate::classifier::SectionType;
use crate::error::{OptimizerError, Result};
use crate::issue::{total_savings, DetectedIssue, IssueType, Severity};

/// How aggressively the planner proposes edits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
    Custom,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Conservative,
        Strategy::Moderate,
        Strategy::Aggressive,
        Strategy::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Conservative => "conservative",
            Strategy::Moderate => "moderate",
            Strategy::Aggressive => "aggressive",
            Strategy::Custom => "custom",
        }
    }

    /// Built-in thresholds, `None` for [`Strategy::Custom`]
    pub fn preset(&self) -> Option<StrategyConfig> {
        match self {
            Strategy::Conservative => Some(StrategyConfig::conservative()),
            Strategy::Moderate => Some(StrategyConfig::moderate()),
            Strategy::Aggressive => Some(StrategyConfig::aggressive()),
            Strategy::Custom => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = OptimizerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Strategy::ALL
            .into_iter()
            .find(|st| st.as_str() == lower)
            .ok_or_else(|| {
                OptimizerError::unsupported(
                    "strategy",
                    s,
                    "conservative, moderate, aggressive, custom",
                )
            })
    }
}

fn default_keep_lines() -> usize {
    30
}

/// Thresholds and scope for one planning run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Sections longer than this with low actionability are archived
    pub archive_threshold: usize,
    /// Sections longer than this without high actionability are condensed
    pub condense_threshold: usize,
    #[serde(default)]
    pub include_issue_types: Vec<IssueType>,
    #[serde(default)]
    pub preserve_types: Vec<SectionType>,
    pub max_actions: usize,
    /// Lines a condensed section keeps when the issue names none
    #[serde(default = "default_keep_lines")]
    pub condense_keep_lines: usize,
}

impl StrategyConfig {
    pub fn conservative() -> Self {
        Self {
            archive_threshold: 200,
            condense_threshold: 300,
            include_issue_types: vec![
                IssueType::VerboseCompletedWork,
                IssueType::LowActionability,
                IssueType::StaleDates,
            ],
            preserve_types: vec![
                SectionType::Overview,
                SectionType::CurrentPhase,
                SectionType::Commands,
                SectionType::Conventions,
                SectionType::TechStack,
                SectionType::Testing,
                SectionType::DataModel,
            ],
            max_actions: 3,
            condense_keep_lines: 40,
        }
    }

    pub fn moderate() -> Self {
        Self {
            archive_threshold: 100,
            condense_threshold: 150,
            include_issue_types: vec![
                IssueType::VerboseCompletedWork,
                IssueType::LowActionability,
                IssueType::StaleDates,
                IssueType::OversizedSection,
                IssueType::ExcessiveExamples,
                IssueType::OutdatedReference,
            ],
            preserve_types: vec![
                SectionType::Overview,
                SectionType::CurrentPhase,
                SectionType::Conventions,
            ],
            max_actions: 10,
            condense_keep_lines: 30,
        }
    }

    pub fn aggressive() -> Self {
        Self {
            archive_threshold: 50,
            condense_threshold: 80,
            include_issue_types: IssueType::ALL.to_vec(),
            preserve_types: vec![SectionType::CurrentPhase],
            max_actions: 25,
            condense_keep_lines: 20,
        }
    }

    /// Resolve the config for `strategy`; `Custom` requires `custom`
    pub fn resolve(strategy: Strategy, custom: Option<&StrategyConfig>) -> Result<Self> {
        if let Some(preset) = strategy.preset() {
            return Ok(preset);
        }
        match custom {
            Some(config) => Ok(config.clone()),
            None => bail_usage!("the custom strategy requires a [custom_strategy] configuration"),
        }
    }

    pub fn includes(&self, issue_type: IssueType) -> bool {
        self.include_issue_types.contains(&issue_type)
    }

    pub fn preserves(&self, section_type: SectionType) -> bool {
        self.preserve_types.contains(&section_type)
    }
}

/// Pick a strategy from document size and issue severity
///
/// Advisory only; callers may plan with any strategy.
pub fn get_recommended_strategy(analysis: &AnalysisResult, issues: &[DetectedIssue]) -> Strategy {
    let high = issues
        .iter()
        .filter(|i| i.severity == Severity::High)
        .count();
    let savings_percent = if analysis.total_tokens == 0 {
        0.0
    } else {
        total_savings(issues) as f64 / analysis.total_tokens as f64 * 100.0
    };

    if analysis.total_tokens > 20_000 || high >= 3 || savings_percent > 50.0 {
        Strategy::Aggressive
    } else if analysis.total_tokens > 10_000 || high >= 1 || savings_percent > 30.0 {
        Strategy::Moderate
    } else {
        Strategy::Conservative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;

    fn analysis_with_tokens(tokens: usize) -> AnalysisResult {
        let mut analysis = Analyzer::new().analyze_content("# A\nbody", "CLAUDE.md");
        analysis.total_tokens = tokens;
        analysis
    }

    #[test]
    fn test_presets_scale_with_aggressiveness() {
        let c = StrategyConfig::conservative();
        let m = StrategyConfig::moderate();
        let a = StrategyConfig::aggressive();
        assert!(c.archive_threshold > m.archive_threshold && m.archive_threshold > a.archive_threshold);
        assert!(c.max_actions < m.max_actions && m.max_actions < a.max_actions);
        assert!(c.preserve_types.len() > m.preserve_types.len());
        assert_eq!(a.include_issue_types.len(), IssueType::ALL.len());
    }

    #[test]
    fn test_resolve_custom_requires_config() {
        assert!(StrategyConfig::resolve(Strategy::Custom, None).is_err());
        let mut custom = StrategyConfig::moderate();
        custom.max_actions = 1;
        let resolved = StrategyConfig::resolve(Strategy::Custom, Some(&custom)).unwrap();
        assert_eq!(resolved.max_actions, 1);
        // presets ignore a supplied custom config
        let resolved = StrategyConfig::resolve(Strategy::Aggressive, Some(&custom)).unwrap();
        assert_eq!(resolved, StrategyConfig::aggressive());
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("Aggressive".parse::<Strategy>().unwrap(), Strategy::Aggressive);
        assert!("yolo".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_recommend_aggressive_for_large_documents() {
        assert_eq!(
            get_recommended_strategy(&analysis_with_tokens(25_000), &[]),
            Strategy::Aggressive
        );
    }

    #[test]
    fn test_recommend_by_size() {
        assert_eq!(
            get_recommended_strategy(&analysis_with_tokens(15_000), &[]),
            Strategy::Moderate
        );
        assert_eq!(
            get_recommended_strategy(&analysis_with_tokens(500), &[]),
            Strategy::Conservative
        );
    }
}
