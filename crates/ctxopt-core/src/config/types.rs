//! Configuration type definitions

use serde::{Deserialize, Serialize};

use crate::analyzer::DEFAULT_STALE_AFTER_DAYS;
use crate::archive::SummaryOptions;
use crate::optimizer::{Strategy, StrategyConfig};
use crate::rules::{IssueSource, OptimizationRule};

fn default_stale_after_days() -> i64 {
    DEFAULT_STALE_AFTER_DAYS
}

/// Project-level optimizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Days after which a date reference counts as stale
    #[serde(default = "default_stale_after_days")]
    pub stale_after_days: i64,

    /// Strategy used when none is requested (optional; default is the
    /// recommended strategy)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_strategy: Option<Strategy>,

    /// Which issue generator(s) feed the planner
    #[serde(default)]
    pub issue_source: IssueSource,

    /// Archive summary limits
    #[serde(default)]
    pub summary: SummaryOptions,

    /// Thresholds for the `custom` strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_strategy: Option<StrategyConfig>,

    /// Rule table adjustments
    #[serde(default)]
    pub rules: RulesConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            stale_after_days: DEFAULT_STALE_AFTER_DAYS,
            default_strategy: None,
            issue_source: IssueSource::default(),
            summary: SummaryOptions::default(),
            custom_strategy: None,
            rules: RulesConfig::default(),
        }
    }
}

/// Changes to the default rule table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Names of default rules to turn off
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled: Vec<String>,

    /// Additional rules evaluated alongside the defaults
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<OptimizationRule>,
}
