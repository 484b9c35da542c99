//! Optimization planning and application
//!
//! [`generate_plan`] turns issues into at most one concrete, section-scoped
//! action per section. [`apply_plan`] splices those actions into the
//! document text, bottom-up, recording per-action failures instead of
//! aborting.

mod apply;
mod plan;
mod replace;
mod strategy;

pub use apply::{
    apply_plan, apply_plan_with, preview_plan, preview_plan_with, ActionPreview, FailedAction,
    OptimizationResult, PlanPreview,
};
pub use plan::{generate_plan, generate_plan_at, PREVIEW_CHARS};
pub use replace::{
    archive_reference_line, condense_lines, condense_with_examples, render_replacement,
    DEFAULT_REFERENCE,
};
pub use strategy::{get_recommended_strategy, Strategy, StrategyConfig};

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::SectionType;
use crate::issue::{IssueType, LineRange};

/// Kind of edit an action makes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Archive,
    Condense,
    Dedupe,
    Remove,
    /// Relocation to another document; never applied automatically
    Move,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionType::Archive => "archive",
            ActionType::Condense => "condense",
            ActionType::Dedupe => "dedupe",
            ActionType::Remove => "remove",
            ActionType::Move => "move",
        };
        f.write_str(s)
    }
}

/// A concrete edit to one section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub section_name: String,
    pub section_type: SectionType,
    pub description: String,
    /// Original section text, truncated for display
    pub before: String,
    /// Replacement text without the kept header line
    pub after: String,
    pub lines_saved: usize,
    pub tokens_saved: usize,
    pub line_range: LineRange,
    /// 1 is most urgent
    pub priority: u8,
    /// Project-relative archive file, for archive actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_lines: Option<usize>,
    /// Fenced examples a condense keeps on top of `keep_lines`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_examples: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_issue: Option<IssueType>,
}

/// Projected effect of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub current_lines: usize,
    pub current_tokens: usize,
    pub projected_lines: usize,
    pub projected_tokens: usize,
    pub lines_saved: usize,
    pub tokens_saved: usize,
    pub reduction_percent: f64,
    pub action_count: usize,
}

impl PlanSummary {
    fn from_actions(current_lines: usize, current_tokens: usize, actions: &[OptimizationAction]) -> Self {
        let lines_saved: usize = actions.iter().map(|a| a.lines_saved).sum();
        let tokens_saved: usize = actions.iter().map(|a| a.tokens_saved).sum();
        let reduction_percent = if current_tokens == 0 {
            0.0
        } else {
            let raw = tokens_saved as f64 / current_tokens as f64 * 100.0;
            (raw.min(100.0) * 10.0).round() / 10.0
        };
        Self {
            current_lines,
            current_tokens,
            projected_lines: current_lines.saturating_sub(lines_saved),
            projected_tokens: current_tokens.saturating_sub(tokens_saved),
            lines_saved,
            tokens_saved,
            reduction_percent,
            action_count: actions.len(),
        }
    }
}

/// Ordered actions for one document under one strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationPlan {
    pub strategy: Strategy,
    pub config: StrategyConfig,
    pub actions: Vec<OptimizationAction>,
    pub summary: PlanSummary,
    pub preserved_sections: Vec<String>,
    pub warnings: Vec<String>,
    /// File name of the live document, recorded in archives
    pub source_file: String,
    /// Root that archive paths are relative to
    pub project_path: PathBuf,
    pub created_at: DateTime<Utc>,
}

impl OptimizationPlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
