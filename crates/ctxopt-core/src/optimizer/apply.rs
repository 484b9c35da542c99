//! Plan application
//!
//! Actions are applied bottom-up: sorted by descending start line, each
//! splice produces a new line vector, so ranges above it stay valid.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analyzer::{count_tokens, parse_header, split_lines, ParsedSection};
use crate::archive::{ArchiveContent, Archiver, SummaryOptions};
use crate::issue::LineRange;

use super::replace::render_replacement;
use super::{ActionType, OptimizationAction, OptimizationPlan};

/// An action that could not be applied, with the reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedAction {
    pub action: OptimizationAction,
    pub error: String,
}

/// Outcome of applying a plan
///
/// Applied actions are reflected in `new_content` even when others failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub success: bool,
    pub applied_actions: Vec<OptimizationAction>,
    pub failed_actions: Vec<FailedAction>,
    pub original_lines: usize,
    pub original_tokens: usize,
    pub new_lines: usize,
    pub new_tokens: usize,
    pub new_content: String,
    /// Archive files to write for applied archive actions
    pub archives: Vec<ArchiveContent>,
}

/// Before/after text of one action against the live document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPreview {
    pub section_name: String,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub line_range: LineRange,
    pub before: String,
    pub after: String,
    pub lines_saved: usize,
    pub tokens_saved: usize,
}

/// What [`apply_plan`] would do, without committing anything
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPreview {
    pub actions: Vec<ActionPreview>,
    pub result: OptimizationResult,
}

/// Section body rebuilt from the live lines, for archiving
fn live_section(action: &OptimizationAction, slice: &[String]) -> ParsedSection {
    let level = slice
        .first()
        .and_then(|h| parse_header(h))
        .map_or(2, |(level, _)| level);
    let content = slice[1..].join("\n");
    ParsedSection {
        name: action.section_name.clone(),
        level,
        start_line: action.line_range.start,
        end_line: action.line_range.end,
        line_count: slice.len(),
        estimated_tokens: count_tokens(content.trim()),
        content,
    }
}

/// Check `range` against a document of `len` lines and the ranges already
/// spliced
fn validate_range(range: LineRange, len: usize, applied: &[LineRange]) -> Result<(), String> {
    if range.start == 0 || range.start > range.end {
        return Err(format!("invalid line range {}", range));
    }
    if range.end > len {
        return Err(format!(
            "line range {} is outside the document ({} lines)",
            range, len
        ));
    }
    if let Some(other) = applied.iter().find(|r| r.overlaps(&range)) {
        return Err(format!("line range {} overlaps applied range {}", range, other));
    }
    Ok(())
}

/// Splice one action into `lines`, returning the new lines
///
/// Pure over its inputs; the caller folds it over actions in descending
/// start order.
pub(crate) fn apply_action(
    lines: &[String],
    action: &OptimizationAction,
    applied: &[LineRange],
) -> Result<Vec<String>, String> {
    if action.action_type == ActionType::Move {
        return Err("move actions require manual intervention".to_string());
    }
    let range = action.line_range;
    validate_range(range, lines.len(), applied)?;

    let slice: Vec<&str> = lines[range.start - 1..range.end]
        .iter()
        .map(String::as_str)
        .collect();
    let replacement = render_replacement(action, &slice)?;

    let mut next = Vec::with_capacity(lines.len() - slice.len() + replacement.len());
    next.extend_from_slice(&lines[..range.start - 1]);
    next.extend(replacement);
    next.extend_from_slice(&lines[range.end..]);
    Ok(next)
}

/// Apply `plan` to `content`
///
/// Per-action failures (bad or overlapping ranges, `move` actions) are
/// recorded in `failed_actions`; the remaining actions still apply.
pub fn apply_plan(plan: &OptimizationPlan, content: &str) -> OptimizationResult {
    apply_plan_with(plan, content, &SummaryOptions::default())
}

/// [`apply_plan`] with explicit archive summary limits
pub fn apply_plan_with(
    plan: &OptimizationPlan,
    content: &str,
    summary: &SummaryOptions,
) -> OptimizationResult {
    let start = Instant::now();
    let archiver = Archiver::new(&plan.project_path)
        .with_source_file(plan.source_file.as_str())
        .with_summary_options(*summary);

    let mut ordered: Vec<&OptimizationAction> = plan.actions.iter().collect();
    ordered.sort_by(|a, b| b.line_range.start.cmp(&a.line_range.start));

    let mut lines: Vec<String> = split_lines(content).into_iter().map(String::from).collect();
    let mut applied_ranges: Vec<LineRange> = Vec::new();
    let mut applied = Vec::new();
    let mut failed = Vec::new();
    let mut archives = Vec::new();

    for action in ordered {
        match apply_action(&lines, action, &applied_ranges) {
            Ok(next) => {
                if action.action_type == ActionType::Archive {
                    let r = action.line_range;
                    let section = live_section(action, &lines[r.start - 1..r.end]);
                    let reason = action.reason.as_deref().unwrap_or(&action.description);
                    archives.push(archiver.create_archive_at(
                        &section,
                        action.section_type,
                        reason,
                        plan.created_at,
                    ));
                }
                lines = next;
                applied_ranges.push(action.line_range);
                applied.push(action.clone());
            }
            Err(error) => {
                warn!(section = %action.section_name, range = %action.line_range, %error, "action failed");
                failed.push(FailedAction {
                    action: action.clone(),
                    error,
                });
            }
        }
    }

    // report top-down
    archives.reverse();
    applied.reverse();
    failed.reverse();

    let new_content = lines.join("\n");
    let result = OptimizationResult {
        success: failed.is_empty(),
        applied_actions: applied,
        failed_actions: failed,
        original_lines: split_lines(content).len(),
        original_tokens: count_tokens(content),
        new_lines: lines.len(),
        new_tokens: count_tokens(&new_content),
        new_content,
        archives,
    };

    debug!(
        applied = result.applied_actions.len(),
        failed = result.failed_actions.len(),
        original_lines = result.original_lines,
        new_lines = result.new_lines,
        elapsed = ?start.elapsed(),
        "apply_plan"
    );

    result
}

/// Show each action's effect and the projected result without writing
pub fn preview_plan(plan: &OptimizationPlan, content: &str) -> PlanPreview {
    preview_plan_with(plan, content, &SummaryOptions::default())
}

/// [`preview_plan`] with explicit archive summary limits
pub fn preview_plan_with(
    plan: &OptimizationPlan,
    content: &str,
    summary: &SummaryOptions,
) -> PlanPreview {
    let lines = split_lines(content);
    let actions = plan
        .actions
        .iter()
        .map(|action| {
            let r = action.line_range;
            let before = if r.start >= 1 && r.start <= r.end && r.end <= lines.len() {
                lines[r.start - 1..r.end].join("\n")
            } else {
                action.before.clone()
            };
            ActionPreview {
                section_name: action.section_name.clone(),
                action_type: action.action_type,
                line_range: r,
                before,
                after: action.after.clone(),
                lines_saved: action.lines_saved,
                tokens_saved: action.tokens_saved,
            }
        })
        .collect();

    PlanPreview {
        actions,
        result: apply_plan_with(plan, content, summary),
    }
}
