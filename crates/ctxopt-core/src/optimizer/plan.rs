//! Plan generation

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::analyzer::{count_tokens, split_lines, AnalysisResult};
use crate::archive::{archive_relative_path, DEFAULT_SOURCE_FILE};
use crate::classifier::{Actionability, ClassifiedSection};
use crate::detector::KEPT_EXAMPLES;
use crate::error::Result;
use crate::issue::{compare_issues, DetectedIssue, IssueType, LineRange};
use crate::text::truncate_chars;

use super::replace::{render_replacement, DEFAULT_REFERENCE};
use super::{ActionType, OptimizationAction, OptimizationPlan, PlanSummary, Strategy, StrategyConfig};

/// Characters of original text kept in an action's `before`
pub const PREVIEW_CHARS: usize = 500;

/// Priority of actions synthesized from section size alone
const SIZE_ACTION_PRIORITY: u8 = 3;

/// What an action will do, before it is measured against the text
struct Draft {
    action_type: ActionType,
    priority: u8,
    description: String,
    keep_lines: Option<usize>,
    keep_examples: Option<usize>,
    reference: Option<String>,
    reason: Option<String>,
    source_issue: Option<IssueType>,
}

impl Draft {
    /// Action for an issue, or `None` if the issue only warrants a warning
    fn from_issue(issue: &DetectedIssue, config: &StrategyConfig) -> Option<Self> {
        let action_type = match issue.detail_str("action") {
            Some("archive") => ActionType::Archive,
            Some("condense") => ActionType::Condense,
            Some("dedupe") => ActionType::Dedupe,
            Some("remove") => ActionType::Remove,
            Some(_) => return None,
            None => match issue.issue_type {
                IssueType::OversizedSection
                | IssueType::VerboseCompletedWork
                | IssueType::LowActionability => ActionType::Archive,
                IssueType::DuplicateContent => ActionType::Dedupe,
                IssueType::ExcessiveExamples => ActionType::Condense,
                IssueType::StaleDates | IssueType::OutdatedReference => return None,
            },
        };

        let keep_lines = (action_type == ActionType::Condense).then(|| {
            issue
                .detail_usize("keep_lines")
                .unwrap_or(config.condense_keep_lines)
        });
        let keep_examples = (action_type == ActionType::Condense
            && issue.issue_type == IssueType::ExcessiveExamples)
            .then(|| issue.detail_usize("keep_examples").unwrap_or(KEPT_EXAMPLES));
        let reference = (action_type == ActionType::Dedupe).then(|| {
            issue
                .detail_str("reference")
                .unwrap_or(DEFAULT_REFERENCE)
                .to_string()
        });
        let reason = issue
            .detail_str("reason")
            .map(str::to_string)
            .or_else(|| Some(issue.description.clone()));

        Some(Self {
            action_type,
            priority: issue.severity.rank() + 1,
            description: issue.description.clone(),
            keep_lines,
            keep_examples,
            reference,
            reason,
            source_issue: Some(issue.issue_type),
        })
    }

    /// Action justified by size and actionability alone
    fn from_size(section: &ClassifiedSection, config: &StrategyConfig) -> Option<Self> {
        let lines = section.section.line_count;
        if lines > config.archive_threshold && section.actionability == Actionability::Low {
            return Some(Self {
                action_type: ActionType::Archive,
                priority: SIZE_ACTION_PRIORITY,
                description: format!(
                    "{} lines of low-actionability content (limit {})",
                    lines, config.archive_threshold
                ),
                keep_lines: None,
                keep_examples: None,
                reference: None,
                reason: Some("Large low-actionability section".to_string()),
                source_issue: None,
            });
        }
        if lines > config.condense_threshold && section.actionability != Actionability::High {
            return Some(Self {
                action_type: ActionType::Condense,
                priority: SIZE_ACTION_PRIORITY,
                description: format!(
                    "{} lines exceeds the condense limit of {}",
                    lines, config.condense_threshold
                ),
                keep_lines: Some(config.condense_keep_lines),
                keep_examples: None,
                reference: None,
                reason: None,
                source_issue: None,
            });
        }
        None
    }

    /// Measure the draft against the document; `None` if it saves nothing
    fn into_action(
        self,
        section: &ClassifiedSection,
        lines: &[&str],
        created_at: DateTime<Utc>,
    ) -> Option<OptimizationAction> {
        let s = &section.section;
        if s.start_line == 0 || s.end_line > lines.len() || s.start_line > s.end_line {
            return None;
        }
        let slice = &lines[s.start_line - 1..s.end_line];

        let mut action = OptimizationAction {
            action_type: self.action_type,
            section_name: s.name.clone(),
            section_type: section.section_type,
            description: self.description,
            before: String::new(),
            after: String::new(),
            lines_saved: 0,
            tokens_saved: 0,
            line_range: LineRange::new(s.start_line, s.end_line),
            priority: self.priority,
            archive_path: (self.action_type == ActionType::Archive)
                .then(|| archive_relative_path(&s.name, created_at.date_naive())),
            keep_lines: self.keep_lines,
            keep_examples: self.keep_examples,
            reference: self.reference,
            reason: self.reason,
            source_issue: self.source_issue,
        };

        let replacement = render_replacement(&action, slice).ok()?;
        if action.action_type != ActionType::Remove && replacement.len() >= slice.len() {
            return None;
        }

        let before = slice.join("\n");
        let after = replacement.join("\n");
        action.lines_saved = slice.len() - replacement.len();
        action.tokens_saved = count_tokens(&before).saturating_sub(count_tokens(&after));
        action.before = truncate_chars(&before, PREVIEW_CHARS);
        action.after = replacement
            .iter()
            .skip(1)
            .skip_while(|l| l.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");
        Some(action)
    }
}

fn source_and_project(file_path: &str) -> (String, PathBuf) {
    let path = Path::new(file_path);
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_SOURCE_FILE.to_string());
    let project = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    (source, project)
}

/// Build a plan timestamped now
pub fn generate_plan(
    analysis: &AnalysisResult,
    classified: &[ClassifiedSection],
    issues: &[DetectedIssue],
    strategy: Strategy,
    custom: Option<&StrategyConfig>,
) -> Result<OptimizationPlan> {
    generate_plan_at(analysis, classified, issues, strategy, custom, Utc::now())
}

/// Build a plan with an explicit creation time
///
/// Archive paths are dated from `created_at`. Fails only when `strategy` is
/// [`Strategy::Custom`] and no custom config is supplied.
pub fn generate_plan_at(
    analysis: &AnalysisResult,
    classified: &[ClassifiedSection],
    issues: &[DetectedIssue],
    strategy: Strategy,
    custom: Option<&StrategyConfig>,
    created_at: DateTime<Utc>,
) -> Result<OptimizationPlan> {
    let start = Instant::now();
    let config = StrategyConfig::resolve(strategy, custom)?;
    let lines = split_lines(&analysis.raw_content);

    let mut actions: Vec<OptimizationAction> = Vec::new();
    let mut preserved = Vec::new();
    let mut warnings = Vec::new();

    for section in classified {
        let s = &section.section;
        if config.preserves(section.section_type) {
            preserved.push(s.name.clone());
            continue;
        }

        let mut section_issues: Vec<&DetectedIssue> = issues
            .iter()
            .filter(|i| {
                i.section_name == s.name
                    && i.line_range.start == s.start_line
                    && config.includes(i.issue_type)
            })
            .collect();
        section_issues.sort_by(|a, b| compare_issues(a, b));

        let mut draft = None;
        for issue in &section_issues {
            match Draft::from_issue(issue, &config) {
                Some(d) => {
                    if draft.is_none() {
                        draft = Some(d);
                    }
                }
                None => warnings.push(format!(
                    "{} (lines {}): {}",
                    s.name, issue.line_range, issue.description
                )),
            }
        }

        let from_issue = draft.and_then(|d| d.into_action(section, &lines, created_at));
        let action = from_issue.or_else(|| {
            Draft::from_size(section, &config)
                .and_then(|d| d.into_action(section, &lines, created_at))
        });
        match action {
            Some(action) => actions.push(action),
            None => debug!(section = %s.name, "no action with savings"),
        }
    }

    actions.sort_by_key(|a| a.priority);
    if actions.len() > config.max_actions {
        let dropped = actions.len() - config.max_actions;
        warn!(dropped, max_actions = config.max_actions, %strategy, "plan truncated");
        warnings.push(format!(
            "{} more actions were dropped by the {} strategy limit of {}",
            dropped, strategy, config.max_actions
        ));
        actions.truncate(config.max_actions);
    }

    let summary = PlanSummary::from_actions(analysis.total_lines, analysis.total_tokens, &actions);
    let (source_file, project_path) = source_and_project(&analysis.file_path);

    debug!(
        %strategy,
        actions = actions.len(),
        preserved = preserved.len(),
        warnings = warnings.len(),
        tokens_saved = summary.tokens_saved,
        elapsed = ?start.elapsed(),
        "generate_plan"
    );

    Ok(OptimizationPlan {
        strategy,
        config,
        actions,
        summary,
        preserved_sections: preserved,
        warnings,
        source_file,
        project_path,
        created_at,
    })
}
