//! Helpers shared across commands

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use ctxopt_core::analyzer::{AnalysisResult, Analyzer};
use ctxopt_core::classifier::{classify_sections, ClassifiedSection};
use ctxopt_core::config::OptimizerConfig;
use ctxopt_core::error::Result;
use ctxopt_core::issue::DetectedIssue;
use ctxopt_core::optimizer::{generate_plan, get_recommended_strategy, OptimizationPlan, Strategy};
use ctxopt_core::rules::{collect_issues, IssueSource};
use ctxopt_core::trace_time;

use crate::cli::Cli;

/// Directory a document's archives and config are relative to
pub fn project_root(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Load `--config`, or the project's config next to `file`
pub fn load_config(cli: &Cli, file: &Path) -> Result<OptimizerConfig> {
    match &cli.config {
        Some(path) => OptimizerConfig::load(path),
        None => OptimizerConfig::load_for_project(&project_root(file)),
    }
}

/// A document analyzed and classified under its project configuration
pub struct Document {
    pub config: OptimizerConfig,
    pub analysis: AnalysisResult,
    pub classified: Vec<ClassifiedSection>,
}

impl Document {
    pub fn load(cli: &Cli, file: &Path) -> Result<Self> {
        let start = Instant::now();
        let config = load_config(cli, file)?;
        let analysis = Analyzer::from_config(&config).analyze_file(file)?;
        let classified = classify_sections(&analysis.sections, &analysis.stale_dates);
        trace_time!(start, "load_document", sections = classified.len());
        Ok(Self {
            config,
            analysis,
            classified,
        })
    }

    /// Issues from `source`, or from the configured source
    pub fn issues(&self, source: Option<IssueSource>) -> Result<Vec<DetectedIssue>> {
        let rules = self.config.rule_set()?;
        let source = source.unwrap_or(self.config.issue_source);
        Ok(collect_issues(
            source,
            &self.analysis,
            &self.classified,
            &rules,
        ))
    }

    /// Requested strategy, else the configured default, else the recommended one
    pub fn strategy(&self, requested: Option<Strategy>, issues: &[DetectedIssue]) -> Strategy {
        requested
            .or(self.config.default_strategy)
            .unwrap_or_else(|| get_recommended_strategy(&self.analysis, issues))
    }

    /// Detect issues and build a plan under the resolved strategy
    pub fn plan(
        &self,
        strategy: Option<Strategy>,
        source: Option<IssueSource>,
    ) -> Result<OptimizationPlan> {
        let issues = self.issues(source)?;
        let strategy = self.strategy(strategy, &issues);
        generate_plan(
            &self.analysis,
            &self.classified,
            &issues,
            strategy,
            self.config.custom_strategy.as_ref(),
        )
    }
}

/// Print `value` as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
