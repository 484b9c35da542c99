//! CLI argument parsing for ctxopt
//!
//! Global flags: --format, --quiet, --verbose, --log-level, --log-json, --config

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use ctxopt_core::format::OutputFormat;
use ctxopt_core::optimizer::Strategy;
use ctxopt_core::rules::IssueSource;

/// ctxopt - analyze and shrink CLAUDE.md context documents
#[derive(Parser, Debug)]
#[command(name = "ctxopt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (human or json)
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level or filter directive (e.g. debug, ctxopt_core=trace)
    #[arg(long, global = true, env = "CTXOPT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file (default: <project>/.claude/optimizer.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show sections with their type, actionability and staleness
    Analyze {
        /// Context document to analyze
        file: PathBuf,
    },

    /// List token-wasting issues, most severe first
    Issues {
        /// Context document to inspect
        file: PathBuf,

        /// Issue generator: detector, rules or both (default from config)
        #[arg(long)]
        source: Option<IssueSource>,
    },

    /// Show the optimization plan without changing anything
    Plan {
        /// Context document to plan for
        file: PathBuf,

        /// conservative, moderate, aggressive or custom (default: recommended)
        #[arg(long, short)]
        strategy: Option<Strategy>,

        /// Issue generator: detector, rules or both (default from config)
        #[arg(long)]
        source: Option<IssueSource>,
    },

    /// Apply the optimization plan, writing archives and the new document
    Apply {
        /// Context document to optimize
        file: PathBuf,

        /// conservative, moderate, aggressive or custom (default: recommended)
        #[arg(long, short)]
        strategy: Option<Strategy>,

        /// Issue generator: detector, rules or both (default from config)
        #[arg(long)]
        source: Option<IssueSource>,

        /// Show the changes without writing any file
        #[arg(long)]
        dry_run: bool,
    },

    /// List archive references in a document
    Archives {
        /// Context document to scan
        file: PathBuf,
    },
}
