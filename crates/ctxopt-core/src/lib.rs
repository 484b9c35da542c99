//! ctxopt Core Library
//!
//! Analysis and optimization of project context documents (`CLAUDE.md`).
//! The pipeline runs in order: [`analyzer`] splits a document into sections,
//! [`classifier`] scores them, [`detector`] and [`rules`] raise issues,
//! [`optimizer`] plans and applies edits, and [`archive`] builds the files
//! that hold archived sections. Only config I/O and
//! `Analyzer::analyze_file` touch the filesystem.

pub mod analyzer;
pub mod archive;
pub mod classifier;
pub mod config;
pub mod detector;
pub mod error;
pub mod format;
pub mod issue;
pub mod logging;
pub mod optimizer;
pub mod rules;
pub mod text;
