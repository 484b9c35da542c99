//! Error types and exit codes for ctxopt
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure
//! - 2: Usage error (bad flags/args, invalid values)
//! - 3: Data error (missing document, invalid rule)
//!
//! Analysis, classification and issue detection never return errors; a
//! heuristic miss degrades to an `unknown` section or no issue at all.

mod macros;

use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data error - missing document, invalid rule (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur during ctxopt operations
#[derive(Error, Debug)]
pub enum OptimizerError {
    // Usage errors (exit code 2)
    #[error("unknown format: {0} (expected: human or json)")]
    UnknownFormat(String),

    #[error("{0}")]
    UsageError(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    #[error("unsupported {context}: {value} (supported: {supported})")]
    Unsupported {
        context: String,
        value: String,
        supported: String,
    },

    // Data errors (exit code 3)
    #[error("document not found: {path:?}")]
    DocumentNotFound { path: PathBuf },

    #[error("invalid rule {rule}: {reason}")]
    InvalidRule { rule: String, reason: String },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to {operation}: {reason}")]
    FailedOperation { operation: String, reason: String },

    #[error("{0}")]
    Other(String),
}

impl OptimizerError {
    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        OptimizerError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an unsupported value
    pub fn unsupported(
        context: &str,
        value: impl std::fmt::Display,
        supported: impl std::fmt::Display,
    ) -> Self {
        OptimizerError::Unsupported {
            context: context.to_string(),
            value: value.to_string(),
            supported: supported.to_string(),
        }
    }

    /// Create an error for a rule whose matcher cannot be compiled
    pub fn invalid_rule(rule: &str, reason: impl std::fmt::Display) -> Self {
        OptimizerError::InvalidRule {
            rule: rule.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an error for a failed operation
    pub fn failed(operation: &str, reason: impl std::fmt::Display) -> Self {
        OptimizerError::FailedOperation {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            OptimizerError::UnknownFormat(_)
            | OptimizerError::UsageError(_)
            | OptimizerError::InvalidValue { .. }
            | OptimizerError::Unsupported { .. } => ExitCode::Usage,

            OptimizerError::DocumentNotFound { .. } | OptimizerError::InvalidRule { .. } => {
                ExitCode::Data
            }

            OptimizerError::Io(_)
            | OptimizerError::Json(_)
            | OptimizerError::Toml(_)
            | OptimizerError::FailedOperation { .. }
            | OptimizerError::Other(_) => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            OptimizerError::UnknownFormat(_) => "unknown_format",
            OptimizerError::UsageError(_) => "usage_error",
            OptimizerError::InvalidValue { .. } => "invalid_value",
            OptimizerError::Unsupported { .. } => "unsupported",
            OptimizerError::DocumentNotFound { .. } => "document_not_found",
            OptimizerError::InvalidRule { .. } => "invalid_rule",
            OptimizerError::Io(_) => "io_error",
            OptimizerError::Json(_) => "json_error",
            OptimizerError::Toml(_) => "toml_error",
            OptimizerError::FailedOperation { .. } => "failed_operation",
            OptimizerError::Other(_) => "other",
        }
    }

    /// Convert error to JSON representation for structured error output
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for ctxopt operations
pub type Result<T> = std::result::Result<T, OptimizerError>;
