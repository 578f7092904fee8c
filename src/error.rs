//! Error types for the redsync CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=checkpoint, 3=read, 4=validation, etc.)
//! - Retryability used by the retry orchestrator
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

use crate::validate::ValidationIssue;

/// Result type alias for redsync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Exit code used when a run stops on an external interrupt.
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Checkpoint state (exit 2)
    CheckpointError,

    // Read (exit 3)
    ReadError,

    // Validation (exit 4)
    ValidationError,
    InvalidArgument,

    // Remote rejection (exit 5)
    RemoteRejection,

    // Remote transient (exit 6)
    RemoteTransient,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::CheckpointError => "CHECKPOINT_ERROR",
            Self::ReadError => "READ_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::RemoteRejection => "REMOTE_REJECTION",
            Self::RemoteTransient => "REMOTE_TRANSIENT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::CheckpointError => 2,
            Self::ReadError => 3,
            Self::ValidationError | Self::InvalidArgument => 4,
            Self::RemoteRejection => 5,
            Self::RemoteTransient => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether the retry orchestrator may re-enter the run.
    ///
    /// Only infrastructure failures qualify. A rejected payload would be
    /// rejected again, and local read/validation/state errors do not heal.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteTransient)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in redsync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Validation failed: {} invalid field(s), first: {}", issues.len(), first_issue(issues))]
    Validation { issues: Vec<ValidationIssue> },

    #[error("Remote unavailable: {0}")]
    RemoteTransient(String),

    #[error("Remote rejected batch (HTTP {status}): {message}")]
    RemoteRejection { status: u16, message: String },

    #[error(
        "Checkpoint for {kind} {fingerprint} records {committed} committed batches but the plan has only {planned}"
    )]
    CheckpointMismatch {
        kind: String,
        fingerprint: String,
        committed: usize,
        planned: usize,
    },

    #[error("Checkpoint store {} is unreadable: {message}", path.display())]
    CheckpointCorrupt { path: PathBuf, message: String },

    #[error("Cleanup of stale redirects failed: {source}")]
    Cleanup {
        stale_list: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

fn first_issue(issues: &[ValidationIssue]) -> String {
    issues
        .first()
        .map_or_else(|| "none".to_string(), ToString::to_string)
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::ReadError,
            Self::Parse { .. } | Self::Validation { .. } => ErrorCode::ValidationError,
            Self::RemoteTransient(_) => ErrorCode::RemoteTransient,
            Self::RemoteRejection { .. } => ErrorCode::RemoteRejection,
            Self::CheckpointMismatch { .. } | Self::CheckpointCorrupt { .. } => {
                ErrorCode::CheckpointError
            }
            Self::Cleanup { source, .. } => source.error_code(),
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Whether the failed run may be re-entered automatically.
    ///
    /// `Cleanup` is never retried here: the deletion run has already been
    /// through its own retry loop.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Cleanup { .. }) && self.error_code().is_retryable()
    }

    /// Context-aware recovery hint for operators.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Read { path, .. } => Some(format!(
                "Check that {} exists and is readable.",
                path.display()
            )),

            Self::Validation { issues } => {
                let mut hint = String::from("Fix these records and re-run:\n");
                for issue in issues.iter().take(10) {
                    hint.push_str(&format!("    {issue}\n"));
                }
                if issues.len() > 10 {
                    hint.push_str(&format!("    ... and {} more\n", issues.len() - 10));
                }
                hint.push_str("  Nothing was submitted.");
                Some(hint)
            }

            Self::RemoteTransient(_) => Some(
                "Progress was checkpointed. Re-run the same command to resume \
                 from the last committed batch."
                    .to_string(),
            ),

            Self::RemoteRejection { .. } => Some(
                "The remote refused this payload; retrying would be refused again. \
                 Fix the offending records and re-run. An edited file starts a new run."
                    .to_string(),
            ),

            Self::CheckpointMismatch { kind, fingerprint, .. } => Some(format!(
                "The batch size probably changed since the checkpoint was written.\n  \
                 Reset it: redsync checkpoint clear --kind {kind} --fingerprint {fingerprint}"
            )),

            Self::CheckpointCorrupt { path, .. } => Some(format!(
                "Inspect or remove {} (removing it forgets all resume progress).",
                path.display()
            )),

            Self::Cleanup { stale_list, .. } if !stale_list.exists() => Some(format!(
                "The import completed, but the stale list could not be written to {}.\n  \
                 Fix the cause and re-run the import with --prune.",
                stale_list.display()
            )),

            Self::Cleanup { stale_list, .. } => Some(format!(
                "The import completed. Stale redirects are listed in {}.\n  \
                 Resume deletion: redsync delete {}\n  \
                 Re-running the import with --prune instead leaves this delete checkpoint behind.\n  \
                 Find it with `redsync checkpoint list` and remove it with \
                 `redsync checkpoint clear --kind delete --fingerprint <FP>`.",
                stale_list.display(),
                stale_list.display()
            )),

            Self::Config(_) => {
                Some("Check ~/.redsync/config.json or the REDSYNC_* environment variables.".to_string())
            }

            Self::Parse { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": self.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        if let Self::Cleanup { stale_list, .. } = self {
            obj["error"]["stale_list"] = serde_json::Value::String(stale_list.display().to_string());
        }

        obj
    }
}
