//! Configuration management.
//!
//! redsync keeps everything under a single global directory:
//! - **Config**: `~/.redsync/config.json` with connection and tuning defaults
//! - **State**: `~/.redsync/state/` with the checkpoint document and stale lists
//!
//! Every setting resolves as CLI flag > environment variable > config file >
//! built-in default. Flags and environment variables are merged by clap
//! before they reach [`Settings::resolve`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::sync::{RetryPolicy, SyncContext, DEFAULT_BATCH_SIZE, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};

/// Default per-request timeout for the remote service.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Get the global redsync directory location (`~/.redsync/`).
#[must_use]
pub fn global_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".redsync"))
}

/// Resolve the state directory.
///
/// Priority:
/// 1. If `explicit` is provided, use it directly
/// 2. `REDSYNC_STATE_DIR` environment variable
/// 3. Global location: `~/.redsync/state`
#[must_use]
pub fn resolve_state_dir(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(dir) = std::env::var("REDSYNC_STATE_DIR") {
        if !dir.trim().is_empty() {
            return Some(PathBuf::from(dir));
        }
    }

    global_dir().map(|dir| dir.join("state"))
}

/// Resolve the config file path (`--config` / `REDSYNC_CONFIG`, else global).
#[must_use]
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| global_dir().map(|dir| dir.join("config.json")))
}

/// Contents of the config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Settings {
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub account: Option<String>,
    pub workspace: Option<String>,
    pub batch_size: Option<usize>,
    pub max_retries: Option<u32>,
    pub retry_delay_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}

/// Load settings from `path`.
///
/// A missing file yields empty settings unless `required` is set, which is
/// the case when the path was given explicitly.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file cannot be read or parsed.
pub fn load_settings(path: &Path, required: bool) -> Result<Settings> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound && !required => {
            debug!(path = %path.display(), "No config file");
            return Ok(Settings::default());
        }
        Err(e) => {
            return Err(Error::Config(format!("Cannot read {}: {e}", path.display())));
        }
    };

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {e}", path.display())))
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub account: Option<String>,
    pub workspace: Option<String>,
    pub batch_size: Option<usize>,
}

/// Fully resolved settings for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub context: SyncContext,
    pub retry: RetryPolicy,
    pub timeout: Duration,
}

impl RunSettings {
    /// The remote endpoint, required by any command that talks to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no endpoint is configured.
    pub fn endpoint(&self) -> Result<&str> {
        self.endpoint
            .as_deref()
            .ok_or_else(|| Error::Config("No endpoint configured".into()))
    }
}

impl Settings {
    /// Apply `overrides` on top of the file settings and fill defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if account or workspace is missing
    /// or the batch size is zero.
    pub fn resolve(self, overrides: Overrides) -> Result<RunSettings> {
        let account = non_empty(overrides.account.or(self.account))
            .ok_or_else(|| Error::InvalidArgument("--account is required".into()))?;
        let workspace = non_empty(overrides.workspace.or(self.workspace))
            .ok_or_else(|| Error::InvalidArgument("--workspace is required".into()))?;

        let max_batch_size = overrides
            .batch_size
            .or(self.batch_size)
            .unwrap_or(DEFAULT_BATCH_SIZE);
        if max_batch_size == 0 {
            return Err(Error::InvalidArgument("--batch-size must be at least 1".into()));
        }

        Ok(RunSettings {
            endpoint: non_empty(overrides.endpoint.or(self.endpoint)),
            token: non_empty(overrides.token.or(self.token)),
            context: SyncContext {
                account,
                workspace,
                max_batch_size,
            },
            retry: RetryPolicy {
                max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
                delay: self
                    .retry_delay_secs
                    .map_or(DEFAULT_RETRY_DELAY, Duration::from_secs),
            },
            timeout: self.timeout_secs.map_or(DEFAULT_TIMEOUT, Duration::from_secs),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
