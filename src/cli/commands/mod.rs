//! Command implementations.

pub mod checkpoint;
pub mod completions;
pub mod delete;
pub mod import;
pub mod status;
pub mod version;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use colored::Colorize;
use serde::Serialize;

use crate::config::{load_settings, resolve_config_path, resolve_state_dir, Overrides, RunSettings};
use crate::error::{Error, Result, INTERRUPTED_EXIT_CODE};
use crate::model::OperationKind;
use crate::sync::{short, RunOutcome};

/// Options shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct GlobalOptions<'a> {
    pub state_dir: Option<&'a Path>,
    pub config: Option<&'a Path>,
    pub json: bool,
    pub quiet: bool,
}

impl GlobalOptions<'_> {
    /// Resolve the state directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no home directory can be found.
    pub fn state_dir(&self) -> Result<PathBuf> {
        resolve_state_dir(self.state_dir)
            .ok_or_else(|| Error::Config("Cannot determine state directory; pass --state-dir".into()))
    }

    /// Load the config file and apply command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is invalid or a required value is missing.
    pub fn settings(&self, overrides: Overrides) -> Result<RunSettings> {
        let settings = match resolve_config_path(self.config) {
            Some(path) => load_settings(&path, self.config.is_some())?,
            None => crate::config::Settings::default(),
        };
        settings.resolve(overrides)
    }
}

/// Build the runtime for engine commands.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))
}

#[derive(Serialize)]
struct RunOutput<'a, T: Serialize> {
    command: &'a str,
    #[serde(flatten)]
    result: &'a T,
}

fn print_json<T: Serialize>(command: &str, result: &T) -> Result<()> {
    let output = RunOutput { command, result };
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

/// Print one run outcome in human form. Returns the process exit code.
fn report_outcome(kind: OperationKind, outcome: &RunOutcome, verb: &str, quiet: bool) -> ExitCode {
    match outcome {
        RunOutcome::Applied {
            keys,
            total_batches,
            submitted_batches,
            ..
        } => {
            if !quiet {
                let resumed = total_batches - submitted_batches;
                let suffix = if resumed > 0 {
                    format!(" ({resumed} batches resumed past)")
                } else {
                    String::new()
                };
                println!(
                    "{} {verb} {} redirects in {total_batches} batches{suffix}",
                    "✓".green(),
                    keys.len()
                );
            }
            ExitCode::SUCCESS
        }
        RunOutcome::Interrupted {
            fingerprint,
            committed,
            total_batches,
        } => {
            eprintln!(
                "{} {kind} interrupted: {committed} of {total_batches} batches committed (checkpoint {}).",
                "⏸".yellow(),
                short(fingerprint)
            );
            eprintln!("  Re-run the same command to resume.");
            ExitCode::from(INTERRUPTED_EXIT_CODE)
        }
    }
}
