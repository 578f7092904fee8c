//! Import command implementation.

use std::path::Path;
use std::process::ExitCode;

use colored::Colorize;

use super::{print_json, report_outcome, runtime, GlobalOptions};
use crate::cli::progress::TerminalProgress;
use crate::cli::ConnectionArgs;
use crate::error::{Result, INTERRUPTED_EXIT_CODE};
use crate::model::OperationKind;
use crate::remote::HttpClient;
use crate::sync::{load_input, EngineConfig, NoProgress, ProgressSink, SignalSource, SyncEngine, SyncReport};

/// Execute the import command, with optional stale-record cleanup.
///
/// # Errors
///
/// Returns an error if the input is invalid, the remote refuses a batch, or
/// the retry budget runs out. Progress up to the failure is checkpointed.
pub fn execute(file: &Path, connection: &ConnectionArgs, prune: bool, opts: GlobalOptions<'_>) -> Result<ExitCode> {
    let settings = opts.settings(connection.into())?;
    let input = load_input(OperationKind::Import, file)?;
    let client = HttpClient::new(
        settings.endpoint()?,
        settings.token.clone(),
        &settings.context.account,
        &settings.context.workspace,
        settings.timeout,
    )?;

    let progress: &dyn ProgressSink = if opts.json || opts.quiet {
        &NoProgress
    } else {
        &TerminalProgress
    };
    let config = EngineConfig {
        context: settings.context,
        retry: settings.retry,
        signals: SignalSource::CtrlC,
        state_dir: opts.state_dir()?,
    };
    let engine = SyncEngine::new(&client, config, progress)?;

    let report = runtime()?.block_on(engine.sync(&input, prune))?;

    if opts.json {
        print_json("import", &report)?;
        return Ok(exit_code(&report));
    }

    let code = report_outcome(OperationKind::Import, &report.import, "Imported", opts.quiet);
    match &report.cleanup {
        Some(cleanup) => {
            let cleanup_code = report_outcome(OperationKind::Delete, &cleanup.outcome, "Deleted stale", opts.quiet);
            if cleanup.outcome.is_interrupted() {
                eprintln!(
                    "  Stale list kept at {}; 'redsync delete {}' also resumes it.",
                    cleanup.stale_list.display(),
                    cleanup.stale_list.display()
                );
            }
            Ok(if report.is_interrupted() { cleanup_code } else { code })
        }
        None => {
            if prune && !report.is_interrupted() && !opts.quiet {
                println!("{}", "No stale redirects to delete.".dimmed());
            }
            Ok(code)
        }
    }
}

fn exit_code(report: &SyncReport) -> ExitCode {
    if report.is_interrupted() {
        ExitCode::from(INTERRUPTED_EXIT_CODE)
    } else {
        ExitCode::SUCCESS
    }
}
