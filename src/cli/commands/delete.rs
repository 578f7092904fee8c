//! Delete command implementation.

use std::path::Path;
use std::process::ExitCode;

use super::{print_json, report_outcome, runtime, GlobalOptions};
use crate::cli::progress::TerminalProgress;
use crate::cli::ConnectionArgs;
use crate::error::{Result, INTERRUPTED_EXIT_CODE};
use crate::model::OperationKind;
use crate::remote::HttpClient;
use crate::sync::{load_input, EngineConfig, NoProgress, ProgressSink, SignalSource, SyncEngine};

/// Execute the delete command.
///
/// Runs a Delete-kind sync over the keys in `file`. Also the way to finish
/// a prune whose cleanup pass failed: pass the reported stale list.
///
/// # Errors
///
/// Returns an error if the input is invalid or the remote run fails.
pub fn execute(file: &Path, connection: &ConnectionArgs, opts: GlobalOptions<'_>) -> Result<ExitCode> {
    let settings = opts.settings(connection.into())?;
    let input = load_input(OperationKind::Delete, file)?;
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

    let outcome = runtime()?.block_on(engine.run(OperationKind::Delete, &input))?;

    if opts.json {
        print_json("delete", &outcome)?;
        return Ok(if outcome.is_interrupted() {
            ExitCode::from(INTERRUPTED_EXIT_CODE)
        } else {
            ExitCode::SUCCESS
        });
    }

    Ok(report_outcome(OperationKind::Delete, &outcome, "Deleted", opts.quiet))
}
