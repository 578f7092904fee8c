//! Status command implementation.

use std::path::Path;

use serde::Serialize;

use super::GlobalOptions;
use crate::cli::TargetArgs;
use crate::error::Result;
use crate::sync::{input_status, print_status, CheckpointStore, FingerprintStatus, RecordInput};

#[derive(Serialize)]
struct StatusOutput<'a> {
    file: &'a Path,
    records: usize,
    kinds: &'a [FingerprintStatus],
}

/// Execute the status command.
///
/// Reads and plans `file` locally. Records are parsed but not validated, so
/// status works for delete lists and partially broken inputs alike.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the checkpoint document is corrupt.
pub fn execute(file: &Path, target: &TargetArgs, opts: GlobalOptions<'_>) -> Result<()> {
    let settings = opts.settings(target.into())?;
    let input = RecordInput::load(file)?;
    let store = CheckpointStore::in_dir(&opts.state_dir()?);

    let statuses = input_status(&store, &settings.context, &input)?;

    if opts.json {
        let output = StatusOutput {
            file,
            records: input.records.len(),
            kinds: &statuses,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if !opts.quiet {
        print_status(&input, &statuses);
    }
    Ok(())
}
