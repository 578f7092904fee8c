//! Checkpoint command implementations.

use colored::Colorize;
use serde::Serialize;

use super::GlobalOptions;
use crate::cli::CheckpointCommands;
use crate::error::{Error, Result};
use crate::sync::{print_checkpoints, CheckpointRecord, CheckpointStore};

#[derive(Serialize)]
struct ListOutput<'a> {
    checkpoints: &'a [CheckpointRecord],
    count: usize,
}

#[derive(Serialize)]
struct ClearOutput {
    cleared: usize,
}

/// Execute checkpoint commands.
///
/// # Errors
///
/// Returns an error if the checkpoint document cannot be read or written.
pub fn execute(command: &CheckpointCommands, opts: GlobalOptions<'_>) -> Result<()> {
    let store = CheckpointStore::in_dir(&opts.state_dir()?);

    match command {
        CheckpointCommands::List => list(&store, opts),
        CheckpointCommands::Clear {
            kind,
            fingerprint,
            all,
        } => {
            let cleared = if *all {
                store.clear_all()?
            } else {
                let (Some(kind), Some(fingerprint)) = (kind, fingerprint) else {
                    return Err(Error::InvalidArgument(
                        "pass --kind and --fingerprint, or --all".into(),
                    ));
                };
                if !store.clear(*kind, fingerprint)? {
                    return Err(Error::InvalidArgument(format!(
                        "no {kind} checkpoint for fingerprint {fingerprint}"
                    )));
                }
                1
            };

            if opts.json {
                println!("{}", serde_json::to_string(&ClearOutput { cleared })?);
            } else if !opts.quiet {
                println!("{} Cleared {cleared} checkpoint(s)", "✓".green());
            }
            Ok(())
        }
    }
}

fn list(store: &CheckpointStore, opts: GlobalOptions<'_>) -> Result<()> {
    let checkpoints = store.list()?;

    if opts.json {
        let output = ListOutput {
            count: checkpoints.len(),
            checkpoints: &checkpoints,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if !opts.quiet {
        print_checkpoints(&checkpoints);
    }
    Ok(())
}
