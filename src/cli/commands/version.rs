//! Version command implementation.

use std::path::PathBuf;

use serde::Serialize;

use super::GlobalOptions;
use crate::error::Result;
use crate::sync::CHECKPOINT_FILE;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
    checkpoints: Option<PathBuf>,
}

/// Execute the version command.
///
/// Also reports where checkpoints are kept, which is the first thing to
/// check when a run does not resume.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(opts: GlobalOptions<'_>) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };
    let checkpoints = opts.state_dir().ok().map(|dir| dir.join(CHECKPOINT_FILE));

    if opts.json {
        let output = VersionOutput {
            version,
            build,
            checkpoints,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("redsync version {version} ({build})");
    if let Some(path) = checkpoints {
        println!("  checkpoints: {}", path.display());
    }
    Ok(())
}
