//! Resume status display.
//!
//! Human-readable rendering of where a file stands against the checkpoint
//! store, and of the store's full contents.

use colored::Colorize;

use crate::model::OperationKind;
use crate::sync::checkpoint::CheckpointRecord;
use crate::sync::file::RecordInput;
use crate::sync::fingerprint::short;
use crate::sync::types::FingerprintStatus;

/// Print the resume state of one input for every operation kind.
pub fn print_status(input: &RecordInput, statuses: &[FingerprintStatus]) {
    println!("{}", "Resume Status".bold().underline());
    println!();

    println!(
        "  {} ({}, {} records)",
        input.path.display(),
        format_size(input.raw.len() as u64),
        input.records.len()
    );
    if let Some(first) = statuses.first() {
        println!("  Fingerprint: {}", short(&first.fingerprint).dimmed());
        println!("  Batches:     {}", first.total_batches);
    }
    println!();

    for status in statuses {
        let label = format!("{}:", capitalize(status.kind)).blue().bold();
        match status.committed {
            Some(committed) => {
                println!(
                    "{label} {} of {} batches committed",
                    committed, status.total_batches
                );
                println!(
                    "  {}",
                    format!("Run 'redsync {}' with the same file to resume.", status.kind).dimmed()
                );
            }
            None => println!("{label} {}", "nothing in progress".green()),
        }
    }
}

/// Print every stored checkpoint.
pub fn print_checkpoints(records: &[CheckpointRecord]) {
    if records.is_empty() {
        println!("{}", "No checkpoints in progress.".dimmed());
        return;
    }

    println!("{}", "Checkpoints".bold().underline());
    println!();

    for kind in OperationKind::ALL {
        let entries: Vec<_> = records.iter().filter(|r| r.kind == kind).collect();
        if entries.is_empty() {
            continue;
        }
        println!("{}", format!("{}:", capitalize(kind)).blue().bold());
        for record in entries {
            println!(
                "  {}  {} batches committed",
                record.fingerprint.yellow(),
                record.committed_batch_count
            );
        }
        println!();
    }

    println!(
        "{}",
        "Run 'redsync checkpoint clear --kind <KIND> --fingerprint <FP>' to discard one.".dimmed()
    );
}

fn capitalize(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Import => "Import",
        OperationKind::Delete => "Delete",
    }
}

/// Format a byte size as a human-readable string.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
