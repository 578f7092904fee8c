//! Terminal progress reporting.

use colored::Colorize;

use crate::model::OperationKind;
use crate::sync::ProgressSink;

/// Writes one line per committed batch to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalProgress;

impl ProgressSink for TerminalProgress {
    fn start(&self, kind: OperationKind, total: usize, committed: usize) {
        if committed > 0 {
            eprintln!(
                "{} {kind}: resuming at batch {} of {total}",
                "↻".cyan(),
                committed + 1
            );
        } else if total > 0 {
            eprintln!("{} {kind}: {total} batches", "→".cyan());
        }
    }

    fn advance(&self, kind: OperationKind, committed: usize, total: usize) {
        eprintln!(
            "  {} {kind} batch {committed}/{total} committed",
            "✓".green()
        );
    }

    fn finish(&self, _kind: OperationKind) {}
}
