//! Types shared by the sync engine and its callers.

use std::path::PathBuf;

use serde::Serialize;

use crate::sync::interrupt::SignalSource;
use crate::sync::retry::RetryPolicy;

/// Default maximum number of records per batch.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Execution context of a run. Part of every fingerprint except the batch
/// size, which only shapes the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncContext {
    pub account: String,
    pub workspace: String,
    pub max_batch_size: usize,
}

/// Everything the engine needs besides the remote client.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub context: SyncContext,
    pub retry: RetryPolicy,
    pub signals: SignalSource,
    /// Directory holding the checkpoint document and stale lists.
    pub state_dir: PathBuf,
}

/// Result of one engine run over one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every batch is committed and the checkpoint is gone.
    Applied {
        fingerprint: String,
        /// Keys of every record in the input, in input order.
        #[serde(skip)]
        keys: Vec<String>,
        total_batches: usize,
        /// Batches submitted by this invocation (the rest were resumed past).
        submitted_batches: usize,
    },
    /// An interrupt stopped the run. The checkpoint holds `committed`.
    Interrupted {
        fingerprint: String,
        committed: usize,
        total_batches: usize,
    },
}

impl RunOutcome {
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }
}

/// Outcome of the cleanup pass of a destructive sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Where the stale keys were written. Removed once deletion completes.
    pub stale_list: PathBuf,
    /// Number of stale keys scheduled for deletion.
    pub stale: usize,
    pub outcome: RunOutcome,
}

/// Outcome of `import`, with the optional cleanup pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub import: RunOutcome,
    /// `None` when cleanup was not requested or nothing was stale.
    pub cleanup: Option<CleanupReport>,
}

impl SyncReport {
    /// Whether any stage stopped on an interrupt.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.import.is_interrupted()
            || self.cleanup.as_ref().is_some_and(|c| c.outcome.is_interrupted())
    }
}

/// Resume state of one input under one operation kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FingerprintStatus {
    pub kind: crate::model::OperationKind,
    pub fingerprint: String,
    pub total_batches: usize,
    /// `None` when nothing is in progress for this fingerprint.
    pub committed: Option<usize>,
}
