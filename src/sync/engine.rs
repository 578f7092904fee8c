//! The resumable sync engine.
//!
//! One attempt is: fingerprint the input, look up its checkpoint, plan the
//! batches, and execute from the checkpoint. [`SyncEngine::run`] wraps
//! attempts in the retry policy, and [`SyncEngine::sync`] adds the
//! destructive cleanup pass, which is simply a second run of the same engine
//! with [`OperationKind::Delete`].
//!
//! The interrupt handler is armed for the whole of a `run` or `sync` call,
//! so an interrupt during a retry delay, the remote listing, or between the
//! import and cleanup runs ends the call with [`RunOutcome::Interrupted`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::OperationKind;
use crate::remote::RemoteClient;
use crate::sync::checkpoint::CheckpointStore;
use crate::sync::executor::{BatchExecutor, BatchRun, KindSubmitter, ProgressSink};
use crate::sync::file::RecordInput;
use crate::sync::fingerprint::{fingerprint, short};
use crate::sync::interrupt::{CancelToken, InterruptHandler, SignalSource};
use crate::sync::plan::plan;
use crate::sync::reconcile::{stale_keys, stale_list_path, write_stale_list};
use crate::sync::retry::{run_with_retry, RetryPolicy};
use crate::sync::types::{
    CleanupReport, EngineConfig, FingerprintStatus, RunOutcome, SyncContext, SyncReport,
};
use crate::validate::validate_records;

/// Load an input file and validate it for `kind`.
///
/// # Errors
///
/// Returns [`Error::Read`], [`Error::Parse`], or [`Error::Validation`].
pub fn load_input(kind: OperationKind, path: &Path) -> Result<RecordInput> {
    let mut input = RecordInput::load(path)?;
    input.records = validate_records(kind, std::mem::take(&mut input.records))?;
    debug!(%kind, path = %path.display(), records = input.records.len(), "Input loaded");
    Ok(input)
}

/// Resume state of `input` under `context` for both operation kinds.
///
/// Needs no remote: the fingerprint and plan are computed locally and
/// looked up in `store`.
///
/// # Errors
///
/// Returns an error if the checkpoint document cannot be read.
pub fn input_status(
    store: &CheckpointStore,
    context: &SyncContext,
    input: &RecordInput,
) -> Result<Vec<FingerprintStatus>> {
    let fingerprint = fingerprint(&context.account, &context.workspace, &input.raw);
    let total_batches = plan(&input.records, context.max_batch_size.max(1)).len();

    OperationKind::ALL
        .into_iter()
        .map(|kind| {
            Ok(FingerprintStatus {
                kind,
                fingerprint: fingerprint.clone(),
                total_batches,
                committed: store.get(kind, &fingerprint)?.map(|c| c.committed_batch_count),
            })
        })
        .collect()
}

/// Resumable batch sync against one account/workspace.
pub struct SyncEngine<'a, C> {
    client: &'a C,
    progress: &'a dyn ProgressSink,
    store: CheckpointStore,
    context: SyncContext,
    retry: RetryPolicy,
    signals: SignalSource,
    state_dir: PathBuf,
    cancel: CancelToken,
}

impl<'a, C: RemoteClient> SyncEngine<'a, C> {
    /// Create an engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the context is incomplete.
    pub fn new(client: &'a C, config: EngineConfig, progress: &'a dyn ProgressSink) -> Result<Self> {
        let EngineConfig {
            context,
            retry,
            signals,
            state_dir,
        } = config;

        if context.max_batch_size == 0 {
            return Err(Error::InvalidArgument("batch size must be at least 1".into()));
        }
        if context.account.trim().is_empty() || context.workspace.trim().is_empty() {
            return Err(Error::InvalidArgument("account and workspace are required".into()));
        }

        Ok(Self {
            client,
            progress,
            store: CheckpointStore::in_dir(&state_dir),
            context,
            retry,
            signals,
            state_dir,
            cancel: CancelToken::new(),
        })
    }

    /// Token that interrupts this engine's runs when cancelled.
    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    #[must_use]
    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Run `input` to completion under `kind`, retrying transient failures.
    ///
    /// Returns the keys of every applied record, or the checkpointed
    /// position if an interrupt stopped the run.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable error, or the last transient error
    /// once the retry budget is spent. The checkpoint stays on disk.
    pub async fn run(&self, kind: OperationKind, input: &RecordInput) -> Result<RunOutcome> {
        let _armed = InterruptHandler::arm(&self.cancel, self.signals);
        self.run_armed(kind, input).await
    }

    /// Import `input`, then optionally delete remote records it no longer has.
    ///
    /// With `prune`, the remote keys are listed before the import. Once the
    /// import has completed and its checkpoint is cleared, the keys missing
    /// from the input are written to a stale list and deleted by a
    /// Delete-kind run over that list.
    ///
    /// # Errors
    ///
    /// Import failures are returned as-is. Cleanup failures are wrapped in
    /// [`Error::Cleanup`] naming the stale list so deletion can be resumed.
    pub async fn sync(&self, input: &RecordInput, prune: bool) -> Result<SyncReport> {
        let _armed = InterruptHandler::arm(&self.cancel, self.signals);

        let previous = if prune {
            let Some(keys) = self.list_previous().await? else {
                return Ok(SyncReport {
                    import: self.interrupted_at(OperationKind::Import, input)?,
                    cleanup: None,
                });
            };
            Some(keys)
        } else {
            None
        };

        let import = self.run_armed(OperationKind::Import, input).await?;

        let cleanup = match (&import, previous) {
            (
                RunOutcome::Applied {
                    fingerprint, keys, ..
                },
                Some(previous),
            ) => self.reconcile(&previous, keys, fingerprint).await?,
            _ => None,
        };

        Ok(SyncReport { import, cleanup })
    }

    /// Resume state of `input` for both operation kinds.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint document cannot be read.
    pub fn status(&self, input: &RecordInput) -> Result<Vec<FingerprintStatus>> {
        input_status(&self.store, &self.context, input)
    }

    fn fingerprint_of(&self, input: &RecordInput) -> String {
        fingerprint(&self.context.account, &self.context.workspace, &input.raw)
    }

    /// Retry loop of one run. The caller holds the interrupt guard.
    async fn run_armed(&self, kind: OperationKind, input: &RecordInput) -> Result<RunOutcome> {
        let operation = kind.to_string();
        let outcome = run_with_retry(&operation, self.retry, &self.cancel, |attempt| {
            self.attempt(kind, input, attempt)
        })
        .await?;

        match outcome {
            Some(outcome) => Ok(outcome),
            None => self.interrupted_at(kind, input),
        }
    }

    /// Outcome for a run stopped outside the batch loop, at its stored checkpoint.
    fn interrupted_at(&self, kind: OperationKind, input: &RecordInput) -> Result<RunOutcome> {
        let fingerprint = self.fingerprint_of(input);
        let total_batches = plan(&input.records, self.context.max_batch_size).len();
        let committed = self
            .store
            .get(kind, &fingerprint)?
            .map_or(0, |c| c.committed_batch_count);

        warn!(%kind, committed, total_batches, "Run interrupted between attempts");
        Ok(RunOutcome::Interrupted {
            fingerprint,
            committed,
            total_batches,
        })
    }

    /// Keys present remotely before the import, or `None` if interrupted.
    async fn list_previous(&self) -> Result<Option<Vec<String>>> {
        let listed = run_with_retry("list", self.retry, &self.cancel, |_| async move {
            tokio::select! {
                biased;

                () = self.cancel.cancelled() => Ok(None),
                keys = self.client.list_keys() => keys.map(Some),
            }
        })
        .await?
        .flatten();

        if let Some(keys) = &listed {
            info!(count = keys.len(), "Captured remote keys before import");
        }
        Ok(listed)
    }

    async fn attempt(&self, kind: OperationKind, input: &RecordInput, attempt: u32) -> Result<RunOutcome> {
        let fingerprint = self.fingerprint_of(input);
        let batches = plan(&input.records, self.context.max_batch_size);
        let total = batches.len();

        let start = self
            .store
            .get(kind, &fingerprint)?
            .map_or(0, |c| c.committed_batch_count);

        if start > total {
            return Err(Error::CheckpointMismatch {
                kind: kind.to_string(),
                fingerprint,
                committed: start,
                planned: total,
            });
        }

        if start > 0 {
            info!(%kind, fingerprint = short(&fingerprint), start, total, attempt, "Resuming from checkpoint");
        } else {
            debug!(%kind, fingerprint = short(&fingerprint), total, attempt, "Starting run");
        }

        let submitter = KindSubmitter::new(self.client, kind);
        let executor = BatchExecutor::new(kind, &fingerprint, &self.store, self.progress, &self.cancel);

        match executor.run(&batches, start, &submitter).await? {
            BatchRun::Completed { applied } => {
                self.store.clear(kind, &fingerprint)?;
                Ok(RunOutcome::Applied {
                    keys: input.records.iter().map(|r| r.key().to_string()).collect(),
                    fingerprint,
                    total_batches: total,
                    submitted_batches: applied,
                })
            }
            BatchRun::Interrupted { committed } => Ok(RunOutcome::Interrupted {
                fingerprint,
                committed,
                total_batches: total,
            }),
        }
    }

    async fn reconcile(
        &self,
        previous: &[String],
        applied: &[String],
        import_fingerprint: &str,
    ) -> Result<Option<CleanupReport>> {
        let stale = stale_keys(previous, applied);
        if stale.is_empty() {
            info!("No stale redirects to delete");
            return Ok(None);
        }

        let stale_list = stale_list_path(&self.state_dir, import_fingerprint);
        let wrap = |source: Error| Error::Cleanup {
            stale_list: stale_list.clone(),
            source: Box::new(source),
        };

        write_stale_list(&stale_list, &stale).map_err(wrap)?;
        info!(count = stale.len(), path = %stale_list.display(), "Deleting stale redirects");

        let input = load_input(OperationKind::Delete, &stale_list).map_err(wrap)?;
        let outcome = self.run_armed(OperationKind::Delete, &input).await.map_err(wrap)?;

        if !outcome.is_interrupted() {
            match fs::remove_file(&stale_list) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(error = %e, path = %stale_list.display(), "Cannot remove stale list"),
            }
        }

        Ok(Some(CleanupReport {
            stale_list,
            stale: stale.len(),
            outcome,
        }))
    }
}
