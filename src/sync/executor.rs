//! Sequential batch execution with checkpointing.
//!
//! Batches are submitted one at a time, in plan order. The checkpoint moves
//! to `i + 1` only after batch `i` is confirmed, so the stored count never
//! includes a batch that is still in flight.

use std::future::Future;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::OperationKind;
use crate::remote::RemoteClient;
use crate::sync::checkpoint::CheckpointStore;
use crate::sync::interrupt::CancelToken;
use crate::sync::plan::Batch;

/// Submits one batch to the remote side.
///
/// Submission must be safe to repeat for the same batch: after an
/// interrupt, the batch that was in flight is submitted again on resume.
pub trait BatchSubmitter {
    fn submit(&self, batch: Batch<'_>) -> impl Future<Output = Result<()>>;
}

/// Routes batches to the client call matching an operation kind.
pub struct KindSubmitter<'a, C> {
    client: &'a C,
    kind: OperationKind,
}

impl<'a, C: RemoteClient> KindSubmitter<'a, C> {
    #[must_use]
    pub fn new(client: &'a C, kind: OperationKind) -> Self {
        Self { client, kind }
    }
}

impl<C: RemoteClient> BatchSubmitter for KindSubmitter<'_, C> {
    async fn submit(&self, batch: Batch<'_>) -> Result<()> {
        match self.kind {
            OperationKind::Import => self.client.import(batch.records).await,
            OperationKind::Delete => self.client.delete(&batch.keys()).await,
        }
    }
}

/// Receives progress updates from a batch run.
pub trait ProgressSink: Send + Sync {
    /// A run is starting with `committed` of `total` batches already done.
    fn start(&self, kind: OperationKind, total: usize, committed: usize);

    /// Batch number `committed` (one-based) has been committed.
    fn advance(&self, kind: OperationKind, committed: usize, total: usize);

    /// The run ended, successfully or not.
    fn finish(&self, kind: OperationKind);
}

/// Progress sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn start(&self, _kind: OperationKind, _total: usize, _committed: usize) {}
    fn advance(&self, _kind: OperationKind, _committed: usize, _total: usize) {}
    fn finish(&self, _kind: OperationKind) {}
}

/// How a batch run ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchRun {
    /// Every batch is committed. Carries the number applied in this run.
    Completed { applied: usize },
    /// An interrupt stopped the run; `committed` batches are durable.
    Interrupted { committed: usize },
}

/// Drives the submit → checkpoint loop for one fingerprint.
pub struct BatchExecutor<'a> {
    kind: OperationKind,
    fingerprint: &'a str,
    store: &'a CheckpointStore,
    progress: &'a dyn ProgressSink,
    cancel: &'a CancelToken,
}

impl<'a> BatchExecutor<'a> {
    #[must_use]
    pub fn new(
        kind: OperationKind,
        fingerprint: &'a str,
        store: &'a CheckpointStore,
        progress: &'a dyn ProgressSink,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            kind,
            fingerprint,
            store,
            progress,
            cancel,
        }
    }

    /// Submit `batches[start..]` in order.
    ///
    /// The checkpoint is written as `start` before the first submission and
    /// as `i + 1` after each confirmed batch `i`. A failed submission leaves
    /// it at `i` and propagates the error; no later batch is attempted. On
    /// interrupt the in-flight submission is dropped, not awaited, and the
    /// last committed count is written before returning.
    ///
    /// # Errors
    ///
    /// Returns the submission error, or a checkpoint write error.
    pub async fn run<S: BatchSubmitter>(
        &self,
        batches: &[Batch<'_>],
        start: usize,
        submitter: &S,
    ) -> Result<BatchRun> {
        let total = batches.len();
        let (kind, fingerprint) = (self.kind, self.fingerprint);

        self.store.save(kind, fingerprint, start)?;
        self.progress.start(kind, total, start);

        let outcome = self.submit_from(batches, start, submitter).await;
        self.progress.finish(kind);
        outcome
    }

    async fn submit_from<S: BatchSubmitter>(
        &self,
        batches: &[Batch<'_>],
        start: usize,
        submitter: &S,
    ) -> Result<BatchRun> {
        let total = batches.len();
        let (kind, fingerprint) = (self.kind, self.fingerprint);

        for (index, batch) in batches.iter().enumerate().skip(start) {
            if self.cancel.is_cancelled() {
                return self.interrupted(index);
            }

            debug!(%kind, batch = index, size = batch.len(), "Submitting batch");

            tokio::select! {
                biased;

                () = self.cancel.cancelled() => {
                    return self.interrupted(index);
                }

                result = submitter.submit(*batch) => {
                    if let Err(e) = result {
                        warn!(%kind, batch = index, committed = index, error = %e, "Batch failed");
                        return Err(e);
                    }
                }
            }

            self.store.save(kind, fingerprint, index + 1)?;
            self.progress.advance(kind, index + 1, total);
        }

        info!(%kind, batches = total, "All batches committed");
        Ok(BatchRun::Completed {
            applied: total.saturating_sub(start),
        })
    }

    fn interrupted(&self, committed: usize) -> Result<BatchRun> {
        self.store.save(self.kind, self.fingerprint, committed)?;
        warn!(kind = %self.kind, committed, "Run interrupted, checkpoint saved");
        Ok(BatchRun::Interrupted { committed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::Redirect;
    use crate::sync::plan::plan;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Records submitted batch indexes and fails at a chosen index.
    #[derive(Default)]
    struct ScriptedSubmitter {
        submitted: RefCell<Vec<usize>>,
        fail_at: Option<usize>,
    }

    impl BatchSubmitter for ScriptedSubmitter {
        async fn submit(&self, batch: Batch<'_>) -> Result<()> {
            self.submitted.borrow_mut().push(batch.index);
            if self.fail_at == Some(batch.index) {
                return Err(Error::RemoteTransient("boom".into()));
            }
            Ok(())
        }
    }

    fn records(n: usize) -> Vec<Redirect> {
        (0..n).map(|i| Redirect::key_only(format!("/r{i}"))).collect()
    }

    #[tokio::test]
    async fn test_failure_leaves_checkpoint_at_failed_index() {
        let temp_dir = TempDir::new().unwrap();
        let store = CheckpointStore::in_dir(temp_dir.path());
        let cancel = CancelToken::new();
        let input = records(10);
        let batches = plan(&input, 2);

        let submitter = ScriptedSubmitter {
            fail_at: Some(3),
            ..Default::default()
        };
        let executor = BatchExecutor::new(OperationKind::Import, "fp", &store, &NoProgress, &cancel);
        let result = executor.run(&batches, 0, &submitter).await;

        assert!(matches!(result, Err(Error::RemoteTransient(_))));
        assert_eq!(*submitter.submitted.borrow(), vec![0, 1, 2, 3]);
        let saved = store.get(OperationKind::Import, "fp").unwrap().unwrap();
        assert_eq!(saved.committed_batch_count, 3);
    }

    #[tokio::test]
    async fn test_resume_skips_committed_batches() {
        let temp_dir = TempDir::new().unwrap();
        let store = CheckpointStore::in_dir(temp_dir.path());
        let cancel = CancelToken::new();
        let input = records(10);
        let batches = plan(&input, 2);

        let submitter = ScriptedSubmitter::default();
        let executor = BatchExecutor::new(OperationKind::Import, "fp", &store, &NoProgress, &cancel);
        let outcome = executor.run(&batches, 3, &submitter).await.unwrap();

        assert_eq!(outcome, BatchRun::Completed { applied: 2 });
        assert_eq!(*submitter.submitted.borrow(), vec![3, 4]);
        let saved = store.get(OperationKind::Import, "fp").unwrap().unwrap();
        assert_eq!(saved.committed_batch_count, 5);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_submits_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = CheckpointStore::in_dir(temp_dir.path());
        let cancel = CancelToken::new();
        cancel.cancel();
        let input = records(4);
        let batches = plan(&input, 2);

        let submitter = ScriptedSubmitter::default();
        let executor = BatchExecutor::new(OperationKind::Delete, "fp", &store, &NoProgress, &cancel);
        let outcome = executor.run(&batches, 1, &submitter).await.unwrap();

        assert_eq!(outcome, BatchRun::Interrupted { committed: 1 });
        assert!(submitter.submitted.borrow().is_empty());
        let saved = store.get(OperationKind::Delete, "fp").unwrap().unwrap();
        assert_eq!(saved.committed_batch_count, 1);
    }

    #[tokio::test]
    async fn test_empty_plan_completes() {
        let temp_dir = TempDir::new().unwrap();
        let store = CheckpointStore::in_dir(temp_dir.path());
        let cancel = CancelToken::new();

        let submitter = ScriptedSubmitter::default();
        let executor = BatchExecutor::new(OperationKind::Import, "fp", &store, &NoProgress, &cancel);
        let outcome = executor.run(&[], 0, &submitter).await.unwrap();

        assert_eq!(outcome, BatchRun::Completed { applied: 0 });
    }
}
