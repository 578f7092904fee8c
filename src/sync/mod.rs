//! Resumable batch sync of redirect records.
//!
//! A record file is split into fixed-size batches and submitted to the
//! remote one batch at a time. After each confirmed batch the committed
//! count is written to a durable checkpoint keyed by a fingerprint of the
//! input, so an interrupted or failed run resumes where it stopped:
//!
//! - **Fingerprint**: SHA256 over account, workspace and the raw file bytes
//! - **Plan**: contiguous batches of at most `max_batch_size` records
//! - **Checkpoint**: `{ imports: {fp: {counter}}, deletes: {...} }`, written atomically
//! - **Executor**: submit → checkpoint loop that stops cleanly on interrupt
//! - **Retry**: bounded, fixed-delay re-entry for transient failures
//! - **Reconcile**: optional deletion of remote keys absent from the import
//!
//! Delivery is at least once: the batch in flight when an interrupt lands is
//! submitted again on resume, so remote operations must be idempotent.
//!
//! # Example
//!
//! ```ignore
//! use redsync::sync::{load_input, EngineConfig, NoProgress, SyncEngine};
//! use redsync::model::OperationKind;
//!
//! let input = load_input(OperationKind::Import, Path::new("redirects.json"))?;
//! let engine = SyncEngine::new(&client, config, &NoProgress)?;
//! let report = engine.sync(&input, true).await?;
//! ```

mod checkpoint;
mod engine;
mod executor;
mod file;
mod fingerprint;
mod interrupt;
mod plan;
mod reconcile;
mod retry;
mod status;
mod types;

#[cfg(test)]
mod testing;

pub use checkpoint::{CheckpointRecord, CheckpointStore, CHECKPOINT_FILE};
pub use engine::{input_status, load_input, SyncEngine};
pub use executor::{BatchExecutor, BatchRun, BatchSubmitter, KindSubmitter, NoProgress, ProgressSink};
pub use file::{atomic_write, parse_records, write_records, RecordInput};
pub use fingerprint::{fingerprint, short};
pub use interrupt::{CancelToken, InterruptGuard, InterruptHandler, SignalSource};
pub use plan::{plan, Batch};
pub use reconcile::{stale_keys, stale_list_path, write_stale_list, STALE_DIR};
pub use retry::{run_with_retry, RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
pub use status::{print_checkpoints, print_status};
pub use types::{
    CleanupReport, EngineConfig, FingerprintStatus, RunOutcome, SyncContext, SyncReport,
    DEFAULT_BATCH_SIZE,
};
