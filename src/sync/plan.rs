//! Deterministic chunk planning.
//!
//! Resume works by batch index, so planning the same records with the same
//! batch size must always produce the same batches.

use crate::model::Redirect;

/// One contiguous slice of the planned record sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    /// Zero-based position in the plan.
    pub index: usize,
    pub records: &'a [Redirect],
}

impl<'a> Batch<'a> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identity keys of the records in this batch.
    #[must_use]
    pub fn keys(&self) -> Vec<&'a str> {
        self.records.iter().map(Redirect::key).collect()
    }
}

/// Split records into `ceil(n / max_batch_size)` ordered batches.
///
/// Every batch but the last holds exactly `max_batch_size` records. An empty
/// input yields no batches.
///
/// # Panics
///
/// Panics if `max_batch_size` is zero. Callers validate the configured size.
#[must_use]
pub fn plan(records: &[Redirect], max_batch_size: usize) -> Vec<Batch<'_>> {
    assert!(max_batch_size > 0, "batch size must be at least 1");
    records
        .chunks(max_batch_size)
        .enumerate()
        .map(|(index, records)| Batch { index, records })
        .collect()
}
