//! Remote redirect service client.
//!
//! The sync engine only needs three calls: import a batch, delete a batch
//! of keys, and list the keys currently present. Account and workspace
//! scoping belong to the client, as do transport, authentication, and
//! per-request timeouts.

mod http;

pub use http::{classify_status, HttpClient};

use std::future::Future;

use crate::error::Result;
use crate::model::Redirect;

/// Trait for remote redirect services.
///
/// Implementations must tolerate receiving the same batch twice: an
/// interrupted run resubmits the batch that was in flight.
pub trait RemoteClient: Send + Sync {
    /// Create or overwrite the given redirects.
    fn import(&self, records: &[Redirect]) -> impl Future<Output = Result<()>> + Send;

    /// Remove redirects by key. Unknown keys are not an error.
    fn delete(&self, keys: &[&str]) -> impl Future<Output = Result<()>> + Send;

    /// Keys of every redirect currently stored remotely.
    fn list_keys(&self) -> impl Future<Output = Result<Vec<String>>> + Send;
}
