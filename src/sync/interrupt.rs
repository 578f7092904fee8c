//! Cooperative cancellation on external interrupt.
//!
//! The signal listener only flips a [`CancelToken`]. The batch loop watches
//! the token, and on cancellation it persists the last committed checkpoint
//! itself and stops without waiting for the in-flight submission.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Shared cancellation flag.
///
/// Cloning yields a handle to the same flag. Once cancelled, a token stays
/// cancelled.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once cancellation has been requested.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Where interrupts come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalSource {
    /// Listen for Ctrl-C (SIGINT) from the OS.
    #[default]
    CtrlC,
    /// Only explicit [`CancelToken::cancel`] calls interrupt a run.
    Manual,
}

/// Arms interrupt listening for the duration of one batch run.
pub struct InterruptHandler;

impl InterruptHandler {
    /// Start forwarding interrupts from `source` into `token`.
    ///
    /// Must be called inside a tokio runtime. The returned guard disarms
    /// the listener when dropped, so it never outlives the run it guards.
    #[must_use]
    pub fn arm(token: &CancelToken, source: SignalSource) -> InterruptGuard {
        let listener = match source {
            SignalSource::CtrlC => {
                let token = token.clone();
                Some(tokio::spawn(async move {
                    match tokio::signal::ctrl_c().await {
                        Ok(()) => {
                            warn!("Interrupt received, stopping after the last committed batch");
                            token.cancel();
                        }
                        Err(e) => warn!(error = %e, "Cannot listen for interrupts"),
                    }
                }))
            }
            SignalSource::Manual => None,
        };
        debug!(?source, "Interrupt handler armed");
        InterruptGuard { listener }
    }
}

/// Keeps the interrupt listener alive; dropping it disarms the handler.
pub struct InterruptGuard {
    listener: Option<JoinHandle<()>>,
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
            debug!("Interrupt handler disarmed");
        }
    }
}
