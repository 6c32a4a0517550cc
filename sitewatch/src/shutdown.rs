//! Cooperative run cancellation.
//!
//! Once cancelled, the orchestrator stops starting new probes. Pipelines that
//! are already in flight finish on their own timeouts.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::Notify;
use tracing::warn;

/// Cancellation signal shared between the orchestrator and whoever may stop the run.
#[derive(Clone, Debug, Default)]
pub struct CancelController {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelController {
    /// Returns true if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation and wake all waiters.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    /// Wait until cancellation is requested.
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Cancel the run on the first Ctrl-C.
    pub fn cancel_on_ctrl_c(&self) {
        let controller = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, no further endpoints will be probed");
                controller.cancel();
            }
        });
    }
}
