// src/exec/cancel.rs

//! Run cancellation.

use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    flag: AtomicBool,
    notify: Notify,
}

/// Cloneable cancellation handle for a run.
///
/// The executor checks it between dispatches and during the inter-retry
/// wait; handlers receive a clone through the job context so an in-flight
/// submission can observe the request as well. Cancelling is idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    inner: Arc<Inner>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and wake every waiter.
    pub fn cancel(&self) {
        self.inner.flag.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Resolve once cancellation has been requested.
    pub async fn cancelled(&self) {
        let mut notified = pin!(self.inner.notify.notified());

        loop {
            if self.is_cancelled() {
                return;
            }

            // Register interest before re-checking the flag, so a cancel
            // landing between the check and the await is not lost.
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }

            notified.as_mut().await;
            notified.set(self.inner.notify.notified());
        }
    }
}
