//! Bootstrap retrieval context: deadline and cancellation.
//!
//! Responsibilities:
//! - Carry an optional overall deadline for a bootstrap run.
//! - Carry a cancellation token that can be triggered from a signal handler.
//! - Derive per-request time bounds that never outlive the deadline.
//!
//! Does NOT handle:
//! - Installing signal handlers (the binary does that).
//!
//! Invariants:
//! - Once cancelled, a token remains cancelled forever.
//! - `bound(t)` is never longer than `t` nor than the time left before the deadline.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

/// Shared cancellation flag, cloned into every task that must observe it.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel token (idempotent).
    pub fn cancel(&self) {
        let was_cancelled = self.cancelled.swap(true, Ordering::SeqCst);
        if !was_cancelled {
            self.notify.notify_waiters();
        }
    }

    /// True if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once cancelled. The `notified()` future is created before the
    /// flag is read so a concurrent `cancel` is not missed.
    pub async fn cancelled(&self) {
        let notified = self.notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

/// Ambient context handed to every `retrieve` call during bootstrap.
#[derive(Clone, Debug, Default)]
pub struct RetrieveContext {
    deadline: Option<Instant>,
    cancellation: CancellationToken,
}

impl RetrieveContext {
    /// A context with no deadline and a fresh token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop starting new requests once `timeout` has elapsed from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once cancelled or past the deadline.
    pub fn is_done(&self) -> bool {
        self.cancellation.is_cancelled()
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Time bound for one request: `timeout`, shortened to the deadline.
    pub fn bound(&self, timeout: Duration) -> Duration {
        match self.deadline {
            Some(deadline) => timeout.min(deadline.saturating_duration_since(Instant::now())),
            None => timeout,
        }
    }

    /// Resolve when the context is cancelled. Never resolves otherwise.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await;
    }
}
