//! Single-flight token refresh state machine.
//!
//! STATES
//! ======
//! `Idle` -> `RefreshInFlight` when the first 401 asks for a refresh.
//! `RefreshInFlight` -> `Idle` on success (epoch advances), -> `Failed` on
//! error. `Failed` -> `Idle` only through [`RefreshMachine::rearm`].
//!
//! The first caller to ask becomes the leader and performs the refresh call.
//! Everyone arriving while it is in flight subscribes to a watch channel and
//! receives the same outcome. A caller that observed an older epoch than the
//! current one skips the refresh entirely: somebody already renewed the
//! session after its request went out.

#[cfg(test)]
#[path = "refresh_test.rs"]
mod refresh_test;

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::error::ApiError;

pub type RefreshOutcome = Result<(), ApiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    RefreshInFlight,
    Failed,
}

enum Phase {
    Idle,
    InFlight(watch::Receiver<Option<RefreshOutcome>>),
    Failed,
}

struct Inner {
    phase: Phase,
    epoch: u64,
}

/// What a caller should do after asking for a refresh.
pub enum Ticket<'a> {
    /// Perform the refresh call, then report through the guard.
    Leader(LeaderGuard<'a>),
    /// Wait for the in-flight refresh.
    Follower(watch::Receiver<Option<RefreshOutcome>>),
    /// A refresh already succeeded after the caller's request went out.
    AlreadyRefreshed,
    /// The machine is `Failed`; no refresh will be attempted.
    Refused,
}

pub struct RefreshMachine {
    inner: Mutex<Inner>,
}

impl Default for RefreshMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshMachine {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner { phase: Phase::Idle, epoch: 0 }) }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn state(&self) -> RefreshState {
        match self.lock().phase {
            Phase::Idle => RefreshState::Idle,
            Phase::InFlight(_) => RefreshState::RefreshInFlight,
            Phase::Failed => RefreshState::Failed,
        }
    }

    /// Number of successful refreshes so far. Callers sample it before
    /// sending a request and hand it back to [`RefreshMachine::begin`].
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    /// Ask for a refresh on behalf of a request sent at `observed_epoch`.
    pub fn begin(&self, observed_epoch: u64) -> Ticket<'_> {
        let mut inner = self.lock();
        if inner.epoch > observed_epoch && !matches!(inner.phase, Phase::Failed) {
            return Ticket::AlreadyRefreshed;
        }
        if let Phase::InFlight(rx) = &inner.phase {
            return Ticket::Follower(rx.clone());
        }
        if matches!(inner.phase, Phase::Failed) {
            return Ticket::Refused;
        }
        let (tx, rx) = watch::channel(None);
        inner.phase = Phase::InFlight(rx);
        tracing::debug!(epoch = inner.epoch, "refresh started");
        Ticket::Leader(LeaderGuard { machine: self, tx: Some(tx) })
    }

    /// Leave `Failed` so the next 401 may refresh again. No-op otherwise.
    pub fn rearm(&self) {
        let mut inner = self.lock();
        if matches!(inner.phase, Phase::Failed) {
            inner.phase = Phase::Idle;
        }
    }

    /// Wait for the leader's outcome.
    ///
    /// # Errors
    ///
    /// Returns the leader's refresh error, or [`ApiError::Network`] when the
    /// leader was dropped before reporting.
    pub async fn wait(mut rx: watch::Receiver<Option<RefreshOutcome>>) -> RefreshOutcome {
        match rx.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone().unwrap_or(Ok(())),
            Err(_) => Err(ApiError::Network("refresh abandoned".into())),
        }
    }

    fn settle(&self, outcome: &RefreshOutcome) {
        let mut inner = self.lock();
        if outcome.is_ok() {
            inner.epoch += 1;
            inner.phase = Phase::Idle;
        } else {
            inner.phase = Phase::Failed;
        }
    }

    fn abandon(&self) {
        let mut inner = self.lock();
        if matches!(inner.phase, Phase::InFlight(_)) {
            inner.phase = Phase::Idle;
        }
    }
}

/// Held by the caller performing the refresh. Dropping it without calling
/// [`LeaderGuard::finish`] returns the machine to `Idle` and wakes waiters
/// with an error.
pub struct LeaderGuard<'a> {
    machine: &'a RefreshMachine,
    tx: Option<watch::Sender<Option<RefreshOutcome>>>,
}

impl LeaderGuard<'_> {
    /// Record the refresh outcome and wake every waiter.
    pub fn finish(mut self, outcome: RefreshOutcome) {
        self.machine.settle(&outcome);
        match &outcome {
            Ok(()) => tracing::debug!("refresh succeeded"),
            Err(e) => tracing::warn!(error = %e, "refresh failed"),
        }
        if let Some(tx) = self.tx.take() {
            // Followers may all have gone away; nothing to deliver then.
            let _ = tx.send(Some(outcome));
        }
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            tracing::warn!("refresh leader dropped before completing");
            self.machine.abandon();
            drop(tx);
        }
    }
}
