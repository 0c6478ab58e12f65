//! Receiver summary types.

use crate::reconciler::{ReconcileError, ReconcileOutcome};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Running tallies of reconciliation outcomes since start-up.
#[derive(Debug, Default)]
pub struct ReceiverSummary {
    created: AtomicUsize,
    already_open: AtomicUsize,
    closed: AtomicUsize,
    nothing_to_close: AtomicUsize,
    failed: AtomicUsize,
}

/// Point-in-time copy of a [`ReceiverSummary`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummarySnapshot {
    /// Number of issues created.
    pub created: usize,

    /// Number of firing notifications that found an issue already open.
    pub already_open: usize,

    /// Number of issues closed.
    pub closed: usize,

    /// Number of resolved notifications with no open issue.
    pub nothing_to_close: usize,

    /// Number of reconciliations that returned an error.
    pub failed: usize,
}

impl ReceiverSummary {
    /// Creates a summary with every count at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the summary with a reconciliation result.
    pub fn record_result(&self, result: &Result<ReconcileOutcome, ReconcileError>) {
        let counter = match result {
            Ok(ReconcileOutcome::Created { .. }) => &self.created,
            Ok(ReconcileOutcome::AlreadyOpen { .. }) => &self.already_open,
            Ok(ReconcileOutcome::Closed { .. }) => &self.closed,
            Ok(ReconcileOutcome::NothingToClose) => &self.nothing_to_close,
            Err(_) => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the current counts.
    #[must_use]
    pub fn snapshot(&self) -> SummarySnapshot {
        SummarySnapshot {
            created: self.created.load(Ordering::Relaxed),
            already_open: self.already_open.load(Ordering::Relaxed),
            closed: self.closed.load(Ordering::Relaxed),
            nothing_to_close: self.nothing_to_close.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

impl SummarySnapshot {
    /// Total number of reconciliations recorded.
    #[must_use]
    pub fn total(&self) -> usize {
        self.created + self.already_open + self.closed + self.nothing_to_close + self.failed
    }

    /// Returns true if any reconciliation failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
