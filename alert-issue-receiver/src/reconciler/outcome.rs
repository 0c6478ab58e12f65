//! Reconciliation outcome types.

use serde::Serialize;

/// What a reconciliation did to the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// Group is firing and no open issue existed, so one was created.
    Created {
        /// Issue number.
        number: u64,
        /// Issue URL.
        url: String,
    },

    /// Group is firing and an open issue already tracks it.
    AlreadyOpen {
        /// Issue number.
        number: u64,
    },

    /// Group resolved and its open issue was closed.
    Closed {
        /// Issue number.
        number: u64,
    },

    /// Group resolved and no open issue tracks it.
    NothingToClose,
}
