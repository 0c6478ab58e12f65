//! Reconciliation tallies.

mod receiver_summary;

pub use receiver_summary::{ReceiverSummary, SummarySnapshot};
