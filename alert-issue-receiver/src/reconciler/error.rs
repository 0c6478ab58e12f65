//! Reconciliation error types.

use crate::directory::DirectoryError;
use crate::templates::TemplateError;
use thiserror::Error;

/// Errors that can occur while reconciling a notification.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Issue tracker call failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Notification status is neither `firing` nor `resolved`.
    #[error("Unsupported alert status: {status}")]
    UnsupportedStatus { status: String },

    /// Issue body could not be rendered.
    #[error("Failed to render issue body: {0}")]
    Template(#[from] TemplateError),
}
