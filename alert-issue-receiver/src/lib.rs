#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod config;
pub mod directory;
pub mod notification;
pub mod receiver;
pub mod reconciler;
pub mod summary;
pub mod templates;

pub use config::{ConfigError, ReceiverConfig};
pub use directory::{
    build_client, install_crypto_provider, DirectoryError, DryRunDirectory, GitHubDirectory,
    IssueDirectory, IssueState, MemoryDirectory, TrackedIssue,
};
pub use notification::{Alert, AlertGroup, AlertNotification, AlertStatus, NotificationError};
pub use receiver::{router, Receiver, ReceiverError};
pub use reconciler::{IdentityLocks, ReconcileError, ReconcileOutcome, Reconciler};
pub use summary::{ReceiverSummary, SummarySnapshot};
pub use templates::{format_issue_body, format_title, TemplateError, TemplateRenderer};
