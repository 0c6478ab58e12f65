//! Alert-to-issue reconciliation.
//!
//! This module decides, for one notification, whether to create an issue, close
//! one, or leave the tracker alone. It keeps no memory of earlier notifications:
//! the tracker is listed every time, which is what makes repeated and reordered
//! deliveries from Alertmanager safe.

mod error;
mod locks;
mod outcome;

pub use error::ReconcileError;
pub use locks::{IdentityGuard, IdentityLocks};
pub use outcome::ReconcileOutcome;

use crate::directory::{IssueDirectory, TrackedIssue};
use crate::notification::{AlertNotification, AlertStatus};
use crate::templates::{format_title, TemplateRenderer};
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};

/// Issue state an alert status asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Desired {
    Open,
    Closed,
}

impl TryFrom<&AlertStatus> for Desired {
    type Error = ReconcileError;

    fn try_from(status: &AlertStatus) -> Result<Self, Self::Error> {
        match status {
            AlertStatus::Firing => Ok(Self::Open),
            AlertStatus::Resolved => Ok(Self::Closed),
            AlertStatus::Other(status) => Err(ReconcileError::UnsupportedStatus {
                status: status.clone(),
            }),
        }
    }
}

/// Tracker mutation chosen for a notification.
#[derive(Debug, PartialEq, Eq)]
enum Action<'a> {
    Create,
    Keep(&'a TrackedIssue),
    Close(&'a TrackedIssue),
    Nothing,
}

/// Applies the decision table.
fn decide(desired: Desired, found: Option<&TrackedIssue>) -> Action<'_> {
    match (desired, found) {
        (Desired::Open, None) => Action::Create,
        (Desired::Open, Some(issue)) => Action::Keep(issue),
        (Desired::Closed, Some(issue)) => Action::Close(issue),
        (Desired::Closed, None) => Action::Nothing,
    }
}

/// Finds the first issue whose title equals `identity`.
fn find_matching<'a>(issues: &'a [TrackedIssue], identity: &str) -> Option<&'a TrackedIssue> {
    issues.iter().find(|issue| issue.title == identity)
}

/// Reconciles alert notifications against an issue directory.
pub struct Reconciler {
    directory: Arc<dyn IssueDirectory>,
    renderer: Arc<TemplateRenderer>,
    locks: Option<IdentityLocks>,
}

impl Reconciler {
    /// Creates a reconciler without per-identity locking.
    pub fn new(directory: Arc<dyn IssueDirectory>, renderer: Arc<TemplateRenderer>) -> Self {
        Self {
            directory,
            renderer,
            locks: None,
        }
    }

    /// Serializes reconciliations that share an identity.
    #[must_use]
    pub fn with_identity_locks(mut self, locks: IdentityLocks) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Brings the tracker in line with a notification.
    ///
    /// | status   | matching open issue | action  |
    /// |----------|---------------------|---------|
    /// | firing   | no                  | create  |
    /// | firing   | yes                 | nothing |
    /// | resolved | yes                 | close   |
    /// | resolved | no                  | nothing |
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::UnsupportedStatus`] for any other status, without
    /// touching the tracker. Tracker and rendering errors are returned unchanged.
    pub async fn reconcile(
        &self,
        notification: &AlertNotification,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let span = info_span!(
            "reconcile",
            group_key = %notification.group_key,
            status = %notification.status()
        );

        async {
            let desired = Desired::try_from(notification.status())?;
            let identity = format_title(notification);

            let _guard = match &self.locks {
                Some(locks) => Some(locks.acquire(&identity).await),
                None => None,
            };

            self.apply(notification, desired, &identity).await
        }
        .instrument(span)
        .await
    }

    async fn apply(
        &self,
        notification: &AlertNotification,
        desired: Desired,
        identity: &str,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let issues = self.directory.list_open_issues().await?;
        let found = find_matching(&issues, identity);
        if let Some(issue) = found {
            debug!(issue_number = issue.number, "Found matching issue");
        }

        match decide(desired, found) {
            Action::Create => {
                let body = self.renderer.render_issue_body(notification)?;
                let issue = self.directory.create_issue(identity, &body).await?;
                info!(issue_number = issue.number, "Opened issue for firing alert");
                Ok(ReconcileOutcome::Created {
                    number: issue.number,
                    url: issue.url,
                })
            }
            Action::Keep(issue) => {
                info!(issue_number = issue.number, "Issue already open, skipping");
                Ok(ReconcileOutcome::AlreadyOpen {
                    number: issue.number,
                })
            }
            Action::Close(issue) => {
                // Alertmanager repeats "resolved" until resolve_timeout elapses;
                // later repeats find no open issue and land in `Nothing`.
                self.directory.close_issue(issue).await?;
                info!(issue_number = issue.number, "Closed issue for resolved alert");
                Ok(ReconcileOutcome::Closed {
                    number: issue.number,
                })
            }
            Action::Nothing => {
                info!("No open issue to close");
                Ok(ReconcileOutcome::NothingToClose)
            }
        }
    }
}
