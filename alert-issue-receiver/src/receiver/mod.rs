//! HTTP receiver for Alertmanager webhooks.
//!
//! Routes:
//! - `POST /v1/receiver` accepts a webhook notification and reconciles it.
//! - `GET /` renders the open issues as an HTML table for debugging.

mod error;
mod handlers;

pub use error::ReceiverError;
pub use handlers::router;

use crate::config::{ReceiverConfig, DEFAULT_MAX_BODY_BYTES};
use crate::directory::{DryRunDirectory, GitHubDirectory, IssueDirectory};
use crate::notification::AlertNotification;
use crate::reconciler::{IdentityLocks, ReconcileError, ReconcileOutcome, Reconciler};
use crate::summary::{ReceiverSummary, SummarySnapshot};
use crate::templates::TemplateRenderer;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Receives notifications and hands them to the reconciler.
pub struct Receiver {
    reconciler: Reconciler,
    directory: Arc<dyn IssueDirectory>,
    renderer: Arc<TemplateRenderer>,
    summary: ReceiverSummary,
    max_body_bytes: usize,
}

impl Receiver {
    /// Creates a receiver over `directory`, without per-identity locking.
    pub fn new(directory: Arc<dyn IssueDirectory>, renderer: Arc<TemplateRenderer>) -> Self {
        Self {
            reconciler: Reconciler::new(directory.clone(), renderer.clone()),
            directory,
            renderer,
            summary: ReceiverSummary::new(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Enables per-identity locking when `enabled` is true.
    #[must_use]
    pub fn with_identity_locks(mut self, enabled: bool) -> Self {
        if enabled {
            self.reconciler = self.reconciler.with_identity_locks(IdentityLocks::new());
        }
        self
    }

    /// Sets the largest accepted webhook body.
    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Builds a GitHub-backed receiver from the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError`] if the configuration is invalid, the issue template
    /// cannot be loaded or compiled, or the GitHub client cannot be built.
    pub fn from_config(config: &ReceiverConfig) -> Result<Self, ReceiverError> {
        config.validate()?;

        let renderer = match config.load_issue_template()? {
            Some(template) => TemplateRenderer::with_issue_template(template)?,
            None => TemplateRenderer::new(),
        };

        let github = GitHubDirectory::with_token(
            config.token(),
            config.owner(),
            config.repo(),
            config.request_timeout(),
        )?;

        let directory: Arc<dyn IssueDirectory> = if config.dry_run() {
            warn!("Dry run: issues will be listed but not created or closed");
            Arc::new(DryRunDirectory::new(Arc::new(github)))
        } else {
            Arc::new(github)
        };

        info!(
            owner = %config.owner(),
            repo = %config.repo(),
            identity_lock = config.identity_lock(),
            "Receiver configured"
        );

        Ok(Self::new(directory, Arc::new(renderer))
            .with_identity_locks(config.identity_lock())
            .with_max_body_bytes(config.max_body_bytes()))
    }

    /// Reconciles one notification, logging and tallying the result.
    ///
    /// # Errors
    ///
    /// Returns the reconciler's error after logging it.
    pub async fn handle(
        &self,
        notification: &AlertNotification,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        info!(
            group_key = %notification.group_key,
            status = %notification.status(),
            "Handling alert"
        );

        let result = self.reconciler.reconcile(notification).await;
        self.summary.record_result(&result);

        match &result {
            Ok(outcome) => {
                info!(group_key = %notification.group_key, outcome = ?outcome, "Completed alert");
            }
            Err(e) => {
                error!(group_key = %notification.group_key, error = %e, "Failed to handle alert");
            }
        }

        result
    }

    /// Returns the outcome tallies since start-up.
    #[must_use]
    pub fn summary(&self) -> SummarySnapshot {
        self.summary.snapshot()
    }

    /// Binds `addr` and serves until `shutdown` completes.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::Bind`] if the address cannot be bound and
    /// [`ReceiverError::Serve`] if the server fails.
    pub async fn serve<F>(self: Arc<Self>, addr: SocketAddr, shutdown: F) -> Result<(), ReceiverError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ReceiverError::Bind { addr, source })?;
        info!(addr = %addr, "Listening for Alertmanager notifications");

        axum::serve(
            listener,
            router(self).into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ReceiverError::Serve)
    }
}
