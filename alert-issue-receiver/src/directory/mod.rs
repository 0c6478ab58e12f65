//! Issue tracker access.
//!
//! The reconciler only needs three things from a tracker: the complete list of open
//! issues, a way to create one and a way to close one. [`IssueDirectory`] is that
//! seam. [`GitHubDirectory`] talks to a GitHub repository, [`MemoryDirectory`] keeps
//! issues in process and [`DryRunDirectory`] logs mutations instead of making them.

mod dry_run;
mod error;
mod github;
mod memory;
mod tracked_issue;

pub use dry_run::DryRunDirectory;
pub use error::DirectoryError;
pub use github::{build_client, install_crypto_provider, GitHubDirectory};
pub use memory::MemoryDirectory;
pub use tracked_issue::{IssueState, TrackedIssue};

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Issue tracker operations used by the reconciler.
///
/// Implementations must not cache results between calls: the tracker can change
/// out of band (manual closes, concurrent deliveries) and every reconciliation
/// relies on seeing its current state.
#[async_trait]
pub trait IssueDirectory: Send + Sync {
    /// Lists every open issue, following pagination to the end.
    async fn list_open_issues(&self) -> Result<Vec<TrackedIssue>, DirectoryError>;

    /// Creates an open issue.
    async fn create_issue(&self, title: &str, body: &str) -> Result<TrackedIssue, DirectoryError>;

    /// Sets an issue's state to closed.
    async fn close_issue(&self, issue: &TrackedIssue) -> Result<(), DirectoryError>;
}

/// Runs a tracker call, failing with [`DirectoryError::Timeout`] after `after`.
pub(crate) async fn with_timeout<T, F>(
    operation: &'static str,
    after: Duration,
    future: F,
) -> Result<T, DirectoryError>
where
    F: Future<Output = Result<T, DirectoryError>>,
{
    tokio::time::timeout(after, future)
        .await
        .map_err(|_| DirectoryError::Timeout { operation, after })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_timeout_passes_result_through() {
        let result = with_timeout("list_open_issues", Duration::from_secs(5), async {
            Ok::<_, DirectoryError>(42)
        })
        .await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn with_timeout_reports_slow_calls() {
        let result = with_timeout(
            "create_issue",
            Duration::from_millis(10),
            std::future::pending::<Result<(), DirectoryError>>(),
        )
        .await;

        assert!(matches!(
            result,
            Err(DirectoryError::Timeout {
                operation: "create_issue",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn with_timeout_keeps_inner_error() {
        let result = with_timeout("close_issue", Duration::from_secs(5), async {
            Err::<(), _>(DirectoryError::NotFound { number: 3 })
        })
        .await;

        assert!(matches!(result, Err(DirectoryError::NotFound { number: 3 })));
    }
}
