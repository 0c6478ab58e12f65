//! Dry-run issue directory.

use super::{DirectoryError, IssueDirectory, IssueState, TrackedIssue};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Wraps a directory so that reads go through and writes are only logged.
pub struct DryRunDirectory {
    inner: Arc<dyn IssueDirectory>,
}

impl DryRunDirectory {
    /// Wraps `inner`.
    pub fn new(inner: Arc<dyn IssueDirectory>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl IssueDirectory for DryRunDirectory {
    async fn list_open_issues(&self) -> Result<Vec<TrackedIssue>, DirectoryError> {
        self.inner.list_open_issues().await
    }

    async fn create_issue(&self, title: &str, body: &str) -> Result<TrackedIssue, DirectoryError> {
        info!(title = %title, body_len = body.len(), "[DRY RUN] Would create issue");
        Ok(TrackedIssue {
            number: 0,
            title: title.to_string(),
            state: IssueState::Open,
            url: String::new(),
        })
    }

    async fn close_issue(&self, issue: &TrackedIssue) -> Result<(), DirectoryError> {
        info!(issue_number = issue.number, title = %issue.title, "[DRY RUN] Would close issue");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryDirectory;

    #[tokio::test]
    async fn reads_pass_through_and_writes_do_not() {
        let memory = Arc::new(MemoryDirectory::new());
        let existing = memory.seed_open_issue("existing");
        let dry_run = DryRunDirectory::new(memory.clone());

        assert_eq!(dry_run.list_open_issues().await.unwrap(), vec![existing.clone()]);

        let created = dry_run.create_issue("new", "body").await.unwrap();
        assert_eq!(created.title, "new");
        dry_run.close_issue(&existing).await.unwrap();

        assert_eq!(memory.create_calls(), 0);
        assert_eq!(memory.close_calls(), 0);
        assert_eq!(memory.open_issues(), vec![existing]);
    }
}
