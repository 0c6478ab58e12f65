//! In-process issue directory.

use super::{DirectoryError, IssueDirectory, IssueState, TrackedIssue};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Issue directory that keeps issues in memory.
///
/// Useful for exercising the receiver without a GitHub repository. Mutating calls
/// are counted so callers can check exactly how many creates and closes happened.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    issues: Vec<TrackedIssue>,
    create_calls: usize,
    close_calls: usize,
    unavailable: bool,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an open issue without counting it as a create call.
    pub fn seed_open_issue(&self, title: impl Into<String>) -> TrackedIssue {
        let mut state = self.state();
        let issue = state.push(title.into());
        debug!(issue_number = issue.number, "Seeded open issue");
        issue
    }

    /// Makes every subsequent call fail with [`DirectoryError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    /// Returns every issue, open or closed, in creation order.
    #[must_use]
    pub fn issues(&self) -> Vec<TrackedIssue> {
        self.state().issues.clone()
    }

    /// Returns the open issues in creation order.
    #[must_use]
    pub fn open_issues(&self) -> Vec<TrackedIssue> {
        self.state().open_issues()
    }

    /// Number of successful `create_issue` calls.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.state().create_calls
    }

    /// Number of successful `close_issue` calls.
    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.state().close_calls
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MemoryState {
    fn ensure_available(&self) -> Result<(), DirectoryError> {
        if self.unavailable {
            return Err(DirectoryError::Unavailable(
                "memory directory marked unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn open_issues(&self) -> Vec<TrackedIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.state == IssueState::Open)
            .cloned()
            .collect()
    }

    fn push(&mut self, title: String) -> TrackedIssue {
        let number = self.issues.len() as u64 + 1;
        let issue = TrackedIssue {
            number,
            title,
            state: IssueState::Open,
            url: format!("memory://issues/{number}"),
        };
        self.issues.push(issue.clone());
        issue
    }
}

#[async_trait]
impl IssueDirectory for MemoryDirectory {
    async fn list_open_issues(&self) -> Result<Vec<TrackedIssue>, DirectoryError> {
        let issues = {
            let state = self.state();
            state.ensure_available()?;
            state.open_issues()
        };

        // A real tracker answers after a round trip; let other tasks run meanwhile.
        tokio::task::yield_now().await;
        Ok(issues)
    }

    async fn create_issue(&self, title: &str, _body: &str) -> Result<TrackedIssue, DirectoryError> {
        let mut state = self.state();
        state.ensure_available()?;
        state.create_calls += 1;
        Ok(state.push(title.to_string()))
    }

    async fn close_issue(&self, issue: &TrackedIssue) -> Result<(), DirectoryError> {
        let mut state = self.state();
        state.ensure_available()?;

        let stored = state
            .issues
            .iter_mut()
            .find(|stored| stored.number == issue.number)
            .ok_or(DirectoryError::NotFound {
                number: issue.number,
            })?;
        stored.state = IssueState::Closed;
        state.close_calls += 1;
        Ok(())
    }
}
