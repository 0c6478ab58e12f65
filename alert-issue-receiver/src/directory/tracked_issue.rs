//! Tracked issue information.

use serde::Serialize;

/// State of an issue in the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

/// Read projection of an issue owned by the tracker.
///
/// Fetched fresh for every reconciliation and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedIssue {
    /// Issue number, used as the handle for updates.
    pub number: u64,

    /// Issue title; compared against the alert group identity.
    pub title: String,

    /// Open or closed.
    pub state: IssueState,

    /// Link to the issue in the tracker's web UI.
    pub url: String,
}

impl From<octocrab::models::issues::Issue> for TrackedIssue {
    fn from(issue: octocrab::models::issues::Issue) -> Self {
        let state = match issue.state {
            octocrab::models::IssueState::Open => IssueState::Open,
            _ => IssueState::Closed,
        };

        Self {
            number: issue.number,
            title: issue.title,
            state,
            url: issue.html_url.to_string(),
        }
    }
}
