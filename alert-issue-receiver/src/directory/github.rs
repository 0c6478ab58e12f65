//! GitHub-backed issue directory.

use super::{with_timeout, DirectoryError, IssueDirectory, TrackedIssue};
use async_trait::async_trait;
use octocrab::models::issues::Issue;
use octocrab::models::IssueState as GitHubIssueState;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::{params, Octocrab};
use std::time::Duration;
use tracing::{debug, info};

/// Results per page when listing issues.
const RESULTS_PER_PAGE: u8 = 100;

/// Installs aws-lc-rs as the process-wide rustls crypto provider.
///
/// rustls refuses to guess when more than one backend is compiled in, and octocrab
/// pulls in ring by default. Safe to call more than once.
pub fn install_crypto_provider() {
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// Builds an authenticated GitHub client with transport retries disabled.
///
/// `base_uri` overrides the API endpoint, e.g. for GitHub Enterprise.
///
/// # Errors
///
/// Returns an error if `base_uri` is not a valid URI or the client cannot be built.
pub fn build_client(token: &str, base_uri: Option<&str>) -> Result<Octocrab, DirectoryError> {
    install_crypto_provider();

    // Alertmanager redelivers; a failed call is reported, not repeated.
    let mut builder = Octocrab::builder().add_retry_config(RetryConfig::None);
    if let Some(base_uri) = base_uri {
        builder = builder.base_uri(base_uri)?;
    }

    Ok(builder.personal_token(token.to_string()).build()?)
}

/// Issue directory backed by a single GitHub repository.
#[derive(Clone)]
pub struct GitHubDirectory {
    octocrab: Octocrab,
    owner: String,
    repo: String,
    timeout: Duration,
}

impl GitHubDirectory {
    /// Creates a directory for `owner/repo` using an authenticated client.
    ///
    /// Every tracker call is abandoned after `timeout`.
    pub fn new(
        octocrab: Octocrab,
        owner: impl Into<String>,
        repo: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            octocrab,
            owner: owner.into(),
            repo: repo.into(),
            timeout,
        }
    }

    /// Builds an authenticated client from a personal access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the GitHub client cannot be constructed.
    pub fn with_token(
        token: &str,
        owner: impl Into<String>,
        repo: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DirectoryError> {
        let octocrab = build_client(token, None)?;
        Ok(Self::new(octocrab, owner, repo, timeout))
    }

    /// Returns the repository in "owner/repo" format.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Lists open issues, following every result page.
    async fn fetch_open_issues(&self) -> Result<Vec<TrackedIssue>, DirectoryError> {
        let first_page = self
            .octocrab
            .issues(&self.owner, &self.repo)
            .list()
            .state(params::State::Open)
            .per_page(RESULTS_PER_PAGE)
            .send()
            .await?;

        let mut issues = Vec::new();
        let mut next_page = Some(first_page);

        while let Some(page) = next_page {
            next_page = self.octocrab.get_page::<Issue>(&page.next).await?;

            // The issues endpoint also returns pull requests.
            issues.extend(
                page.items
                    .into_iter()
                    .filter(|issue| issue.pull_request.is_none())
                    .map(TrackedIssue::from),
            );
        }

        Ok(issues)
    }
}

#[async_trait]
impl IssueDirectory for GitHubDirectory {
    async fn list_open_issues(&self) -> Result<Vec<TrackedIssue>, DirectoryError> {
        debug!(repo = %self.full_name(), "Listing open issues");

        let issues =
            with_timeout("list_open_issues", self.timeout, self.fetch_open_issues()).await?;

        for issue in &issues {
            debug!(issue_number = issue.number, title = %issue.title, "Open issue");
        }
        info!(repo = %self.full_name(), count = issues.len(), "Listed open issues");
        Ok(issues)
    }

    async fn create_issue(&self, title: &str, body: &str) -> Result<TrackedIssue, DirectoryError> {
        info!(repo = %self.full_name(), title = %title, "Creating issue");

        let issue = with_timeout("create_issue", self.timeout, async {
            let issue = self
                .octocrab
                .issues(&self.owner, &self.repo)
                .create(title)
                .body(body)
                .send()
                .await?;
            Ok::<_, DirectoryError>(issue)
        })
        .await?;

        let issue = TrackedIssue::from(issue);
        info!(issue_number = issue.number, url = %issue.url, "Created issue");
        Ok(issue)
    }

    async fn close_issue(&self, issue: &TrackedIssue) -> Result<(), DirectoryError> {
        info!(
            repo = %self.full_name(),
            issue_number = issue.number,
            title = %issue.title,
            "Closing issue"
        );

        with_timeout("close_issue", self.timeout, async {
            self.octocrab
                .issues(&self.owner, &self.repo)
                .update(issue.number)
                .state(GitHubIssueState::Closed)
                .send()
                .await?;
            Ok::<_, DirectoryError>(())
        })
        .await?;

        info!(issue_number = issue.number, "Closed issue");
        Ok(())
    }
}
