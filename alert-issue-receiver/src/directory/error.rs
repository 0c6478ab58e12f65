//! Issue directory error types.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the issue tracker.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(octocrab::Error),

    /// GitHub refused the request because the rate limit is exhausted.
    #[error("GitHub rate limit exceeded: {0}")]
    RateLimited(octocrab::Error),

    /// The call did not complete within the configured timeout.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Issue to update does not exist.
    #[error("Issue #{number} not found")]
    NotFound { number: u64 },

    /// Tracker could not be reached.
    #[error("Issue tracker unavailable: {0}")]
    Unavailable(String),
}

impl From<octocrab::Error> for DirectoryError {
    fn from(error: octocrab::Error) -> Self {
        let rate_limited = match &error {
            octocrab::Error::GitHub { source, .. } => {
                is_rate_limit_response(source.status_code.as_u16(), &source.message)
            }
            _ => false,
        };

        if rate_limited {
            Self::RateLimited(error)
        } else {
            Self::GitHubError(error)
        }
    }
}

/// Checks if a GitHub error response indicates an exhausted rate limit.
///
/// GitHub answers an exhausted limit with 429, or with 403 and a message naming the
/// rate limit. A 403 without that message is a permission error.
fn is_rate_limit_response(status: u16, message: &str) -> bool {
    match status {
        429 => true,
        403 => message.to_lowercase().contains("rate limit"),
        _ => false,
    }
}
