//! Receiver configuration.
//!
//! Settings are supplied once at start-up and never change afterwards.

mod error;

pub use error::ConfigError;

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default listen address.
pub const DEFAULT_LISTEN_ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED),
    5100,
);

/// Default bound on each issue tracker call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default limit on webhook request bodies (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Configuration for running the receiver.
#[derive(Clone)]
pub struct ReceiverConfig {
    /// Repository owner (user or organization).
    owner: String,
    /// Repository that holds the alert issues.
    repo: String,
    /// GitHub token used for API calls.
    token: String,
    /// Address the HTTP listener binds to.
    listen_addr: SocketAddr,
    /// Bound on each issue tracker call.
    request_timeout: Duration,
    /// Largest accepted webhook body.
    max_body_bytes: usize,
    /// Custom issue body template.
    issue_template_path: Option<PathBuf>,
    /// Whether to log issue changes instead of making them.
    dry_run: bool,
    /// Whether to serialize reconciliations per identity.
    identity_lock: bool,
}

impl ReceiverConfig {
    /// Creates a configuration with default listener and limits.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
            listen_addr: DEFAULT_LISTEN_ADDR,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            issue_template_path: None,
            dry_run: false,
            identity_lock: true,
        }
    }

    /// Sets the listen address.
    #[must_use]
    pub fn with_listen_addr(mut self, listen_addr: SocketAddr) -> Self {
        self.listen_addr = listen_addr;
        self
    }

    /// Sets the bound on each issue tracker call.
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Sets the largest accepted webhook body.
    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Sets a custom issue body template file.
    #[must_use]
    pub fn with_issue_template_path(mut self, path: PathBuf) -> Self {
        self.issue_template_path = Some(path);
        self
    }

    /// Enables or disables dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enables or disables per-identity locking.
    #[must_use]
    pub fn with_identity_lock(mut self, identity_lock: bool) -> Self {
        self.identity_lock = identity_lock;
        self
    }

    /// Returns the repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Returns the configured GitHub token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the listen address.
    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    /// Returns the bound on each issue tracker call.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the largest accepted webhook body.
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Returns the custom issue template path, if any.
    pub fn issue_template_path(&self) -> Option<&Path> {
        self.issue_template_path.as_deref()
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns whether per-identity locking is enabled.
    pub fn identity_lock(&self) -> bool {
        self.identity_lock
    }

    /// Checks that every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("owner", &self.owner),
            ("repo", &self.repo),
            ("token", &self.token),
        ];
        for (setting, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    setting,
                    message: "must not be empty".to_string(),
                });
            }
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError {
                setting: "request_timeout",
                message: "must be greater than zero".to_string(),
            });
        }

        if self.max_body_bytes == 0 {
            return Err(ConfigError::ValidationError {
                setting: "max_body_bytes",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Reads the custom issue template, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be read.
    pub fn load_issue_template(&self) -> Result<Option<String>, ConfigError> {
        let Some(path) = &self.issue_template_path else {
            return Ok(None);
        };

        debug!(path = %path.display(), "Loading issue template");
        let template = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Some(template))
    }
}

impl fmt::Debug for ReceiverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiverConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .field("listen_addr", &self.listen_addr)
            .field("request_timeout", &self.request_timeout)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("issue_template_path", &self.issue_template_path)
            .field("dry_run", &self.dry_run)
            .field("identity_lock", &self.identity_lock)
            .finish()
    }
}
