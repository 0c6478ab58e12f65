//! CLI for the Alertmanager GitHub issue receiver.
//!
//! This tool listens for Alertmanager webhook notifications and keeps one GitHub
//! issue open per firing alert group.

use alert_issue_receiver::{
    install_crypto_provider, Receiver, ReceiverConfig, ReceiverError, SummarySnapshot,
};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// GitHub Receiver - Open and close GitHub issues from Alertmanager notifications.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Repository owner; usually the GitHub organization.
    #[arg(long, env = "GITHUB_OWNER")]
    github_owner: String,

    /// Repository that holds the alert issues.
    #[arg(long, env = "GITHUB_REPO")]
    github_repo: String,

    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:5100")]
    listen: SocketAddr,

    /// Timeout in seconds for each GitHub API call.
    #[arg(long, default_value_t = 10)]
    request_timeout_secs: u64,

    /// Largest accepted webhook body in bytes.
    #[arg(long, default_value_t = 1024 * 1024)]
    max_body_bytes: usize,

    /// Path to a Handlebars template for issue bodies.
    #[arg(long)]
    issue_template: Option<PathBuf>,

    /// List issues but only log the creates and closes that would happen.
    #[arg(long)]
    dry_run: bool,

    /// Let notifications for the same alert group reconcile concurrently.
    #[arg(long)]
    disable_identity_lock: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Required before octocrab builds its rustls connector.
    install_crypto_provider();

    // Initialize tracing
    init_tracing();

    // Parse arguments
    let args = Args::parse();

    // Run the main logic
    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::from(0)
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Builds the configuration from parsed arguments.
fn build_config(args: Args) -> ReceiverConfig {
    let mut config = ReceiverConfig::new(args.github_owner, args.github_repo, args.token)
        .with_listen_addr(args.listen)
        .with_request_timeout(Duration::from_secs(args.request_timeout_secs))
        .with_max_body_bytes(args.max_body_bytes)
        .with_dry_run(args.dry_run)
        .with_identity_lock(!args.disable_identity_lock);
    if let Some(path) = args.issue_template {
        config = config.with_issue_template_path(path);
    }
    config
}

/// Main execution logic. Serves until Ctrl-C.
async fn run(args: Args) -> Result<SummarySnapshot, ReceiverError> {
    let config = build_config(args);
    let receiver = Arc::new(Receiver::from_config(&config)?);

    receiver
        .clone()
        .serve(config.listen_addr(), shutdown_signal())
        .await?;

    Ok(receiver.summary())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Prints the outcome tallies at shutdown.
fn print_summary(summary: &SummarySnapshot) {
    println!("\nSummary:");
    println!("  Notifications reconciled: {}", summary.total());
    println!("  Issues created: {}", summary.created);
    println!("  Already open: {}", summary.already_open);
    println!("  Issues closed: {}", summary.closed);
    println!("  Nothing to close: {}", summary.nothing_to_close);
    println!("  Failed: {}", summary.failed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_fill_config() {
        let args = Args::try_parse_from([
            "github-receiver",
            "--github-owner",
            "acme",
            "--github-repo",
            "alerts",
            "--token",
            "secret",
            "--listen",
            "127.0.0.1:9000",
            "--request-timeout-secs",
            "3",
            "--dry-run",
            "--disable-identity-lock",
        ])
        .unwrap();

        let config = build_config(args);

        assert_eq!(config.owner(), "acme");
        assert_eq!(config.repo(), "alerts");
        assert_eq!(config.listen_addr().port(), 9000);
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert!(config.dry_run());
        assert!(!config.identity_lock());
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn receiver_builds_from_config() {
        install_crypto_provider();
        let args = Args::try_parse_from([
            "github-receiver",
            "--github-owner",
            "acme",
            "--github-repo",
            "alerts",
            "--token",
            "token",
        ])
        .unwrap();

        let receiver = Receiver::from_config(&build_config(args));

        assert!(receiver.is_ok());
    }

    #[test]
    fn args_are_verified() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
