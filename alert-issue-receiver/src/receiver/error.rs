//! Receiver error types.

use std::net::SocketAddr;

/// Errors that can occur while building or running the receiver.
#[derive(Debug, thiserror::Error)]
pub enum ReceiverError {
    /// Configuration is invalid or a configured file cannot be read.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Custom issue template does not compile.
    #[error(transparent)]
    Template(#[from] crate::templates::TemplateError),

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Directory(#[from] crate::directory::DirectoryError),

    /// Listener could not bind.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Server stopped with an I/O error.
    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),
}
