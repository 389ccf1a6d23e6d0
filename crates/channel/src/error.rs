//! Error types for the command channel.

use std::time::Duration;

/// Errors produced by the command channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("acknowledgment not received within {0:?}")]
    Timeout(Duration),

    #[error("remote shell closed the connection")]
    Closed,
}
