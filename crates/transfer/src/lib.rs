//! Resumable upload of a local file through an interactive remote shell.
//!
//! The payload is base64-encoded, split into Parts (the unit of resume)
//! and SubChunks (the unit of one command line), and appended to files in
//! a scratch directory next to the target. Every command is followed by
//! an acknowledgment round-trip before the next one is sent.

mod encoder;
mod progress;
mod types;
mod uploader;
mod validation;

use std::path::PathBuf;

use shelldrop_channel::ChannelError;

pub use encoder::{EncodedPayload, Part, checksum_bytes, decode, encode};
pub use progress::{ProgressCallback, ProgressReporter};
pub use types::{SessionState, StallLocation, TransferReport, TransferSession};
pub use uploader::Uploader;
pub use validation::{validate_config, validate_remote_path, validate_resume_offset};

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("cannot read local file {}: {source}", path.display())]
    LocalInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("resume part {offset} out of range (0..{total_parts})")]
    ResumeOutOfRange { offset: i64, total_parts: usize },

    #[error("upload stalled at {location}: {source}")]
    Stalled {
        location: StallLocation,
        #[source]
        source: ChannelError,
    },

    #[error("invalid remote path: {0}")]
    InvalidPath(String),

    #[error("invalid transfer config: {0}")]
    InvalidConfig(String),
}

impl TransferError {
    /// Part a new session should resume from after this error, if any.
    pub fn resume_hint(&self) -> Option<usize> {
        match self {
            Self::Stalled { location, .. } => location.resume_hint(),
            _ => None,
        }
    }
}
