use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ACK_TIMEOUT, DEFAULT_ACK_TOKEN, DEFAULT_FALLBACK_DECODER, DEFAULT_PACING,
    DEFAULT_PART_SIZE, DEFAULT_SUB_SIZE,
};

/// Tunables of one transfer.
///
/// `part_size` and `sub_size` must stay the same across the attempts of a
/// resumed transfer, otherwise Part files already on the remote side no
/// longer line up with the local partitioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Encoded characters per Part.
    pub part_size: usize,
    /// Encoded characters per SubChunk (one append command).
    pub sub_size: usize,
    /// Delay between SubChunk sends, in milliseconds.
    pub pacing_ms: u64,
    /// Acknowledgment timeout per round-trip, in seconds.
    pub ack_timeout_secs: u64,
    /// Sentinel the remote side echoes after each command.
    pub ack_token: String,
    /// Decoder command used when `base64 -d` fails remotely.
    pub fallback_decoder: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            part_size: DEFAULT_PART_SIZE,
            sub_size: DEFAULT_SUB_SIZE,
            pacing_ms: DEFAULT_PACING.as_millis() as u64,
            ack_timeout_secs: DEFAULT_ACK_TIMEOUT.as_secs(),
            ack_token: DEFAULT_ACK_TOKEN.into(),
            fallback_decoder: DEFAULT_FALLBACK_DECODER.into(),
        }
    }
}

impl TransferConfig {
    /// Pacing delay as a [`Duration`].
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Acknowledgment timeout as a [`Duration`].
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_secs(self.ack_timeout_secs)
    }
}
