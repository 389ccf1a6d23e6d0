use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use shelldrop_protocol::TransferConfig;

use crate::TransferError;

// ---------------------------------------------------------------------------
// Encoding helpers
// ---------------------------------------------------------------------------

/// Encodes raw bytes into the transport alphabet (standard base64).
pub fn encode(raw: &[u8]) -> String {
    STANDARD.encode(raw)
}

/// Inverse of [`encode`].
pub fn decode(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(encoded)
}

/// Computes SHA-256 of `data` and returns the hex-encoded digest.
pub fn checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// EncodedPayload
// ---------------------------------------------------------------------------

/// A payload encoded and partitioned into Parts and SubChunks.
///
/// Partitioning is a pure function of the bytes and the two sizes, so the
/// same file encoded with the same sizes always yields identical Parts.
#[derive(Debug, Clone)]
pub struct EncodedPayload {
    encoded: String,
    payload_len: usize,
    digest: String,
    part_size: usize,
    sub_size: usize,
}

impl EncodedPayload {
    /// Encodes `raw` using the Part and SubChunk sizes from `config`.
    pub fn new(raw: &[u8], config: &TransferConfig) -> Result<Self, TransferError> {
        if config.part_size == 0 {
            return Err(TransferError::InvalidConfig("part_size must be at least 1".into()));
        }
        if config.sub_size == 0 {
            return Err(TransferError::InvalidConfig("sub_size must be at least 1".into()));
        }

        Ok(Self {
            encoded: encode(raw),
            payload_len: raw.len(),
            digest: checksum_bytes(raw),
            part_size: config.part_size,
            sub_size: config.sub_size,
        })
    }

    /// Reads and encodes the file at `path`.
    pub fn load(path: &Path, config: &TransferConfig) -> Result<Self, TransferError> {
        if path.as_os_str().is_empty() {
            return Err(TransferError::LocalInput {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty path"),
            });
        }

        let raw = std::fs::read(path).map_err(|source| TransferError::LocalInput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(&raw, config)
    }

    /// The whole encoded stream.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Length of the encoded stream in characters.
    pub fn encoded_len(&self) -> usize {
        self.encoded.len()
    }

    /// Size of the raw payload in bytes.
    pub fn payload_len(&self) -> usize {
        self.payload_len
    }

    /// SHA-256 hex digest of the raw payload.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn part_size(&self) -> usize {
        self.part_size
    }

    pub fn sub_size(&self) -> usize {
        self.sub_size
    }

    /// `ceil(encoded_len / part_size)`.
    pub fn total_parts(&self) -> usize {
        self.encoded.len().div_ceil(self.part_size)
    }

    /// Returns Part `index`, or `None` past the end.
    pub fn part(&self, index: usize) -> Option<Part<'_>> {
        let start = index.checked_mul(self.part_size)?;
        if start >= self.encoded.len() {
            return None;
        }
        let end = (start + self.part_size).min(self.encoded.len());
        Some(Part {
            index,
            text: &self.encoded[start..end],
            sub_size: self.sub_size,
        })
    }

    /// All Parts in index order.
    pub fn parts(&self) -> impl Iterator<Item = Part<'_>> {
        (0..self.total_parts()).filter_map(|i| self.part(i))
    }
}

// ---------------------------------------------------------------------------
// Part
// ---------------------------------------------------------------------------

/// One resumable unit of the encoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part<'a> {
    /// Zero-based Part index.
    pub index: usize,
    /// Encoded characters of this Part.
    pub text: &'a str,
    sub_size: usize,
}

impl<'a> Part<'a> {
    /// SubChunks of this Part, in order.
    pub fn sub_chunks(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        let text = self.text;
        let sub_size = self.sub_size;
        // The base64 alphabet is ASCII, so byte offsets are char boundaries.
        (0..text.len())
            .step_by(sub_size)
            .map(move |start| &text[start..(start + sub_size).min(text.len())])
    }

    /// Number of SubChunks in this Part.
    pub fn sub_count(&self) -> usize {
        self.text.len().div_ceil(self.sub_size)
    }
}
