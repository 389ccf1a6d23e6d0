//! Incremental search for the acknowledgment sentinel in shell output.

/// Finds a fixed sentinel in a byte stream that arrives in arbitrary pieces.
///
/// Bytes following a matched sentinel stay buffered for the next search.
/// While no match is found only the last `token.len() - 1` bytes are
/// retained, which is enough to catch a sentinel split across two reads.
#[derive(Debug)]
pub struct SentinelScanner {
    token: Vec<u8>,
    pending: Vec<u8>,
}

impl SentinelScanner {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.as_bytes().to_vec(),
            pending: Vec::new(),
        }
    }

    /// Appends `bytes` and reports whether a sentinel is now complete.
    ///
    /// A match consumes everything up to and including the sentinel.
    pub fn feed(&mut self, bytes: &[u8]) -> bool {
        self.pending.extend_from_slice(bytes);
        self.take_match()
    }

    /// Checks bytes left over from earlier reads without new input.
    pub fn take_match(&mut self) -> bool {
        if self.token.is_empty() {
            return true;
        }

        let n = self.token.len();
        match self.pending.windows(n).position(|w| w == self.token.as_slice()) {
            Some(pos) => {
                self.pending.drain(..pos + n);
                true
            }
            None => {
                let keep = n - 1;
                if self.pending.len() > keep {
                    let excess = self.pending.len() - keep;
                    self.pending.drain(..excess);
                }
                false
            }
        }
    }

    /// Bytes received but not consumed by a match.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Consumes the scanner, returning unconsumed bytes.
    pub fn into_pending(self) -> Vec<u8> {
        self.pending
    }
}
