use std::fmt;
use std::time::{Duration, Instant};

/// Phase of a transfer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    RemoteCleanup,
    PartLoop,
    Reassemble,
    Decode,
    Finalize,
    Done,
    Failed,
}

/// Where in the protocol a round-trip stalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StallLocation {
    /// A setup or post-upload command, named by what it does.
    Step(&'static str),
    /// Truncating the file of a Part before its first SubChunk.
    Part(usize),
    /// Appending SubChunk `sub` of Part `part`.
    SubChunk { part: usize, sub: usize },
}

impl StallLocation {
    /// Part index a retry should resume from, if the stall was inside the
    /// Part loop.
    pub fn resume_hint(&self) -> Option<usize> {
        match self {
            Self::Part(part) | Self::SubChunk { part, .. } => Some(*part),
            Self::Step(_) => None,
        }
    }
}

impl fmt::Display for StallLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step(step) => write!(f, "{step}"),
            Self::Part(part) => write!(f, "part {part}"),
            Self::SubChunk { part, sub } => write!(f, "part {part}, sub {sub}"),
        }
    }
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub total_parts: usize,
    pub resumed_from: usize,
    pub payload_bytes: usize,
    pub encoded_len: usize,
    pub elapsed: Duration,
}

/// State of one upload, owned and mutated by the uploader only.
#[derive(Debug, Clone)]
pub struct TransferSession {
    resume_offset: usize,
    total_parts: usize,
    ack_timeout: Duration,
    ack_token: String,
    state: SessionState,
    completed_parts: usize,
    current_part: Option<usize>,
    current_sub: Option<usize>,
    started_at: Option<Instant>,
    completed_at: Option<Instant>,
    error: String,
}

impl TransferSession {
    /// Creates a session in [`SessionState::Init`].
    ///
    /// Parts below `resume_offset` count as already completed.
    pub fn new(
        resume_offset: usize,
        total_parts: usize,
        ack_timeout: Duration,
        ack_token: &str,
    ) -> Self {
        Self {
            resume_offset,
            total_parts,
            ack_timeout,
            ack_token: ack_token.to_string(),
            state: SessionState::Init,
            completed_parts: resume_offset,
            current_part: None,
            current_sub: None,
            started_at: None,
            completed_at: None,
            error: String::new(),
        }
    }

    /// Records the start time.
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Moves to `state`.
    pub fn enter(&mut self, state: SessionState) {
        self.state = state;
    }

    /// Marks Part `index` as the one being written.
    pub fn begin_part(&mut self, index: usize) {
        self.current_part = Some(index);
        self.current_sub = None;
    }

    /// Marks SubChunk `sub` of the current Part as the one being written.
    pub fn begin_sub(&mut self, sub: usize) {
        self.current_sub = Some(sub);
    }

    /// Records Part `index` as fully acknowledged.
    pub fn complete_part(&mut self, index: usize) {
        self.completed_parts = self.completed_parts.max(index + 1);
        self.current_part = None;
        self.current_sub = None;
    }

    /// Marks the session as done.
    pub fn complete(&mut self) {
        self.state = SessionState::Done;
        self.completed_at = Some(Instant::now());
    }

    /// Marks the session as failed with an error message.
    pub fn fail(&mut self, err: &str) {
        self.state = SessionState::Failed;
        self.error = err.to_string();
        self.completed_at = Some(Instant::now());
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn resume_offset(&self) -> usize {
        self.resume_offset
    }

    pub fn total_parts(&self) -> usize {
        self.total_parts
    }

    pub fn ack_timeout(&self) -> Duration {
        self.ack_timeout
    }

    pub fn ack_token(&self) -> &str {
        &self.ack_token
    }

    /// Parts known to be written remotely, including those below the
    /// resume offset.
    pub fn completed_parts(&self) -> usize {
        self.completed_parts
    }

    pub fn current_part(&self) -> Option<usize> {
        self.current_part
    }

    pub fn current_sub(&self) -> Option<usize> {
        self.current_sub
    }

    /// Error message of a failed session (empty otherwise).
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Time since [`start`](Self::start), frozen once the session ends.
    pub fn elapsed(&self) -> Duration {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }
}
