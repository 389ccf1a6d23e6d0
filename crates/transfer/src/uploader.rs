//! Session orchestrator: drives one upload through a [`CommandChannel`].
//!
//! ```text
//! Init -> RemoteCleanup -> PartLoop{SubChunkLoop} -> Reassemble -> Decode -> Finalize -> Done
//!   \__________________________ any stall or validation error ______________________/-> Failed
//! ```
//!
//! Exactly one command/acknowledgment round-trip is outstanding at any
//! time. A stall ends the session; recovery is a new session resumed at
//! the Part that stalled.

use std::path::Path;
use std::time::Duration;

use shelldrop_channel::CommandChannel;
use shelldrop_protocol::{RemoteLayout, TransferConfig, commands};
use tracing::{debug, error, info, warn};

use crate::TransferError;
use crate::encoder::EncodedPayload;
use crate::progress::ProgressReporter;
use crate::types::{SessionState, StallLocation, TransferReport, TransferSession};
use crate::validation::{validate_config, validate_remote_path, validate_resume_offset};

/// Uploads one payload to one remote path.
pub struct Uploader<'a, C: CommandChannel> {
    channel: &'a mut C,
    config: TransferConfig,
    progress: ProgressReporter,
    clear_on_finish: bool,
    session: Option<TransferSession>,
}

impl<'a, C: CommandChannel> Uploader<'a, C> {
    /// Creates an uploader with a hidden progress reporter.
    pub fn new(channel: &'a mut C, config: TransferConfig) -> Self {
        Self {
            channel,
            config,
            progress: ProgressReporter::hidden(),
            clear_on_finish: true,
            session: None,
        }
    }

    /// Replaces the progress reporter.
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Whether to clear the remote terminal after a successful upload.
    pub fn with_clear_on_finish(mut self, clear: bool) -> Self {
        self.clear_on_finish = clear;
        self
    }

    /// State of the last session started by this uploader.
    pub fn session(&self) -> Option<&TransferSession> {
        self.session.as_ref()
    }

    /// Reads, encodes and uploads the file at `local_path`.
    pub async fn upload_file(
        &mut self,
        local_path: &Path,
        remote_path: &str,
        resume_offset: i64,
    ) -> Result<TransferReport, TransferError> {
        let loaded = tokio::task::spawn_blocking({
            let path = local_path.to_path_buf();
            let config = self.config.clone();
            move || EncodedPayload::load(&path, &config)
        })
        .await
        .map_err(|e| TransferError::LocalInput {
            path: local_path.to_path_buf(),
            source: std::io::Error::other(e),
        })
        .and_then(|loaded| loaded);

        let payload = match loaded {
            Ok(payload) => payload,
            Err(e) => return Err(self.reject(0, e)),
        };

        self.upload(&payload, remote_path, resume_offset).await
    }

    /// Uploads `payload` to `remote_path`, starting at Part `resume_offset`.
    ///
    /// `resume_offset == 0` wipes any earlier attempt on the remote side.
    /// A larger offset keeps the Part files already in the scratch
    /// directory and trusts them without re-checking.
    ///
    /// Validation failures return before any command is sent and leave a
    /// `Failed` session with no progress behind.
    pub async fn upload(
        &mut self,
        payload: &EncodedPayload,
        remote_path: &str,
        resume_offset: i64,
    ) -> Result<TransferReport, TransferError> {
        let total_parts = payload.total_parts();
        let start = match self.validate(remote_path, resume_offset, total_parts) {
            Ok(start) => start,
            Err(e) => return Err(self.reject(total_parts, e)),
        };

        let layout = RemoteLayout::new(remote_path, total_parts);
        let mut session = TransferSession::new(
            start,
            total_parts,
            self.config.ack_timeout(),
            &self.config.ack_token,
        );
        session.start();
        debug!(
            token = session.ack_token(),
            timeout = ?session.ack_timeout(),
            "acknowledgment settings"
        );

        info!(
            bytes = payload.payload_len(),
            encoded = payload.encoded_len(),
            parts = total_parts,
            start,
            remote = %remote_path,
            sha256 = %payload.digest(),
            "starting upload"
        );

        let result = self.run(payload, &layout, &mut session).await;

        match &result {
            Ok(()) => {
                session.complete();
                info!(elapsed = ?session.elapsed(), "upload completed");
            }
            Err(e) => {
                self.progress.abandon();
                session.fail(&e.to_string());
                error!(
                    error = %e,
                    completed = session.completed_parts(),
                    parts = total_parts,
                    "upload failed"
                );
            }
        }

        let report = TransferReport {
            total_parts,
            resumed_from: start,
            payload_bytes: payload.payload_len(),
            encoded_len: payload.encoded_len(),
            elapsed: session.elapsed(),
        };
        self.session = Some(session);
        result.map(|()| report)
    }

    fn validate(
        &self,
        remote_path: &str,
        resume_offset: i64,
        total_parts: usize,
    ) -> Result<usize, TransferError> {
        validate_config(&self.config)?;
        validate_remote_path(remote_path)?;
        validate_resume_offset(resume_offset, total_parts)
    }

    /// Records a session that failed in `Init`, before any command.
    fn reject(&mut self, total_parts: usize, err: TransferError) -> TransferError {
        let mut session = TransferSession::new(
            0,
            total_parts,
            self.config.ack_timeout(),
            &self.config.ack_token,
        );
        session.fail(&err.to_string());
        error!(error = %err, "upload rejected");
        self.session = Some(session);
        err
    }

    async fn run(
        &mut self,
        payload: &EncodedPayload,
        layout: &RemoteLayout,
        session: &mut TransferSession,
    ) -> Result<(), TransferError> {
        let total_parts = session.total_parts();
        let start = session.resume_offset();
        let timeout = session.ack_timeout();

        // -- RemoteCleanup --
        session.enter(SessionState::RemoteCleanup);
        if let Some(parent) = layout.parent_dir() {
            self.ack(
                timeout,
                &commands::make_dir(parent),
                StallLocation::Step("create destination directory"),
            )
            .await?;
        }
        if start == 0 {
            self.ack(
                timeout,
                &commands::remove_all(&[
                    layout.scratch_dir(),
                    layout.merged_file(),
                    layout.target(),
                ]),
                StallLocation::Step("remove previous upload"),
            )
            .await?;
        }
        self.ack(
            timeout,
            &commands::make_dir(layout.scratch_dir()),
            StallLocation::Step("create scratch directory"),
        )
        .await?;

        // -- PartLoop --
        session.enter(SessionState::PartLoop);
        self.progress.update(start, total_parts);
        let pacing = self.config.pacing();

        for part in payload.parts().skip(start) {
            let part_file = layout.part_file(part.index);
            session.begin_part(part.index);

            // A previous attempt may have left this Part half written.
            self.ack(
                timeout,
                &commands::remove_file(&part_file),
                StallLocation::Part(part.index),
            )
            .await?;

            for (sub, chunk) in part.sub_chunks().enumerate() {
                session.begin_sub(sub);
                self.ack(
                    timeout,
                    &commands::append(chunk, &part_file),
                    StallLocation::SubChunk {
                        part: part.index,
                        sub,
                    },
                )
                .await?;

                if !pacing.is_zero() {
                    tokio::time::sleep(pacing).await;
                }
            }

            session.complete_part(part.index);
            self.progress.update(session.completed_parts(), total_parts);
            debug!(part = part.index, subs = part.sub_count(), "part uploaded");
        }
        self.progress.finish();

        // -- Reassemble --
        session.enter(SessionState::Reassemble);
        self.ack(
            timeout,
            &commands::concat_parts(layout),
            StallLocation::Step("reassemble"),
        )
        .await?;

        // -- Decode --
        session.enter(SessionState::Decode);
        let decode = commands::decode(layout, &self.config.fallback_decoder);
        self.ack(timeout, &decode, StallLocation::Step("decode")).await?;

        // -- Finalize --
        session.enter(SessionState::Finalize);
        self.ack(
            timeout,
            &commands::make_executable(layout.target()),
            StallLocation::Step("set execute permission"),
        )
        .await?;
        self.ack(
            timeout,
            &commands::remove_all(&[layout.scratch_dir(), layout.merged_file()]),
            StallLocation::Step("remove scratch files"),
        )
        .await?;

        if self.clear_on_finish {
            let clear = commands::clear_screen();
            if let Err(e) = self.channel.send_and_await_ack(&clear, timeout).await {
                warn!(error = %e, "clearing remote terminal failed");
            }
        }

        Ok(())
    }

    /// One acknowledged round-trip; a missing acknowledgment is fatal.
    async fn ack(
        &mut self,
        timeout: Duration,
        command: &str,
        location: StallLocation,
    ) -> Result<(), TransferError> {
        self.channel
            .send_and_await_ack(command, timeout)
            .await
            .map_err(|source| TransferError::Stalled { location, source })
    }
}
