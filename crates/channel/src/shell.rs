//! [`CommandChannel`] over a raw shell byte stream.

use std::time::Duration;

use shelldrop_protocol::commands;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::READ_BUFFER_SIZE;
use crate::command::{ChannelFuture, CommandChannel};
use crate::error::ChannelError;
use crate::scanner::SentinelScanner;

/// Drives a remote shell reached over `S` (usually a `TcpStream`).
///
/// This is the only component that reads from or writes to the stream.
/// Shell output other than the sentinel is discarded.
pub struct ShellChannel<S> {
    stream: S,
    scanner: SentinelScanner,
    ack_command: String,
    buf: Vec<u8>,
}

impl<S> ShellChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wraps `stream`, acknowledging commands with `ack_token`.
    pub fn new(stream: S, ack_token: &str) -> Self {
        Self {
            stream,
            scanner: SentinelScanner::new(ack_token),
            ack_command: commands::acknowledge(ack_token),
            buf: vec![0u8; READ_BUFFER_SIZE],
        }
    }

    /// Writes one newline-terminated command.
    pub async fn write_line(&mut self, command: &str) -> Result<(), ChannelError> {
        self.stream.write_all(command.as_bytes()).await?;
        self.stream.write_all(b"\n").await?;
        self.stream.flush().await?;
        trace!(len = command.len(), "command written");
        Ok(())
    }

    /// Waits until the sentinel shows up in the shell output.
    ///
    /// The deadline covers the whole wait, not each individual read.
    pub async fn await_ack(&mut self, timeout: Duration) -> Result<(), ChannelError> {
        match tokio::time::timeout(timeout, self.read_until_ack()).await {
            Ok(result) => result,
            Err(_) => Err(ChannelError::Timeout(timeout)),
        }
    }

    async fn read_until_ack(&mut self) -> Result<(), ChannelError> {
        if self.scanner.take_match() {
            return Ok(());
        }

        loop {
            let n = self.stream.read(&mut self.buf).await?;
            if n == 0 {
                return Err(ChannelError::Closed);
            }
            if self.scanner.feed(&self.buf[..n]) {
                return Ok(());
            }
        }
    }

    /// Command, acknowledgment request and wait, under a single deadline.
    async fn round_trip(&mut self, command: &str) -> Result<(), ChannelError> {
        self.write_line(command).await?;
        let ack = self.ack_command.clone();
        self.write_line(&ack).await?;
        self.read_until_ack().await
    }

    /// Returns the stream and any shell output read but not consumed.
    pub fn into_parts(self) -> (S, Vec<u8>) {
        (self.stream, self.scanner.into_pending())
    }
}

impl<S> CommandChannel for ShellChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn send<'a>(&'a mut self, command: &'a str) -> ChannelFuture<'a, ()> {
        Box::pin(async move { self.write_line(command).await })
    }

    fn send_and_await_ack<'a>(
        &'a mut self,
        command: &'a str,
        timeout: Duration,
    ) -> ChannelFuture<'a, ()> {
        Box::pin(async move {
            // A remote that stops reading blocks the writes too.
            match tokio::time::timeout(timeout, self.round_trip(command)).await {
                Ok(result) => result,
                Err(_) => Err(ChannelError::Timeout(timeout)),
            }
        })
    }
}
