//! The command/acknowledgment contract the uploader is written against.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::ChannelError;

/// A boxed future returned by channel methods.
pub type ChannelFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ChannelError>> + Send + 'a>>;

/// One remote command session.
///
/// The remote interpreter is assumed to execute commands strictly in the
/// order received, one at a time. Nothing here detects reordering or
/// duplicated execution.
pub trait CommandChannel: Send {
    /// Writes `command` as one line. Does not wait for anything.
    fn send<'a>(&'a mut self, command: &'a str) -> ChannelFuture<'a, ()>;

    /// Writes `command`, then a command that echoes the acknowledgment
    /// sentinel, and waits up to `timeout` for the sentinel to appear.
    ///
    /// Success means the remote side finished executing `command`, not
    /// that the command itself succeeded.
    fn send_and_await_ack<'a>(
        &'a mut self,
        command: &'a str,
        timeout: Duration,
    ) -> ChannelFuture<'a, ()>;
}
