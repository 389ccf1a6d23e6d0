//! Command channel to a remote shell reached over a raw byte stream.
//!
//! The remote side offers nothing but line-oriented command execution:
//! no framing, no replies, no flow control. Every unit of work is
//! therefore followed by a command that echoes a fixed sentinel, and
//! seeing that sentinel in the output is the only proof the work is done.
//!
//! Also provides the two pieces around a session: accepting the inbound
//! connection and handing it to the terminal afterwards.

pub mod command;
pub mod error;
pub mod interactive;
pub mod listener;
pub mod scanner;
pub mod shell;

pub use command::{ChannelFuture, CommandChannel};
pub use error::ChannelError;
pub use interactive::interactive;
pub use listener::ShellListener;
pub use shell::ShellChannel;

/// Read buffer size for shell output.
pub const READ_BUFFER_SIZE: usize = 8 * 1024;
