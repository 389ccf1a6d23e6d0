//! Waits for the remote shell to connect back.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tracing::info;

use crate::error::ChannelError;

/// TCP listener that hands out exactly one connection.
pub struct ShellListener {
    listener: TcpListener,
}

impl ShellListener {
    /// Binds `addr` (`host:port`).
    pub async fn bind(addr: &str) -> Result<Self, ChannelError> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "listening for shell");
        Ok(Self { listener })
    }

    /// Address actually bound (useful when binding port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, ChannelError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts a single connection and closes the listener.
    pub async fn accept(self) -> Result<(TcpStream, SocketAddr), ChannelError> {
        let (stream, peer) = self.listener.accept().await?;
        // Commands are small and latency-bound.
        stream.set_nodelay(true)?;
        info!(%peer, "shell connected");
        Ok((stream, peer))
    }
}
