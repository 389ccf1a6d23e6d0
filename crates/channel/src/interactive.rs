//! Hands the connection over to the local terminal once the upload is done.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ChannelError;

/// Bridges the remote shell to this process's stdin/stdout.
///
/// `pending` is shell output the channel read but did not consume; it is
/// written first so nothing the remote printed is lost.
pub async fn interactive<S>(stream: S, pending: &[u8]) -> Result<(), ChannelError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let mut stdout = tokio::io::stdout();
    bridge(stream, pending, tokio::io::stdin(), &mut stdout).await
}

/// Pumps `input` to the remote and remote output to `output`.
///
/// Local EOF shuts down the remote write half and keeps draining output
/// until the remote closes, which is how a shell sees Ctrl-D.
pub async fn bridge<S, I, O>(
    stream: S,
    pending: &[u8],
    mut input: I,
    output: &mut O,
) -> Result<(), ChannelError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
    I: AsyncRead + Unpin + Send + 'static,
    O: AsyncWrite + Unpin,
{
    output.write_all(pending).await?;
    output.flush().await?;

    let (mut reader, mut writer) = tokio::io::split(stream);
    let cancel = CancellationToken::new();

    let upstream = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Ok(0),
                result = tokio::io::copy(&mut input, &mut writer) => {
                    let sent = result?;
                    writer.shutdown().await?;
                    debug!(bytes = sent, "local input closed");
                    Ok::<u64, std::io::Error>(sent)
                }
            }
        }
    });

    let received = tokio::io::copy(&mut reader, output).await;
    output.flush().await?;

    // The remote is gone; stop waiting on local input.
    cancel.cancel();
    let sent = upstream.await.map_err(std::io::Error::other)??;

    let received = received?;
    debug!(sent, received, "interactive session ended");
    Ok(())
}
