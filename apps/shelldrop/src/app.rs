//! Application orchestrator: listen, upload, then hand over the shell.

use std::io::{IsTerminal, Write};
use std::path::Path;

use anyhow::{Context, anyhow};
use shelldrop_channel::{ShellChannel, ShellListener, interactive};
use shelldrop_protocol::TransferConfig;
use shelldrop_transfer::{EncodedPayload, ProgressReporter, Uploader};
use tracing::{error, info};

use crate::cli::Cli;
use crate::config::Config;

/// Runs one listen/upload/interactive cycle.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    // -- Payload --
    // Encoded up front so a bad local path fails before anyone connects.
    let upload = match cli.upload_target() {
        Some((local, remote)) => {
            let payload = load_payload(local, &config.transfer).await?;
            info!(
                file = %local.display(),
                bytes = payload.payload_len(),
                parts = payload.total_parts(),
                "payload ready"
            );
            Some((payload, remote.to_string()))
        }
        None => None,
    };

    // -- Listener --
    let listener = ShellListener::bind(&listen_addr(&config.bind, cli.port)).await?;
    let (stream, _peer) = listener.accept().await?;
    let mut channel = ShellChannel::new(stream, &config.transfer.ack_token);

    // -- Upload --
    if let Some((payload, remote)) = upload {
        let resume = match cli.resume {
            Some(part) => part,
            None => prompt_resume(payload.total_parts()).await?,
        };

        let mut uploader = Uploader::new(&mut channel, config.transfer.clone())
            .with_progress(ProgressReporter::stderr())
            .with_clear_on_finish(config.clear_on_finish);

        match uploader.upload(&payload, &remote, resume).await {
            Ok(report) => info!(
                remote = %remote,
                parts = report.total_parts,
                resumed_from = report.resumed_from,
                elapsed = ?report.elapsed,
                "file uploaded"
            ),
            Err(e) => {
                if let Some(part) = e.resume_hint() {
                    error!("resume with --resume {part}");
                }
                return Err(e.into());
            }
        }
    }

    // -- Interactive --
    let (stream, pending) = channel.into_parts();
    info!("entering interactive session");
    interactive(stream, &pending).await?;
    info!("remote shell closed");

    Ok(())
}

async fn load_payload(local: &Path, config: &TransferConfig) -> anyhow::Result<EncodedPayload> {
    let path = local.to_path_buf();
    let config = config.clone();
    let payload = tokio::task::spawn_blocking(move || EncodedPayload::load(&path, &config))
        .await
        .context("payload loader panicked")??;
    Ok(payload)
}

/// `host:port`, bracketing bare IPv6 addresses.
fn listen_addr(bind: &str, port: u16) -> String {
    if bind.contains(':') && !bind.starts_with('[') {
        format!("[{bind}]:{port}")
    } else {
        format!("{bind}:{port}")
    }
}

/// Asks for the starting Part when stdin is a terminal; 0 otherwise.
async fn prompt_resume(total_parts: usize) -> anyhow::Result<i64> {
    if !std::io::stdin().is_terminal() {
        return Ok(0);
    }

    let last = total_parts.saturating_sub(1);
    let answer = tokio::task::spawn_blocking(move || -> std::io::Result<String> {
        let mut stderr = std::io::stderr();
        write!(stderr, "Start upload from which part? (0-{last}) [default: 0]: ")?;
        stderr.flush()?;
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        Ok(line)
    })
    .await
    .context("prompt panicked")??;

    parse_resume(&answer, total_parts)
}

fn parse_resume(answer: &str, total_parts: usize) -> anyhow::Result<i64> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(0);
    }
    answer.parse().map_err(|_| {
        anyhow!(
            "invalid part {answer:?}: expected a number in 0-{}",
            total_parts.saturating_sub(1)
        )
    })
}
