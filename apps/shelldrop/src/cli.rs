//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Listens for a reverse shell, optionally uploads a file through it, then
/// hands the shell to the terminal.
#[derive(Parser, Debug)]
#[command(name = "shelldrop", author, version, about)]
pub struct Cli {
    /// Port to listen on
    #[arg(short, long)]
    pub port: u16,

    /// Address to bind (default from config: 0.0.0.0)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Local file to upload (requires --remote)
    #[arg(short = 'f', long = "file", requires = "remote")]
    pub file: Option<PathBuf>,

    /// Destination path on the remote host (requires --file)
    #[arg(short = 'r', long = "remote", requires = "file")]
    pub remote: Option<String>,

    /// Part to start from; prompts when omitted and stdin is a terminal
    #[arg(long, allow_negative_numbers = true)]
    pub resume: Option<i64>,

    /// Configuration file (default: ~/.config/shelldrop/shelldrop.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Encoded characters per Part
    #[arg(long)]
    pub part_size: Option<usize>,

    /// Encoded characters per append command
    #[arg(long)]
    pub sub_size: Option<usize>,

    /// Acknowledgment timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Delay between append commands in milliseconds
    #[arg(long)]
    pub pacing_ms: Option<u64>,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }
        let transfer = &mut config.transfer;
        if let Some(v) = self.part_size {
            transfer.part_size = v;
        }
        if let Some(v) = self.sub_size {
            transfer.sub_size = v;
        }
        if let Some(v) = self.timeout {
            transfer.ack_timeout_secs = v;
        }
        if let Some(v) = self.pacing_ms {
            transfer.pacing_ms = v;
        }
    }

    /// Local file and remote destination, when an upload was requested.
    pub fn upload_target(&self) -> Option<(&PathBuf, &str)> {
        match (&self.file, &self.remote) {
            (Some(file), Some(remote)) => Some((file, remote.as_str())),
            _ => None,
        }
    }
}
