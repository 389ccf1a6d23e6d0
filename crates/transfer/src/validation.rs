use shelldrop_protocol::TransferConfig;

use crate::TransferError;

/// Checks that `offset` names an existing Part and returns it as an index.
pub fn validate_resume_offset(offset: i64, total_parts: usize) -> Result<usize, TransferError> {
    match usize::try_from(offset) {
        Ok(index) if index < total_parts => Ok(index),
        _ => Err(TransferError::ResumeOutOfRange {
            offset,
            total_parts,
        }),
    }
}

/// Validates that a remote target path can be used in single-line commands.
///
/// Rejects:
/// - Empty paths
/// - Line breaks and NUL bytes (they would split or truncate a command)
/// - Paths naming a directory (`/` suffix, `.` or `..` as last component)
pub fn validate_remote_path(path: &str) -> Result<(), TransferError> {
    if path.is_empty() {
        return Err(TransferError::InvalidPath("empty path".into()));
    }

    if path.contains(['\n', '\r', '\0']) {
        return Err(TransferError::InvalidPath(format!(
            "control character in path: {path:?}"
        )));
    }

    let file_name = path.rsplit('/').next().unwrap_or(path);
    if matches!(file_name, "" | "." | "..") {
        return Err(TransferError::InvalidPath(format!(
            "path names a directory: {path}"
        )));
    }

    Ok(())
}

/// Validates the round-trip settings of a transfer.
///
/// Part and SubChunk sizes are checked when the payload is encoded.
pub fn validate_config(config: &TransferConfig) -> Result<(), TransferError> {
    if config.ack_timeout_secs == 0 {
        return Err(TransferError::InvalidConfig(
            "ack_timeout_secs must be at least 1".into(),
        ));
    }

    if config.ack_token.is_empty() {
        return Err(TransferError::InvalidConfig("ack_token is empty".into()));
    }

    if !config.ack_token.chars().all(|c| c.is_ascii_graphic()) || config.ack_token.contains(['\'', '"']) {
        return Err(TransferError::InvalidConfig(format!(
            "ack_token must be printable ASCII without spaces or quotes: {:?}",
            config.ack_token
        )));
    }

    // Echoed append commands carry base64 text; a token spelled in that
    // alphabet can show up in them and acknowledge too early.
    if config.ack_token.chars().all(is_base64_char) {
        return Err(TransferError::InvalidConfig(format!(
            "ack_token needs a character outside the base64 alphabet: {:?}",
            config.ack_token
        )));
    }

    if config.fallback_decoder.trim().is_empty() || config.fallback_decoder.contains(['\n', '\r']) {
        return Err(TransferError::InvalidConfig(format!(
            "invalid fallback_decoder: {:?}",
            config.fallback_decoder
        )));
    }

    Ok(())
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}
