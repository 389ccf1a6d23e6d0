//! Remote command vocabulary for uploading a file through a bare shell.
//!
//! The far end is any POSIX-ish command interpreter reached over a raw
//! byte stream. Everything the uploader needs from it is expressed here as
//! single-line commands, plus the paths those commands operate on.

pub mod commands;
pub mod constants;
pub mod layout;
pub mod types;

// Re-export primary types for convenience.
pub use layout::RemoteLayout;
pub use types::TransferConfig;
