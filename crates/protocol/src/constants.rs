use std::time::Duration;

/// Default Part size in encoded characters (20 KiB).
///
/// A Part is the unit of resumability: each one lands in its own file in
/// the remote scratch directory.
pub const DEFAULT_PART_SIZE: usize = 20 * 1024;

/// Default SubChunk size in encoded characters (2 KiB).
///
/// Bounded by the longest single command line the remote interpreter
/// accepts without truncating or stalling its input buffer.
pub const DEFAULT_SUB_SIZE: usize = 2048;

/// Sentinel echoed by the remote side after every unit of work.
pub const DEFAULT_ACK_TOKEN: &str = "__OK__";

/// Time allowed for one command/acknowledgment round-trip.
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause between SubChunk sends.
pub const DEFAULT_PACING: Duration = Duration::from_millis(10);

/// Decoder tried when the remote `base64` binary is missing or fails.
pub const DEFAULT_FALLBACK_DECODER: &str = "busybox base64";

/// Minimum zero-padding width of Part file indices.
pub const MIN_PART_INDEX_WIDTH: usize = 4;

/// Suffix of the per-Part scratch directory next to the target.
pub const SCRATCH_DIR_SUFFIX: &str = ".b64.d";

/// Suffix of the merged encoded file next to the target.
pub const MERGED_FILE_SUFFIX: &str = ".b64";

/// File name prefix of each Part inside the scratch directory.
pub const PART_FILE_PREFIX: &str = "part_";
