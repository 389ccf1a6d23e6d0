//! Remote file layout of one transfer.
//!
//! Everything lives next to the target path:
//!
//! ```text
//! <target>.b64.d/part_0000 .. part_NNNN   one file per Part
//! <target>.b64                            merged encoded stream
//! <target>                                decoded payload
//! ```

use crate::constants::{
    MERGED_FILE_SUFFIX, MIN_PART_INDEX_WIDTH, PART_FILE_PREFIX, SCRATCH_DIR_SUFFIX,
};

/// Remote paths derived from the target path and the Part count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLayout {
    target: String,
    parent_dir: Option<String>,
    scratch_dir: String,
    merged_file: String,
    index_width: usize,
}

impl RemoteLayout {
    /// Derives the layout for `target` holding `total_parts` Parts.
    pub fn new(target: &str, total_parts: usize) -> Self {
        let parent_dir = match target.rsplit_once('/') {
            Some(("", _)) => Some("/".to_string()),
            Some((parent, _)) => Some(parent.to_string()),
            None => None,
        };

        Self {
            target: target.to_string(),
            parent_dir,
            scratch_dir: format!("{target}{SCRATCH_DIR_SUFFIX}"),
            merged_file: format!("{target}{MERGED_FILE_SUFFIX}"),
            index_width: part_index_width(total_parts),
        }
    }

    /// Final decoded file.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Directory containing the target, if the path has one.
    pub fn parent_dir(&self) -> Option<&str> {
        self.parent_dir.as_deref()
    }

    /// Directory holding one file per Part.
    pub fn scratch_dir(&self) -> &str {
        &self.scratch_dir
    }

    /// Concatenation of all Part files, still encoded.
    pub fn merged_file(&self) -> &str {
        &self.merged_file
    }

    /// Path of the file holding Part `index`.
    pub fn part_file(&self, index: usize) -> String {
        format!(
            "{}/{PART_FILE_PREFIX}{index:0width$}",
            self.scratch_dir,
            width = self.index_width
        )
    }

    /// Unquoted glob matching every Part file, relative to the scratch dir.
    pub fn part_glob(&self) -> String {
        format!("{PART_FILE_PREFIX}*")
    }
}

/// Zero-padding width that keeps lexical order equal to index order.
fn part_index_width(total_parts: usize) -> usize {
    let last = total_parts.saturating_sub(1);
    let digits = last.checked_ilog10().map_or(1, |d| d as usize + 1);
    digits.max(MIN_PART_INDEX_WIDTH)
}
