//! Domain models shared across crates
//!
//! These are the wire shapes of the archive inspection report. Field names
//! follow the JSON contract of the HTTP API, so renames here are breaking.

use serde::{Deserialize, Serialize};

/// One classified entry inside an inspected archive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path of the entry inside the archive, as stored in the central directory.
    pub file_path: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Media type inferred from the entry's extension.
    pub mimetype: String,
}

/// Summary report produced by inspecting an uploaded archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveReport {
    /// Name of the uploaded container file.
    #[serde(rename = "filename")]
    pub file_name: String,
    /// Byte length of the container itself.
    pub archive_size: u64,
    /// Sum of the uncompressed sizes of the reported entries.
    pub total_size: u64,
    /// Number of reported entries; always equals `files.len()`.
    pub total_files: usize,
    /// Reported entries, in central directory order.
    pub files: Vec<ArchiveEntry>,
}
