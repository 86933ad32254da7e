//! Spooled uploads
//!
//! Uploaded files are streamed to disk-backed temp files rather than held in
//! memory. `SpooledUpload` owns the temp file and removes it on drop.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tempfile::NamedTempFile;

use zipline_core::mime::SNIFF_LEN;

/// An uploaded file spooled to a temporary location on disk.
///
/// The backing file is deleted when the value is dropped.
#[derive(Debug)]
pub struct SpooledUpload {
    /// Client-supplied file name, `"unknown"` when absent.
    pub file_name: String,
    /// Disk-backed spool holding the upload body.
    pub file: NamedTempFile,
    /// Byte length of the spooled content.
    pub size: u64,
}

impl SpooledUpload {
    /// Open an independent read handle on the spool, positioned at the start.
    pub fn reopen(&self) -> io::Result<File> {
        self.file.reopen()
    }

    /// Path of the backing temp file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the leading bytes used for media type sniffing.
    pub fn sniff_prefix(&self) -> io::Result<Vec<u8>> {
        let mut prefix = Vec::with_capacity(SNIFF_LEN.min(self.size as usize));
        self.reopen()?
            .take(SNIFF_LEN as u64)
            .read_to_end(&mut prefix)?;
        Ok(prefix)
    }
}

#[cfg(test)]
impl SpooledUpload {
    /// Build a spool directly from bytes, bypassing multipart extraction.
    pub(crate) fn from_bytes(file_name: &str, bytes: &[u8]) -> SpooledUpload {
        use std::io::Write;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        SpooledUpload {
            file_name: file_name.to_string(),
            file,
            size: bytes.len() as u64,
        }
    }
}
