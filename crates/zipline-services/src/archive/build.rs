//! Archive assembly
//!
//! Streams a bundle of spooled uploads into a zip container on disk. Every
//! member is classified by content sniffing before it is admitted; the
//! client-supplied file name only decides the entry path inside the archive.

use std::io::{self, Seek};

use tempfile::NamedTempFile;
use zip::result::ZipError;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use zipline_core::mime::{sniff_mime, BUNDLE_ALLOWED_TYPES};
use zipline_core::AppError;

use crate::upload::SpooledUpload;

/// A finished archive, spooled to disk and rewound for reading.
#[derive(Debug)]
pub struct BuiltArchive {
    /// Temp file holding the container, cursor at the start.
    pub file: NamedTempFile,
    /// Byte length of the container.
    pub size: u64,
}

/// Bundle the uploads into a single zip archive.
///
/// Rejects the whole bundle on the first member that fails classification,
/// carries a disallowed type, or has an unsafe name. Entry order follows
/// bundle order.
pub async fn build_archive(bundle: Vec<SpooledUpload>) -> Result<BuiltArchive, AppError> {
    if bundle.is_empty() {
        return Err(AppError::NoFilesProvided);
    }

    tokio::task::spawn_blocking(move || write_archive(&bundle))
        .await
        .map_err(|e| AppError::Internal(format!("Archive build task failed: {}", e)))?
}

fn write_archive(bundle: &[SpooledUpload]) -> Result<BuiltArchive, AppError> {
    let mut out = NamedTempFile::new()?;
    {
        let mut writer = ZipWriter::new(out.as_file_mut());
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for item in bundle {
            validate_entry_name(&item.file_name)?;

            let mime_type = match sniff_mime(&item.sniff_prefix()?) {
                Some(mime) if BUNDLE_ALLOWED_TYPES.contains(&mime) => mime,
                detected => {
                    return Err(AppError::UnsupportedFileType {
                        file_name: item.file_name.clone(),
                        mime_type: detected.unwrap_or("unknown").to_string(),
                    });
                }
            };

            writer
                .start_file(item.file_name.as_str(), options)
                .map_err(write_error)?;
            let mut source = item.reopen()?;
            io::copy(&mut source, &mut writer)?;

            tracing::debug!(
                file = %item.file_name,
                mime = mime_type,
                size = item.size,
                "Added file to archive"
            );
        }

        writer.finish().map_err(write_error)?;
    }

    // Rewind so callers can stream the container from the top
    out.as_file_mut().rewind()?;
    let size = out.as_file().metadata()?.len();

    Ok(BuiltArchive { file: out, size })
}

/// Entry names become extraction paths, so anything that could escape the
/// extraction root is refused outright.
fn validate_entry_name(name: &str) -> Result<(), AppError> {
    if name.contains('\\')
        || name
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..")
    {
        return Err(AppError::UnsafeFileName(name.to_string()));
    }
    Ok(())
}

fn write_error(err: ZipError) -> AppError {
    match err {
        ZipError::Io(io_err) => AppError::Io(io_err),
        other => AppError::Internal(format!("Failed to write archive: {}", other)),
    }
}
