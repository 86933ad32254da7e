//! Archive inspection
//!
//! Walks the central directory of an uploaded zip container and produces an
//! [`ArchiveReport`] without decompressing any entry data.

use std::path::Path;

use zip::read::ZipArchive;
use zip::result::ZipError;

use zipline_core::mime::mime_from_extension;
use zipline_core::{AppError, ArchiveEntry, ArchiveReport};

use crate::upload::SpooledUpload;

/// Inspect an uploaded archive and report its classifiable entries.
///
/// Directory entries, entries with zero compressed size, and entries whose
/// media type cannot be determined from their extension are omitted from the
/// report. `total_size` sums only the entries that are reported.
pub async fn inspect_archive(upload: SpooledUpload) -> Result<ArchiveReport, AppError> {
    if !has_zip_extension(&upload.file_name) {
        let mime_type = mime_from_extension(&upload.file_name).unwrap_or("unknown");
        return Err(AppError::UnsupportedFileType {
            file_name: upload.file_name,
            mime_type: mime_type.to_string(),
        });
    }

    tokio::task::spawn_blocking(move || read_report(&upload))
        .await
        .map_err(|e| AppError::Internal(format!("Archive inspection task failed: {}", e)))?
}

fn has_zip_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .map(|e| e.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

fn read_report(upload: &SpooledUpload) -> Result<ArchiveReport, AppError> {
    let reader = upload.reopen()?;
    let mut archive = ZipArchive::new(reader).map_err(invalid_archive)?;

    let mut files = Vec::new();
    let mut total_size = 0u64;

    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(invalid_archive)?;
        if entry.is_dir() || entry.compressed_size() == 0 {
            continue;
        }
        let Some(mimetype) = mime_from_extension(entry.name()) else {
            continue;
        };

        total_size += entry.size();
        files.push(ArchiveEntry {
            file_path: entry.name().to_string(),
            size: entry.size(),
            mimetype: mimetype.to_string(),
        });
    }

    tracing::debug!(
        archive = %upload.file_name,
        entries = files.len(),
        "Inspected archive"
    );

    Ok(ArchiveReport {
        file_name: upload.file_name.clone(),
        archive_size: upload.size,
        total_size,
        total_files: files.len(),
        files,
    })
}

fn invalid_archive(err: ZipError) -> AppError {
    match err {
        ZipError::Io(io_err) => AppError::Io(io_err),
        other => AppError::InvalidArchive(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = ZipWriter::new(&mut cursor);
            let options =
                FileOptions::default().compression_method(CompressionMethod::Deflated);
            for (name, data) in entries {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[tokio::test]
    async fn test_inspect_reports_entries() {
        let bytes = zip_bytes(&[("txt/test.txt", b"hello world!")]);
        let archive_len = bytes.len() as u64;
        let upload = SpooledUpload::from_bytes("bundle.zip", &bytes);

        let report = inspect_archive(upload).await.unwrap();
        assert_eq!(report.file_name, "bundle.zip");
        assert_eq!(report.archive_size, archive_len);
        assert_eq!(report.total_files, 1);
        assert_eq!(report.total_size, 12);
        assert_eq!(report.files[0].file_path, "txt/test.txt");
        assert_eq!(report.files[0].size, 12);
        assert_eq!(report.files[0].mimetype, "text/plain");
    }

    #[tokio::test]
    async fn test_inspect_rejects_non_zip_name() {
        let upload = SpooledUpload::from_bytes("notes.txt", b"hello");
        let err = inspect_archive(upload).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFileType { .. }));
        assert!(err.to_string().contains("notes.txt"));
    }

    #[tokio::test]
    async fn test_inspect_rejects_garbage_bytes() {
        let upload = SpooledUpload::from_bytes("broken.zip", b"definitely not a zip");
        let err = inspect_archive(upload).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArchive(_)));
    }

    #[tokio::test]
    async fn test_inspect_skips_directories_and_unknown_types() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = ZipWriter::new(&mut cursor);
            let options =
                FileOptions::default().compression_method(CompressionMethod::Deflated);
            writer.add_directory("docs/", options).unwrap();
            writer.start_file("docs/readme.md", options).unwrap();
            writer.write_all(b"# readme").unwrap();
            writer.start_file("blob.xyz", options).unwrap();
            writer.write_all(b"opaque").unwrap();
            writer.finish().unwrap();
        }
        let upload = SpooledUpload::from_bytes("mixed.zip", &cursor.into_inner());

        let report = inspect_archive(upload).await.unwrap();
        assert_eq!(report.total_files, 1);
        assert_eq!(report.files[0].file_path, "docs/readme.md");
        assert_eq!(report.total_size, 8);
    }

    #[tokio::test]
    async fn test_inspect_preserves_central_directory_order() {
        let bytes = zip_bytes(&[
            ("b.txt", b"bb"),
            ("a.txt", b"aa"),
            ("nested/c.txt", b"cc"),
        ]);
        let upload = SpooledUpload::from_bytes("ordered.zip", &bytes);

        let report = inspect_archive(upload).await.unwrap();
        let paths: Vec<&str> = report.files.iter().map(|f| f.file_path.as_str()).collect();
        assert_eq!(paths, vec!["b.txt", "a.txt", "nested/c.txt"]);
        assert_eq!(report.total_size, 6);
    }

    #[tokio::test]
    async fn test_inspect_accepts_uppercase_extension() {
        let bytes = zip_bytes(&[("a.txt", b"aa")]);
        let upload = SpooledUpload::from_bytes("UPPER.ZIP", &bytes);
        assert!(inspect_archive(upload).await.is_ok());
    }
}
