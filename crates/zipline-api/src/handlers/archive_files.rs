use axum::{
    body::Body,
    extract::Multipart,
    http::{header, Response, StatusCode},
    response::IntoResponse,
};
use tokio_util::io::ReaderStream;

use zipline_core::AppError;
use zipline_services::build_archive;

use crate::error::HttpAppError;
use crate::utils::upload::extract_file_list;

/// Bundle the uploaded files into a ZIP archive and stream it back.
#[tracing::instrument(skip(multipart), fields(operation = "archive_files"))]
pub async fn archive_files(multipart: Multipart) -> Result<impl IntoResponse, HttpAppError> {
    let bundle = extract_file_list(multipart).await?;

    tracing::debug!(file_count = bundle.len(), "Bundling uploads into archive");

    let built = build_archive(bundle).await?;
    let archive_size = built.size;

    // Unlink the spool up front; the open handle keeps the bytes readable
    // until the stream is drained.
    let (archive_file, temp_path) = built.file.into_parts();
    drop(temp_path);

    let stream = ReaderStream::new(tokio::fs::File::from_std(archive_file));

    let response = Response::builder()
        .status(StatusCode::CREATED)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"archive.zip\"",
        )
        .header(header::CONTENT_LENGTH, archive_size)
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    tracing::info!(archive_size, "Archive built");

    Ok(response)
}
