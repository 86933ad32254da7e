use axum::{extract::Multipart, Json};

use zipline_core::ArchiveReport;
use zipline_services::inspect_archive;

use crate::error::HttpAppError;
use crate::utils::upload::extract_single_file;

/// Inspect an uploaded ZIP archive and report its contents without
/// extracting them.
#[tracing::instrument(skip(multipart), fields(operation = "archive_information"))]
pub async fn archive_information(
    multipart: Multipart,
) -> Result<Json<ArchiveReport>, HttpAppError> {
    let upload = extract_single_file(multipart).await?;

    tracing::debug!(
        file_name = %upload.file_name,
        size = upload.size,
        "Inspecting uploaded archive"
    );

    let report = inspect_archive(upload).await?;

    tracing::info!(
        file_name = %report.file_name,
        total_files = report.total_files,
        "Archive inspected"
    );

    Ok(Json(report))
}
