use std::sync::Arc;

use axum::extract::{Multipart, State};

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::extract_mail_request;

/// Email the uploaded file to every address in the comma-separated
/// `emails` field.
#[tracing::instrument(skip(state, multipart), fields(operation = "mail_file"))]
pub async fn mail_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<&'static str, HttpAppError> {
    let request = extract_mail_request(multipart).await?;
    let recipients = split_recipients(&request.emails);

    tracing::debug!(
        file_name = %request.file.file_name,
        recipient_count = recipients.len(),
        "Mailing uploaded file"
    );

    state.notifier.send_to_all(request.file, recipients).await?;

    Ok("file has been sent")
}

/// Split the raw `emails` field on commas, dropping surrounding whitespace
/// and empty segments.
fn split_recipients(emails: &str) -> Vec<String> {
    emails
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
