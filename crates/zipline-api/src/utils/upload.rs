//! Common utilities for multipart upload handlers.
//!
//! Every extractor here streams field bodies straight into disk-backed
//! spools; request bodies are never buffered whole in memory.

use std::io::Write;

use axum::extract::multipart::{Field, Multipart};
use tempfile::NamedTempFile;

use zipline_core::AppError;
use zipline_services::SpooledUpload;

/// Parsed form of a mail request: one attachment plus the raw recipient field.
pub struct MailRequest {
    pub file: SpooledUpload,
    pub emails: String,
}

/// Stream a single multipart field into a temp-file spool.
async fn spool_field(mut field: Field<'_>) -> Result<SpooledUpload, AppError> {
    let file_name = field
        .file_name()
        .map(|s: &str| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let mut file = NamedTempFile::new()?;
    let mut size: u64 = 0;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::MalformedRequest(format!("Failed to read file data: {}", e)))?
    {
        file.write_all(&chunk)?;
        size += chunk.len() as u64;
    }
    file.flush()?;

    Ok(SpooledUpload {
        file_name,
        file,
        size,
    })
}

/// Extract the upload from a multipart form.
/// Only one field named "file" is accepted; multiple file fields are rejected.
pub async fn extract_single_file(mut multipart: Multipart) -> Result<SpooledUpload, AppError> {
    let mut upload: Option<SpooledUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::MalformedRequest(format!("Failed to read multipart form: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "file" {
            if upload.is_some() {
                return Err(AppError::MalformedRequest(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }
            upload = Some(spool_field(field).await?);
        }
    }

    upload.ok_or_else(|| AppError::MalformedRequest("No file provided".to_string()))
}

/// Extract every upload sent under the repeated "files" field.
/// May return an empty list; callers decide whether that is an error.
pub async fn extract_file_list(mut multipart: Multipart) -> Result<Vec<SpooledUpload>, AppError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::MalformedRequest(format!("Failed to read multipart form: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "files" {
            uploads.push(spool_field(field).await?);
        }
    }

    Ok(uploads)
}

/// Extract the attachment ("file") and recipient list ("emails") for the
/// mail endpoint. Both fields are required.
pub async fn extract_mail_request(mut multipart: Multipart) -> Result<MailRequest, AppError> {
    let mut upload: Option<SpooledUpload> = None;
    let mut emails: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::MalformedRequest(format!("Failed to read multipart form: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if upload.is_some() {
                    return Err(AppError::MalformedRequest(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                upload = Some(spool_field(field).await?);
            }
            "emails" => {
                let text = field.text().await.map_err(|e| {
                    AppError::MalformedRequest(format!("Failed to read emails field: {}", e))
                })?;
                emails = Some(text);
            }
            _ => {}
        }
    }

    let file = upload.ok_or_else(|| AppError::MalformedRequest("No file provided".to_string()))?;
    let emails =
        emails.ok_or_else(|| AppError::MalformedRequest("No emails field provided".to_string()))?;

    Ok(MailRequest { file, emails })
}
