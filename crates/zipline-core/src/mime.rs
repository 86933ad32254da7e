//! Media type detection
//!
//! Two complementary classifiers live here: `sniff_mime` inspects leading
//! bytes (magic numbers) and is authoritative for uploaded content, while
//! `mime_from_extension` maps file names to types and is used for archive
//! entries whose bytes we never decompress.

use std::path::Path;

/// Number of leading bytes a caller should feed to `sniff_mime`.
pub const SNIFF_LEN: usize = 512;

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";
pub const MIME_GIF: &str = "image/gif";
pub const MIME_WEBP: &str = "image/webp";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_ZIP: &str = "application/zip";
pub const MIME_XML: &str = "application/xml";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// File types accepted when bundling uploads into an archive.
pub const BUNDLE_ALLOWED_TYPES: &[&str] = &[MIME_DOCX, MIME_XML, MIME_JPEG, MIME_PNG];

/// File types accepted as mail attachments.
pub const MAIL_ALLOWED_TYPES: &[&str] = &[MIME_DOCX, MIME_PDF];

/// Detect a media type from leading bytes using magic numbers.
///
/// Returns `None` when the sample matches no known signature and does not
/// look like plain text. Callers treat `None` as "indeterminate".
pub fn sniff_mime(sample: &[u8]) -> Option<&'static str> {
    if sample.is_empty() {
        return None;
    }

    // JPEG: FF D8 FF
    if sample.len() >= 3 && sample[0] == 0xFF && sample[1] == 0xD8 && sample[2] == 0xFF {
        return Some(MIME_JPEG);
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if sample.len() >= 8 && sample[..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Some(MIME_PNG);
    }

    // GIF: GIF87a / GIF89a
    if sample.len() >= 4 && &sample[..4] == b"GIF8" {
        return Some(MIME_GIF);
    }

    // WebP: RIFF ... WEBP
    if sample.len() >= 12 && &sample[..4] == b"RIFF" && &sample[8..12] == b"WEBP" {
        return Some(MIME_WEBP);
    }

    // PDF: %PDF
    if sample.len() >= 4 && &sample[..4] == b"%PDF" {
        return Some(MIME_PDF);
    }

    // Zip local file header: PK 03 04. Office documents are zip containers
    // whose first entry is [Content_Types].xml, so refine before answering.
    if sample.len() >= 4 && &sample[..4] == b"PK\x03\x04" {
        if is_office_open_xml(sample) {
            return Some(MIME_DOCX);
        }
        return Some(MIME_ZIP);
    }

    if looks_like_xml(sample) {
        return Some(MIME_XML);
    }

    if looks_like_text(sample) {
        return Some(MIME_TEXT);
    }

    None
}

/// The local file header of the first zip entry starts at byte 0, with the
/// entry name at offset 30. Office Open XML packages put [Content_Types].xml
/// there.
fn is_office_open_xml(sample: &[u8]) -> bool {
    const FIRST_ENTRY: &[u8] = b"[Content_Types].xml";
    const NAME_OFFSET: usize = 30;

    sample.len() >= NAME_OFFSET + FIRST_ENTRY.len()
        && &sample[NAME_OFFSET..NAME_OFFSET + FIRST_ENTRY.len()] == FIRST_ENTRY
}

/// XML declaration, allowing a UTF-8 BOM and leading whitespace.
fn looks_like_xml(sample: &[u8]) -> bool {
    let rest = sample
        .strip_prefix(&[0xEF, 0xBB, 0xBF][..])
        .unwrap_or(sample);
    let mut i = 0;
    while i < rest.len() && rest[i].is_ascii_whitespace() {
        i += 1;
    }
    rest[i..].starts_with(b"<?xml")
}

/// Plain text: no control bytes below 0x20 other than the usual whitespace
/// and escape characters.
fn looks_like_text(sample: &[u8]) -> bool {
    sample
        .iter()
        .all(|&b| b >= 0x20 || matches!(b, b'\t' | b'\n' | 0x0C | b'\r' | 0x1B))
}

/// Map a file name to a media type by extension (case-insensitive).
///
/// Returns `None` for missing or unknown extensions.
pub fn mime_from_extension(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())?;

    let mime = match extension.as_str() {
        // Images
        "jpg" | "jpeg" => MIME_JPEG,
        "png" => MIME_PNG,
        "gif" => MIME_GIF,
        "webp" => MIME_WEBP,
        // Documents
        "pdf" => MIME_PDF,
        "doc" => "application/msword",
        "docx" => MIME_DOCX,
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        // Text
        "txt" => MIME_TEXT,
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "xml" => MIME_XML,
        "json" => "application/json",
        // Archives
        "zip" => MIME_ZIP,
        _ => return None,
    };

    Some(mime)
}
