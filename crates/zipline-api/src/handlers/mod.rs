//! HTTP request handlers.

pub mod archive_files;
pub mod archive_information;
pub mod mail_file;
