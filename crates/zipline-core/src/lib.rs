//! Zipline Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! media type detection shared across all zipline components.

pub mod config;
pub mod error;
pub mod mime;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, DeliveryFailure, ErrorMetadata, LogLevel};
pub use models::{ArchiveEntry, ArchiveReport};
