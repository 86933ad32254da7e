//! Shared helpers for request handlers.

pub mod upload;
