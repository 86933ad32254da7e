//! Archive services: inspection of uploaded containers and assembly of new ones.

pub mod build;
pub mod inspect;

pub use build::{build_archive, BuiltArchive};
pub use inspect::inspect_archive;
