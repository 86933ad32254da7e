//! Zipline Services Layer
//!
//! This crate is the **business service layer**: archive inspection and
//! assembly, plus outbound mail fan-out. The API crate depends on this facade
//! and keeps thin HTTP handling to itself.

pub mod archive;
pub mod mailer;
pub mod upload;

pub use archive::{build_archive, inspect_archive, BuiltArchive};
pub use mailer::{MailError, MailTransport, Notifier, SmtpMailer};
pub use upload::SpooledUpload;

// lettre types that cross the transport seam
pub use lettre::message::Mailbox;
pub use lettre::Message;
