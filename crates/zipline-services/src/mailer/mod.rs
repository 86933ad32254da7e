//! Outbound mail
//!
//! The [`Notifier`] sends one copy of an uploaded file to every recipient in
//! a list, one message per address, fanning the sends out concurrently.

pub mod transport;

pub use transport::{MailError, MailTransport, SmtpMailer};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;
use tokio::task::JoinSet;
use validator::ValidateEmail;

use zipline_core::mime::{sniff_mime, MAIL_ALLOWED_TYPES};
use zipline_core::{AppError, Config, DeliveryFailure};

use crate::upload::SpooledUpload;

const MAIL_SUBJECT: &str = "A new file";
const MAIL_BODY_HTML: &str = "<h3>Knock Knock. A new file has been sent to you</h3>";

/// Fans an attachment out to a recipient list over a [`MailTransport`].
#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn MailTransport>,
    from: Mailbox,
    send_timeout: Duration,
}

impl Notifier {
    pub fn new(transport: Arc<dyn MailTransport>, from: Mailbox, send_timeout: Duration) -> Self {
        Self {
            transport,
            from,
            send_timeout,
        }
    }

    pub fn from_config(
        config: &Config,
        transport: Arc<dyn MailTransport>,
    ) -> Result<Self, anyhow::Error> {
        let from = config
            .smtp_from
            .as_deref()
            .context("SMTP_FROM must be set for mail delivery")?
            .parse::<Mailbox>()
            .map_err(|e| anyhow::anyhow!("Invalid SMTP_FROM address: {}", e))?;

        Ok(Self::new(transport, from, config.mail_send_timeout()))
    }

    /// Send `attachment` to every recipient, one message per address.
    ///
    /// The whole request is validated before the first send: an unsupported
    /// attachment type or any invalid address fails the call with zero
    /// messages dispatched. Individual send failures are collected and
    /// reported together; one bad mailbox never aborts the others.
    pub async fn send_to_all(
        &self,
        attachment: SpooledUpload,
        recipients: Vec<String>,
    ) -> Result<(), AppError> {
        let mime_type = match sniff_mime(&attachment.sniff_prefix()?) {
            Some(mime) if MAIL_ALLOWED_TYPES.contains(&mime) => mime,
            detected => {
                return Err(AppError::UnsupportedFileType {
                    file_name: attachment.file_name.clone(),
                    mime_type: detected.unwrap_or("unknown").to_string(),
                });
            }
        };

        if recipients.is_empty() {
            return Err(AppError::NoRecipients);
        }

        let mut mailboxes = Vec::with_capacity(recipients.len());
        for address in &recipients {
            if !address.validate_email() {
                return Err(AppError::InvalidEmailAddress(address.clone()));
            }
            let mailbox = address
                .parse::<Mailbox>()
                .map_err(|_| AppError::InvalidEmailAddress(address.clone()))?;
            mailboxes.push(mailbox);
        }

        let content_type = ContentType::parse(mime_type)
            .map_err(|e| AppError::Internal(format!("Invalid attachment content type: {}", e)))?;

        tracing::info!(
            file = %attachment.file_name,
            mime = mime_type,
            recipients = mailboxes.len(),
            "Dispatching file by mail"
        );

        let mut tasks = JoinSet::new();
        for mailbox in mailboxes {
            let transport = self.transport.clone();
            let from = self.from.clone();
            let file_name = attachment.file_name.clone();
            let path = attachment.path().to_path_buf();
            let content_type = content_type.clone();
            let send_timeout = self.send_timeout;

            tasks.spawn(async move {
                let recipient = mailbox.email.to_string();
                let outcome = tokio::time::timeout(
                    send_timeout,
                    send_one(transport, from, mailbox, path, file_name, content_type),
                )
                .await;

                match outcome {
                    Ok(Ok(())) => Ok(recipient),
                    Ok(Err(e)) => Err(DeliveryFailure {
                        recipient,
                        reason: e.to_string(),
                    }),
                    Err(_) => Err(DeliveryFailure {
                        recipient,
                        reason: format!("timed out after {:?}", send_timeout),
                    }),
                }
            });
        }

        let total = tasks.len();
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(recipient)) => {
                    tracing::info!(recipient = %recipient, "Email sent");
                }
                Ok(Err(failure)) => {
                    tracing::warn!(
                        recipient = %failure.recipient,
                        reason = %failure.reason,
                        "Email delivery failed"
                    );
                    failures.push(failure);
                }
                Err(join_err) => {
                    failures.push(DeliveryFailure {
                        recipient: "(unknown)".to_string(),
                        reason: format!("Send task failed: {}", join_err),
                    });
                }
            }
        }

        // Every task reads the spool from disk; it must outlive the join loop
        drop(attachment);

        if failures.is_empty() {
            tracing::info!(sent = total, "All emails delivered");
            Ok(())
        } else {
            Err(AppError::PartialDeliveryFailure { failures })
        }
    }
}

async fn send_one(
    transport: Arc<dyn MailTransport>,
    from: Mailbox,
    to: Mailbox,
    attachment_path: PathBuf,
    file_name: String,
    content_type: ContentType,
) -> Result<(), MailError> {
    let body = tokio::fs::read(&attachment_path).await?;
    let attachment = Attachment::new(file_name).body(body, content_type);

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(MAIL_SUBJECT)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::html(MAIL_BODY_HTML.to_string()))
                .singlepart(attachment),
        )?;

    transport.send(message).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Transport double that records delivery attempts instead of speaking SMTP.
    #[derive(Default)]
    struct RecordingTransport {
        attempts: AtomicUsize,
        fail_for: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    impl RecordingTransport {
        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }

        fn fail_for(&self, address: &str) {
            self.fail_for.lock().unwrap().push(address.to_string());
        }
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, message: Message) -> Result<(), MailError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.attempts.fetch_add(1, Ordering::SeqCst);

            let recipients: Vec<String> = message
                .envelope()
                .to()
                .iter()
                .map(|a| a.to_string())
                .collect();
            let failing = self.fail_for.lock().unwrap();
            if recipients.iter().any(|r| failing.contains(r)) {
                return Err(MailError::Transport("simulated failure".to_string()));
            }
            Ok(())
        }
    }

    fn docx_bytes() -> Vec<u8> {
        let mut bytes = b"PK\x03\x04".to_vec();
        bytes.extend_from_slice(&[0u8; 26]);
        bytes.extend_from_slice(b"[Content_Types].xml");
        bytes
    }

    fn pdf_bytes() -> Vec<u8> {
        b"%PDF-1.4\n1 0 obj\nendobj".to_vec()
    }

    fn png_bytes() -> Vec<u8> {
        let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0u8; 8]);
        bytes
    }

    fn notifier_with(transport: Arc<RecordingTransport>, timeout: Duration) -> Notifier {
        Notifier::new(transport, "files@example.com".parse().unwrap(), timeout)
    }

    #[tokio::test]
    async fn test_send_to_all_delivers_one_message_per_recipient() {
        let transport = Arc::new(RecordingTransport::default());
        let notifier = notifier_with(transport.clone(), Duration::from_secs(5));

        let attachment = SpooledUpload::from_bytes("report.docx", &docx_bytes());
        let recipients = vec!["a@example.com".to_string(), "b@example.com".to_string()];

        notifier.send_to_all(attachment, recipients).await.unwrap();
        assert_eq!(transport.attempts(), 2);
    }

    #[tokio::test]
    async fn test_send_rejects_unsupported_attachment() {
        let transport = Arc::new(RecordingTransport::default());
        let notifier = notifier_with(transport.clone(), Duration::from_secs(5));

        let attachment = SpooledUpload::from_bytes("photo.png", &png_bytes());
        let err = notifier
            .send_to_all(attachment, vec!["a@example.com".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnsupportedFileType { .. }));
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test]
    async fn test_send_rejects_invalid_address_before_sending() {
        let transport = Arc::new(RecordingTransport::default());
        let notifier = notifier_with(transport.clone(), Duration::from_secs(5));

        let attachment = SpooledUpload::from_bytes("report.pdf", &pdf_bytes());
        let recipients = vec!["a@b.com".to_string(), "not-an-email".to_string()];
        let err = notifier
            .send_to_all(attachment, recipients)
            .await
            .unwrap_err();

        match err {
            AppError::InvalidEmailAddress(address) => assert_eq!(address, "not-an-email"),
            other => panic!("expected InvalidEmailAddress, got {:?}", other),
        }
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test]
    async fn test_send_requires_recipients() {
        let transport = Arc::new(RecordingTransport::default());
        let notifier = notifier_with(transport.clone(), Duration::from_secs(5));

        let attachment = SpooledUpload::from_bytes("report.pdf", &pdf_bytes());
        let err = notifier
            .send_to_all(attachment, Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NoRecipients));
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test]
    async fn test_send_collects_failures_without_aborting_others() {
        let transport = Arc::new(RecordingTransport::default());
        transport.fail_for("bad@example.com");
        let notifier = notifier_with(transport.clone(), Duration::from_secs(5));

        let attachment = SpooledUpload::from_bytes("report.docx", &docx_bytes());
        let recipients = vec![
            "good@example.com".to_string(),
            "bad@example.com".to_string(),
            "fine@example.com".to_string(),
        ];
        let err = notifier
            .send_to_all(attachment, recipients)
            .await
            .unwrap_err();

        match err {
            AppError::PartialDeliveryFailure { failures } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].recipient, "bad@example.com");
            }
            other => panic!("expected PartialDeliveryFailure, got {:?}", other),
        }
        // The two healthy recipients were still attempted
        assert_eq!(transport.attempts(), 3);
    }

    #[tokio::test]
    async fn test_send_times_out_slow_deliveries() {
        let transport = Arc::new(RecordingTransport {
            delay: Some(Duration::from_millis(200)),
            ..Default::default()
        });
        let notifier = notifier_with(transport.clone(), Duration::from_millis(20));

        let attachment = SpooledUpload::from_bytes("report.pdf", &pdf_bytes());
        let err = notifier
            .send_to_all(attachment, vec!["slow@example.com".to_string()])
            .await
            .unwrap_err();

        match err {
            AppError::PartialDeliveryFailure { failures } => {
                assert_eq!(failures.len(), 1);
                assert!(failures[0].reason.contains("timed out"));
            }
            other => panic!("expected PartialDeliveryFailure, got {:?}", other),
        }
    }
}
