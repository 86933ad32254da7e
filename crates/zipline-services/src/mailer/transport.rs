//! Mail transport abstraction
//!
//! This module defines the MailTransport trait the notifier fans out through,
//! plus the production SMTP implementation backed by lettre.

use anyhow::Context;
use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use zipline_core::Config;

/// Mail delivery errors
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Failed to read attachment: {0}")]
    Attachment(#[from] std::io::Error),

    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Mail transport abstraction
///
/// The production implementation speaks SMTP. Tests substitute a recording
/// double, which is why delivery goes through a trait object rather than a
/// concrete lettre transport.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver one fully built message.
    async fn send(&self, message: Message) -> Result<(), MailError>;
}

/// SMTP transport backed by lettre's async client.
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the transport from configuration.
    ///
    /// `SMTP_TLS=true` (the default) uses an implicit-TLS connection on the
    /// configured port; `SMTP_TLS=false` yields a plaintext connection for
    /// local relays and test servers.
    pub fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        let host = config
            .smtp_host
            .as_deref()
            .context("SMTP_HOST must be set for mail delivery")?;
        let port = config.smtp_port;

        let builder = if config.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .context("Failed to configure SMTP relay")?
                .port(port)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port)
        };
        let builder = if let (Some(user), Some(password)) =
            (config.smtp_user.as_ref(), config.smtp_password.as_ref())
        {
            builder.credentials(Credentials::new(user.clone(), password.clone()))
        } else {
            builder
        };

        tracing::info!(
            host = %host,
            port = port,
            tls = config.smtp_tls,
            "Mail transport initialized"
        );

        Ok(Self {
            mailer: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: Message) -> Result<(), MailError> {
        self.mailer.send(message).await?;
        Ok(())
    }
}
