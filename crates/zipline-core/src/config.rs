//! Configuration module
//!
//! This module provides the application configuration, loaded from the
//! environment (optionally via a `.env` file) with sane defaults for
//! everything except the SMTP settings, which `validate` requires.

use std::env;
use std::time::Duration;

// Common constants
const DEFAULT_PORT: u16 = 10000;
const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 50;
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_MAIL_SEND_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Cap on the whole multipart request body, in megabytes.
    pub max_upload_size_mb: usize,
    // Outbound mail configuration
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
    pub smtp_tls: bool,
    pub mail_send_timeout_secs: u64,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase().eq("production")
            || self.environment.to_lowercase().eq("prod")
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            max_upload_size_mb: env::var("MAX_UPLOAD_SIZE_MB")
                .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_SIZE_MB.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE_MB),
            smtp_host: env::var("SMTP_HOST").ok().filter(|s| !s.is_empty()),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| DEFAULT_SMTP_PORT.to_string())
                .parse()
                .unwrap_or(DEFAULT_SMTP_PORT),
            smtp_user: env::var("SMTP_USER").ok().filter(|s| !s.is_empty()),
            smtp_password: env::var("SMTP_PASSWORD").ok().filter(|s| !s.is_empty()),
            smtp_from: env::var("SMTP_FROM").ok().filter(|s| !s.is_empty()),
            smtp_tls: env::var("SMTP_TLS")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            mail_send_timeout_secs: env::var("MAIL_SEND_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_MAIL_SEND_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAIL_SEND_TIMEOUT_SECS),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.smtp_host.is_none() {
            return Err(anyhow::anyhow!("SMTP_HOST must be set for mail delivery"));
        }

        if self.smtp_from.is_none() {
            return Err(anyhow::anyhow!("SMTP_FROM must be set for mail delivery"));
        }

        if self.max_upload_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        Ok(())
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.max_upload_size_mb * 1024 * 1024
    }

    pub fn mail_send_timeout(&self) -> Duration {
        Duration::from_secs(self.mail_send_timeout_secs)
    }
}
