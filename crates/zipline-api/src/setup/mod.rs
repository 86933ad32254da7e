//! Application setup and initialization
//!
//! Initialization logic lives here rather than in main.rs so tests can
//! assemble the same router the binary serves.

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};

use zipline_core::Config;
use zipline_services::{MailTransport, Notifier, SmtpMailer};

use crate::state::AppState;

/// Initialize the entire application
pub fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry();

    tracing::info!("Configuration loaded and validated successfully");

    let transport: Arc<dyn MailTransport> =
        Arc::new(SmtpMailer::from_config(&config).context("Failed to initialize mail transport")?);
    let notifier =
        Notifier::from_config(&config, transport).context("Failed to initialize mail service")?;

    let state = Arc::new(AppState {
        config: config.clone(),
        notifier,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
