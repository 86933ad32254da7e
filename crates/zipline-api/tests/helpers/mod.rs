//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p zipline-api --test archive_test`
//! or `cargo test -p zipline-api`.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;

use zipline_api::setup::routes;
use zipline_api::state::AppState;
use zipline_core::Config;
use zipline_services::{MailError, MailTransport, Message, Notifier};

/// In-memory mail transport: counts deliveries and fails on request.
#[derive(Default)]
pub struct RecordingMailer {
    sent: AtomicUsize,
    failing: Mutex<Vec<String>>,
}

impl RecordingMailer {
    /// Number of messages accepted by the transport.
    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    /// Make every send addressed to `recipient` fail.
    pub fn fail_for(&self, recipient: &str) {
        self.failing.lock().unwrap().push(recipient.to_string());
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, message: Message) -> Result<(), MailError> {
        let recipients: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(|a| a.to_string())
            .collect();

        let failing = self.failing.lock().unwrap().clone();
        if recipients.iter().any(|r| failing.contains(r)) {
            return Err(MailError::Transport(format!(
                "simulated failure for {}",
                recipients.join(", ")
            )));
        }

        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Test application: server plus the recording mail transport.
pub struct TestApp {
    pub server: TestServer,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Setup test app with a recording mail transport.
pub fn setup_test_app() -> TestApp {
    let mailer = Arc::new(RecordingMailer::default());
    let config = create_test_config();

    let notifier = Notifier::new(
        mailer.clone(),
        "zipline@example.com".parse().expect("valid from address"),
        Duration::from_secs(5),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        notifier,
    });

    let app = routes::setup_routes(&config, state).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp { server, mailer }
}

fn create_test_config() -> Config {
    Config {
        server_port: 3000,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        max_upload_size_mb: 10,
        smtp_host: Some("smtp.example.com".to_string()),
        smtp_port: 465,
        smtp_user: None,
        smtp_password: None,
        smtp_from: Some("zipline@example.com".to_string()),
        smtp_tls: true,
        mail_send_timeout_secs: 5,
    }
}
