//! Application state shared across handlers.

use zipline_core::Config;
use zipline_services::Notifier;

/// Main application state: configuration plus the mail delivery service.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub notifier: Notifier,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
