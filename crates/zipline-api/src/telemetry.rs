//! Tracing subscriber setup.

use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` overrides the default filter when set.
pub fn init_telemetry() {
    // Console: compact format, message-centric
    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false)
            .without_time(),
    );

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zipline=debug,tower_http=debug".into()),
        )
        .with(console_fmt)
        .init();
}
