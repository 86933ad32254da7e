use zipline_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (telemetry, mail transport, routes)
    let (_state, router) = zipline_api::setup::initialize_app(config.clone())?;

    // Start the server
    zipline_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
