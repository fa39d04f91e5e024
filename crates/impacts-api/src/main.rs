use impacts_api::constants::{DEFAULT_LOG_FILTER, SERVICE_NAME};
use impacts_core::Config;
use impacts_infra::LogFormat;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let format: LogFormat = config.log_format().parse().unwrap_or_default();
    impacts_infra::init_telemetry(SERVICE_NAME, format, DEFAULT_LOG_FILTER)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let (_state, router) = impacts_api::setup::initialize_app(config.clone()).await?;

    impacts_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
