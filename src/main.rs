use tracing_subscriber::{fmt, EnvFilter};

use video_relay::{pipeline, Config, Forwarder, RunwareClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    tracing::info!("Using API key: {}", config.masked_api_key());
    match config.endpoint.as_deref() {
        Some(endpoint) => tracing::info!("Forwarding endpoint: {}", endpoint),
        None => tracing::warn!("VIDEO_API_ENDPOINT is blank, nothing can be forwarded"),
    }

    let provider = RunwareClient::from_config(&config)?;
    let forwarder = Forwarder::from_config(&config);

    // Forward failures are reported in the summary and do not change the exit code.
    if let Err(e) = pipeline::run(&provider, &forwarder, &config.request).await {
        tracing::error!("❌ {}", e);
        return Err(e.into());
    }
    Ok(())
}
