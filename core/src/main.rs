/// Guided-chat core - transport bridge entry point
use guidechat_core::{bridge, Config};
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse configuration
    let args: Vec<String> = env::args().collect();
    let config = Config::from_args(&args)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    info!("Starting guided-chat core");
    info!("   Role: {:?}", config.role);
    info!("   Listening on: {}", config.listen_addr);

    // Run the bridge (this will block until the process is stopped)
    bridge::run(config)
        .await
        .map_err(|e| anyhow::anyhow!("Bridge error: {}", e))?;

    Ok(())
}
