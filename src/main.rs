use anyhow::{Context, Result};
use footfall_gateway::{backend, config, RestApi};
use log::{error, info};
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_ENV: &str = "FOOTFALL_CONFIG";

async fn run_app() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .map(PathBuf::from);

    let mut config = config::load_config(config_path.as_deref())?;
    config.apply_env(|name| std::env::var(name).ok())?;

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.api.log_level.as_str()),
    )
    .init();
    info!("Starting footfall gateway v{}", env!("CARGO_PKG_VERSION"));

    config.validate().context("Invalid configuration")?;
    match &config_path {
        Some(path) => info!("Configuration loaded from {:?}", path),
        None => info!("No configuration file given, using defaults"),
    }

    let backend = backend::create_backend(&config.backend)?;

    let http_server = RestApi::new(
        &config.api,
        backend,
        Duration::from_millis(config.polling.interval_ms),
    );
    http_server.run().await?;

    info!("Footfall gateway stopped");
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
