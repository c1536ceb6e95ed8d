// Bootstrap utilities for binary initialization
// Shared by the launcher and provisioner main.rs files

use crate::config::{ObservabilityConfig, ProvisionSettings, Settings};
use anyhow::{Context, Result};

/// Initialize tracing according to the observability configuration.
///
/// `default_directives` seeds the filter when neither `RUST_LOG` nor the
/// configured log level applies (e.g. "launcher=info,common=info").
pub fn init_tracing(config: &ObservabilityConfig, default_directives: &str) {
    if config.json_logs {
        init_json_tracing(&config.log_level, default_directives);
    } else {
        init_human_tracing(&config.log_level, default_directives);
    }
}

/// Initialize tracing for JSON logging
/// Used by: container deployments
pub fn init_json_tracing(log_level: &str, default_directives: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(log_level, default_directives))
        .with_target(false)
        .with_level(true)
        .json()
        .init();
}

/// Initialize tracing for human-readable logging
/// Used by: development
pub fn init_human_tracing(log_level: &str, default_directives: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(env_filter(log_level, default_directives))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn env_filter(log_level: &str, default_directives: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directives))
}

/// Load and validate launcher settings.
///
/// Called before tracing is initialized (the subscriber needs the
/// observability section), so failures surface through the returned error
/// rather than a log line.
///
/// # Errors
/// Returns error if loading fails or validation rejects the configuration
pub fn load_settings() -> Result<Settings> {
    let settings = Settings::load().context("Failed to load configuration")?;
    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    Ok(settings)
}

/// Load and validate provisioner settings.
///
/// # Errors
/// Returns error if loading fails or validation rejects the configuration
pub fn load_provision_settings() -> Result<ProvisionSettings> {
    let settings = ProvisionSettings::load().context("Failed to load provision configuration")?;
    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid provision configuration: {}", e))?;
    Ok(settings)
}
