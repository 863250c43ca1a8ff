use anyhow::Result;
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use garde::Validate;
use std::path::PathBuf;

use super::{AppConfig, Environment};

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "movies-api", version, about = "Movies and weather API with OpenTelemetry export")]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, env = "APP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Server port
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Environment name
    #[arg(long, env = "ENVIRONMENT")]
    pub environment: Option<String>,

    /// Remote collector base URL
    #[arg(long)]
    pub otlp_endpoint: Option<String>,

    /// Remote collector API key
    #[arg(long, env = "OTLP_API_KEY", hide_env_values = true)]
    pub otlp_api_key: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// Load configuration with the tiered hierarchy:
/// defaults < config/default.toml < config/<env>.toml < explicit --config file
/// < APP_ env vars < OTEL_EXPORTER_OTLP_ENDPOINT < CLI flags.
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    let figment = build_figment(cli, "config");
    let config: AppConfig = figment.extract()?;

    config.validate()?;

    Ok(config)
}

/// Assemble the provider stack rooted at `config_dir`.
pub fn build_figment(cli: &Cli, config_dir: &str) -> Figment {
    let env_name = cli
        .environment
        .clone()
        .unwrap_or_else(|| Environment::default().as_str().to_string());

    let mut figment = Figment::new()
        .merge(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(format!("{}/default.toml", config_dir)))
        .merge(Toml::file(format!("{}/{}.toml", config_dir, env_name)));

    if let Some(path) = &cli.config {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment
        .merge(Env::prefixed("APP_").split("__"))
        .merge(
            Env::raw()
                .only(&["OTEL_EXPORTER_OTLP_ENDPOINT"])
                .map(|_| "telemetry.otlp_endpoint".into()),
        );

    if let Some(environment) = Environment::from_name(&env_name) {
        figment = figment.merge(Serialized::default("environment", environment));
    }
    if let Some(port) = cli.port {
        figment = figment.merge(Serialized::default("server.port", port));
    }
    if let Some(endpoint) = &cli.otlp_endpoint {
        figment = figment.merge(Serialized::default("telemetry.otlp_endpoint", endpoint));
    }
    if let Some(key) = &cli.otlp_api_key {
        figment = figment.merge(Serialized::default("telemetry.otlp_api_key", key));
    }
    if cli.debug {
        figment = figment.merge(Serialized::default("logging.level", "debug"));
    }

    figment
}
