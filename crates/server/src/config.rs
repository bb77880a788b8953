use clap::Parser;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};

use std::path::PathBuf;

/// A single, unified struct holding all server settings.
///
/// Built-in defaults are layered under the TOML file, which is layered under
/// command-line arguments.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub logging: LoggingConfig,
    pub server: ServerConfig,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, in bytes.
    pub body_limit: usize,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
            body_limit: 16 * 1024 * 1024,
        }
    }
}

/// Parses command-line arguments using the clap derive macro.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Settings file; a missing file leaves the defaults untouched.
    #[arg(short, long, default_value = "config/settings.toml")]
    pub config: PathBuf,
    #[arg(long)]
    pub host: Option<String>,
    #[arg(short, long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Loads configuration from the TOML file and merges it with CLI arguments.
pub fn get_config() -> anyhow::Result<Config> {
    Config::load(&Cli::parse())
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut figment =
            Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&cli.config));

        if let Some(host) = &cli.host {
            figment = figment.merge(("server.host", host));
        }
        if let Some(port) = cli.port {
            figment = figment.merge(("server.port", port));
        }
        if let Some(level) = &cli.log_level {
            figment = figment.merge(("logging.level", level));
        }

        let config: Config = figment.extract()?;
        Ok(config)
    }
}
