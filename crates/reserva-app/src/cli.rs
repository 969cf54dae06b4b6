//! CLI argument definitions for the Reserva server.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Reserva - restaurant reservation API with a conversational booking assistant.
#[derive(Parser, Debug, Default)]
#[command(name = "reserva", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// API server bind address.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Run one NLU analysis on TEXT, print the guess as JSON and exit.
    #[arg(long = "probe", value_name = "TEXT")]
    pub probe: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > RESERVA_CONFIG env var > ~/.reserva/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.config_path_with(|key| std::env::var(key).ok())
    }

    fn config_path_with(&self, env: impl Fn(&str) -> Option<String>) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = env("RESERVA_CONFIG").filter(|p| !p.trim().is_empty()) {
            return PathBuf::from(p);
        }
        default_config_path(env("HOME"))
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > RESERVA_PORT > PORT > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        self.port_with(config_port, |key| std::env::var(key).ok())
    }

    fn port_with(&self, config_port: u16, env: impl Fn(&str) -> Option<String>) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        for key in ["RESERVA_PORT", "PORT"] {
            if let Some(p) = env(key).and_then(|val| val.trim().parse::<u16>().ok()) {
                return p;
            }
        }
        config_port
    }

    /// Resolve the bind address. Returns `None` when not overridden.
    pub fn resolve_host(&self) -> Option<String> {
        self.host.clone()
    }

    /// Resolve the log level. Returns `None` when not overridden.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

fn default_config_path(home: Option<String>) -> PathBuf {
    match home {
        Some(home) => PathBuf::from(home).join(".reserva").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}
