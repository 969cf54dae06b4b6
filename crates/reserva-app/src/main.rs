//! Reserva application binary - composition root.
//!
//! 1. Load `.env`, CLI flags and the TOML configuration
//! 2. Initialize tracing
//! 3. Build the NLU adapter (Gemini, or the null adapter when disabled)
//! 4. Start the axum REST API server

mod cli;

use std::sync::Arc;

use clap::Parser;

use reserva_api::state::AppState;
use reserva_core::config::ReservaConfig;
use reserva_core::validation;
use reserva_nlu::{GeminiAdapter, NluAdapter, NullAdapter};

use cli::CliArgs;

/// Read the provider key named by `nlu.api_key_env`. Blank values count as missing.
fn read_api_key(config: &ReservaConfig) -> Option<String> {
    std::env::var(&config.nlu.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty())
}

fn build_gemini(config: &ReservaConfig) -> Result<GeminiAdapter, Box<dyn std::error::Error>> {
    let Some(api_key) = read_api_key(config) else {
        tracing::error!(
            env = %config.nlu.api_key_env,
            "NLU is enabled but no API key is set; set the variable or disable [nlu]"
        );
        return Err(format!("missing API key in {}", config.nlu.api_key_env).into());
    };
    Ok(GeminiAdapter::from_config(api_key, &config.nlu))
}

/// Pick the NLU adapter. Disabling NLU in config skips the API key check;
/// the opt-out is logged at `warn`.
fn build_nlu(config: &ReservaConfig) -> Result<Arc<dyn NluAdapter>, Box<dyn std::error::Error>> {
    if !config.nlu.enabled {
        tracing::warn!(
            env = %config.nlu.api_key_env,
            "NLU disabled by config ([nlu] enabled = false); API key check skipped, chat runs on keyword matching only"
        );
        return Ok(Arc::new(NullAdapter));
    }
    let adapter = build_gemini(config)?;
    tracing::info!(model = %config.nlu.model, "Gemini NLU enabled");
    Ok(Arc::new(adapter))
}

/// Run one analysis and print the guess. Provider errors are reported, not masked.
async fn probe(config: &ReservaConfig, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let adapter = build_gemini(config)?;
    tracing::info!(model = %config.nlu.model, "Probing NLU provider");

    let guess = adapter.try_analyze(text, validation::today()).await?;
    println!("{}", serde_json::to_string_pretty(&guess)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to read .env file: {}", e);
        }
    }

    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = ReservaConfig::load_or_default(&config_file);
    config.server.port = args.resolve_port(config.server.port);
    if let Some(host) = args.resolve_host() {
        config.server.host = host;
    }
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }

    // Tracing. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Reserva v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    if let Some(text) = args.probe.as_deref() {
        return probe(&config, text).await;
    }

    let nlu = build_nlu(&config)?;

    // === API server ===

    let state = AppState::new(config.clone(), nlu);

    if let Err(e) = reserva_api::start_server(&config, state).await {
        tracing::error!(
            host = %config.server.host,
            port = config.server.port,
            error = %e,
            "API server stopped"
        );
        return Err(e.into());
    }

    Ok(())
}
