// Smart Tagging - command line entry point
//
// Reads a reservation JSON document from stdin, runs the analyze pipeline
// and prints the response JSON on stdout. Logs go to stderr.

use std::io::Read;

use anyhow::Context;
use smart_tagging::models::reservation::ReservationInput;
use smart_tagging::state::AppState;
use smart_tagging::storage::ConfigService;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "SMART_TAGGING_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_service = match std::env::var(CONFIG_ENV) {
        Ok(path) if !path.trim().is_empty() => ConfigService::from_path(path)?,
        _ => ConfigService::new()?,
    };
    let config = config_service.into_config();

    init_tracing(config.debug);

    let state = AppState::from_config(config)?;

    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("failed to read reservation from stdin")?;
    let input: ReservationInput =
        serde_json::from_str(&raw).context("stdin is not a valid reservation document")?;

    let response = state.analyze(&input).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
