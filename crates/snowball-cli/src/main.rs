//! Snowball Fight session host entry point.

use std::error::Error;
use std::sync::{Arc, Mutex};

use snowball_cli::config::Config;
use snowball_cli::requests;
use snowball_cli::state::AppState;
use snowball_core::clock::SystemClock;
use snowball_core::rng::SystemRng;
use snowball_event_store::memory_event_repository::InMemoryEventRepository;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr; stdout carries responses.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!("Starting Snowball Fight session host");

    let config = Config::from_env()?;
    let catalog = config.load_catalog()?;
    tracing::info!(
        scenarios = catalog.len(),
        digest = catalog.digest(),
        "scenario catalog loaded"
    );

    let app_state = AppState::new(
        Arc::new(SystemClock),
        Arc::new(Mutex::new(SystemRng::new())),
        Arc::new(InMemoryEventRepository::new()),
        Arc::new(catalog),
        Arc::new(config.game),
    );

    requests::serve(
        &app_state,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    tracing::info!("Snowball Fight session host stopped");
    Ok(())
}
