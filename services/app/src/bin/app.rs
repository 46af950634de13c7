//! services/app/src/bin/app.rs

use app_lib::{
    adapters::{HttpBackend, RosterVerifier},
    config::Config,
    error::AppError,
    shell::Shell,
    state::AppState,
};
use copilot_core::ports::CredentialVerifier;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Course backend at {}", config.backend_url);

    // --- 2. Initialize Service Adapters ---
    let backend = Arc::new(HttpBackend::new(config.backend_url.clone()));
    let verifier: Arc<dyn CredentialVerifier> = match &config.roster_path {
        Some(path) => {
            info!("Loading account roster from {}", path.display());
            Arc::new(RosterVerifier::from_file(path)?)
        }
        None => Arc::new(RosterVerifier::seeded()?),
    };

    // --- 3. Build the Shared AppState ---
    let state = AppState {
        config: config.clone(),
        questions: backend.clone(),
        ingest: backend.clone(),
        catalog: backend,
        verifier,
    };

    // --- 4. Run the Shell ---
    let mut shell = Shell::new(state);
    shell.run().await?;
    Ok(())
}
