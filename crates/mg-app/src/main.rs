mod backend;
mod cleanup;
mod config;
mod content;
mod document;
mod error;
mod generator;
mod ui;

#[cfg(test)]
mod testing;

use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};
use crate::backend::state::AppState;
use crate::config::AppConfig;
use crate::generator::Generator;

const STALE_DOCUMENT_AGE: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::load()?;
    info!(
        port = config.port,
        pdf_dir = %config.pdf_dir().display(),
        local_pipeline = %config.local_pipeline_url,
        "Configuration loaded"
    );

    match cleanup::sweep_older_than(&config.pdf_dir(), STALE_DOCUMENT_AGE, SystemTime::now()) {
        Ok(removed) => info!(removed, "Document directory swept"),
        Err(e) => warn!("Error cleaning temporary files: {}", e),
    }

    let generator = Generator::new(&config)?;
    let state = Arc::new(AppState::new(generator, config.video.clone()));

    backend::serve(config.port, state).await
}
