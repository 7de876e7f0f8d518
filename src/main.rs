//! Service entry point.
//!
//! Startup is all-or-nothing: configuration (including the narrative API
//! credential) and both model artifacts must resolve, or the process exits.
//! There is no partial-availability mode.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use cardiolens::api::server;
use cardiolens::api::types::ApiContext;
use cardiolens::config::{self, Config};
use cardiolens::inference::EcgDiagnoser;
use cardiolens::narrative::GeminiClient;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("fatal: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config = Config::from_env().map_err(|e| e.to_string())?;

    std::fs::create_dir_all(&config.upload_dir)
        .map_err(|e| format!("Cannot create upload directory: {e}"))?;

    tracing::info!(
        extractor = %config.extractor_model_path.display(),
        classifier = %config.classifier_model_path.display(),
        "loading model artifacts"
    );
    let diagnoser = {
        let extractor_path = config.extractor_model_path.clone();
        let classifier_path = config.classifier_model_path.clone();
        tokio::task::spawn_blocking(move || {
            EcgDiagnoser::load(&extractor_path, &classifier_path)
        })
        .await
        .map_err(|e| format!("Model load task failed: {e}"))?
        .map_err(|e| e.to_string())?
    };

    let narrator = GeminiClient::new(&config.narrative);

    let bind_addr = config.bind_addr;
    let ctx = ApiContext::new(Arc::new(config), Arc::new(diagnoser), Arc::new(narrator));

    server::serve(ctx, bind_addr).await
}
