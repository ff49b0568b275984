// This is the entry point of the Google Docs extractor.
//
// **Architecture Overview:**
// - `core/` = Document model, flattening and orchestration (platform-agnostic)
// - `infra/` = Implementations of core traits (Google Docs API, image storage)
// - `api/` = HTTP adapter (routes, handlers, JSON envelopes)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Build the router and serve it

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "api/api_layer.rs"]
mod api;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use std::sync::Arc;

use anyhow::anyhow;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api::{build_router, start_server, AppState};
use crate::config::AppConfig;
use crate::core::extraction::ExtractionService;
use crate::infra::google_docs::{GoogleAuth, GoogleDocsClient};
use crate::infra::images::FileImageSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gdocs_extractor=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Google Docs extractor");
    let config = AppConfig::from_env();

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    // Without working credentials nothing can be served, so this is fatal.
    let auth = GoogleAuth::from_config(&config.credentials)
        .await
        .map_err(|e| {
            tracing::error!("Failed to initialize Google Docs credentials: {}", e);
            anyhow!("Failed to initialize Google Docs credentials: {}", e)
        })?;
    tracing::info!("Authenticating to Google Docs with {}", auth.describe());

    let documents = Arc::new(GoogleDocsClient::new(auth, config.docs_api_base.clone()));
    let images = Arc::new(FileImageSink::new(config.images_dir.clone()));
    tracing::info!("Images are stored under {}", images.root().display());

    let extraction = ExtractionService::new(documents, images);
    let router = build_router(AppState::new(extraction), &config.images_dir);

    tracing::info!(
        extract_images = "/extract?doc_id=ID",
        extract_full_content = "/extract-full-content?doc_id=ID",
        extract_raw_document = "/extract-raw-document?doc_id=ID",
        "Available endpoints"
    );

    start_server(&config.server_addr, router).await?;
    Ok(())
}
