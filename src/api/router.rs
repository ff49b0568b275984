use axum::{routing::get, Router};
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{extract_full_content, extract_images, extract_raw_document, health_check};
use crate::core::extraction::{ExtractionService, PUBLIC_IMAGE_ROUTE};

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub extraction: ExtractionService,
}

impl AppState {
    pub fn new(extraction: ExtractionService) -> Self {
        Self { extraction }
    }
}

/// Build the router. `images_dir` is served under the public image route so
/// the URLs in extraction results resolve to the downloaded files.
pub fn build_router(state: AppState, images_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/extract", get(extract_images))
        .route("/extract-full-content", get(extract_full_content))
        .route("/extract-raw-document", get(extract_raw_document))
        .nest_service(PUBLIC_IMAGE_ROUTE, ServeDir::new(images_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process stops.
pub async fn start_server(addr: &str, router: Router) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await
}
