// API layer - axum routes and JSON envelopes around the extraction service.

#[path = "handlers.rs"]
pub mod handlers;

#[path = "responses.rs"]
pub mod responses;

#[path = "router.rs"]
pub mod router;

pub use router::{build_router, start_server, AppState};
