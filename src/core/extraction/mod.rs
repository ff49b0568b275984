// Extraction module - document model, flattener and the service that ties a
// document source to an image sink.

mod document_models;
mod extraction_service;
mod flattener;
mod orchestrator;

pub use document_models::{ContentBlock, ImageData, PUBLIC_IMAGE_ROUTE};
pub use extraction_service::{DocumentSource, ExtractionError, ExtractionService};
pub use flattener::{ImageSink, ImageSinkError};
pub use orchestrator::{fan_out, DocumentResults};

#[cfg(test)]
pub(crate) use extraction_service::test_support;
