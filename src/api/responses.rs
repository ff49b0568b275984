//! JSON envelopes returned per requested document.

use serde::Serialize;
use serde_json::Value;

use crate::core::extraction::{ContentBlock, ExtractionError, ImageData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
}

/// Result for one document on the image-only endpoint.
#[derive(Debug, Serialize)]
pub struct ImagesResult {
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageData>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Result<Vec<ImageData>, ExtractionError>> for ImagesResult {
    fn from(result: Result<Vec<ImageData>, ExtractionError>) -> Self {
        match result {
            Ok(images) => Self {
                status: ResultStatus::Success,
                images: Some(images),
                message: None,
            },
            Err(e) => Self {
                status: ResultStatus::Error,
                images: None,
                message: Some(e.to_string()),
            },
        }
    }
}

/// Result for one document on the full-content endpoint.
#[derive(Debug, Serialize)]
pub struct ContentResult {
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ContentBlock>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Result<Vec<ContentBlock>, ExtractionError>> for ContentResult {
    fn from(result: Result<Vec<ContentBlock>, ExtractionError>) -> Self {
        match result {
            Ok(content) => Self {
                status: ResultStatus::Success,
                content: Some(content),
                message: None,
            },
            Err(e) => Self {
                status: ResultStatus::Error,
                content: None,
                message: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: ResultStatus,
    pub message: String,
}

/// The raw endpoint returns the document itself on success, so only the
/// failure case gets an envelope.
pub fn raw_document_result(result: Result<Value, ExtractionError>) -> Value {
    match result {
        Ok(document) => document,
        Err(e) => serde_json::to_value(ErrorResponse {
            status: ResultStatus::Error,
            message: e.to_string(),
        })
        .unwrap_or(Value::Null),
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
