// Extraction service - fetches a document from its source and runs it
// through the flattener.
//
// This module knows nothing about HTTP servers or Google credentials. The
// source and sink are injected so the whole pipeline can be tested with
// in-memory fakes.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use super::document_models::{ContentBlock, Document, ImageData};
use super::flattener::{DocumentFlattener, ImageSink};

/// Errors reported for a single requested document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid document id: {0}")]
    InvalidDocumentId(String),
    #[error("Could not fetch document: {0}")]
    Fetch(String),
    #[error("Could not decode document: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Supplies documents exactly as the external document service returns them.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_document(&self, document_id: &str) -> Result<Value, ExtractionError>;
}

#[derive(Clone)]
pub struct ExtractionService {
    source: Arc<dyn DocumentSource>,
    sink: Arc<dyn ImageSink>,
}

impl ExtractionService {
    pub fn new(source: Arc<dyn DocumentSource>, sink: Arc<dyn ImageSink>) -> Self {
        Self { source, sink }
    }

    /// Accepts either a bare document id or a `docs.google.com/document/[u/<n>/]d/<id>/...` URL.
    ///
    /// The id ends up as a directory name for downloaded images, so anything
    /// outside `[A-Za-z0-9_-]` is rejected.
    pub fn normalize_document_id(id_or_url: &str) -> Result<String, ExtractionError> {
        let trimmed = id_or_url.trim();

        let candidate = if trimmed.contains("docs.google.com") {
            // Multi-account links put `/u/<n>` between `/document` and `/d/`.
            trimmed.find("/document/").and_then(|start| {
                let path = &trimmed[start + "/document".len()..];
                let path = &path[..path.find(['?', '#']).unwrap_or(path.len())];
                path.find("/d/").map(|d| {
                    let after_d = &path[d + "/d/".len()..];
                    &after_d[..after_d.find('/').unwrap_or(after_d.len())]
                })
            })
        } else {
            Some(trimmed)
        };

        match candidate {
            Some(id)
                if !id.is_empty()
                    && id
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') =>
            {
                Ok(id.to_string())
            }
            _ => Err(ExtractionError::InvalidDocumentId(id_or_url.to_string())),
        }
    }

    /// Only the images of a document, in document order.
    pub async fn extract_images(&self, id_or_url: &str) -> Result<Vec<ImageData>, ExtractionError> {
        let blocks = self.extract_full_content(id_or_url).await?;
        Ok(blocks
            .into_iter()
            .filter_map(ContentBlock::into_image)
            .collect())
    }

    /// Every text and image block of a document, in document order.
    pub async fn extract_full_content(
        &self,
        id_or_url: &str,
    ) -> Result<Vec<ContentBlock>, ExtractionError> {
        let document_id = Self::normalize_document_id(id_or_url)?;
        let raw = self.source.fetch_document(&document_id).await?;
        let document: Document = serde_json::from_value(raw)?;

        let flattener =
            DocumentFlattener::new(&document_id, &document.inline_objects, self.sink.as_ref());
        let blocks = flattener.flatten_document(document.content()).await;

        tracing::info!(
            "Extracted {} block(s) from document {} ('{}')",
            blocks.len(),
            document_id,
            document.title
        );
        Ok(blocks)
    }

    /// The document as returned by the source, without flattening.
    pub async fn extract_raw_document(&self, id_or_url: &str) -> Result<Value, ExtractionError> {
        let document_id = Self::normalize_document_id(id_or_url)?;
        self.source.fetch_document(&document_id).await
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{EchoSink, StaticDocumentSource};
    use super::*;
    use serde_json::json;

    fn sample_document() -> Value {
        json!({
            "documentId": "doc1",
            "title": "Sample",
            "body": { "content": [
                { "paragraph": { "elements": [
                    { "textRun": { "content": "Intro " } },
                    { "textRun": { "content": "text\n" } }
                ] } },
                { "table": { "tableRows": [ { "tableCells": [ { "content": [
                    { "paragraph": { "elements": [
                        { "inlineObjectElement": { "inlineObjectId": "kix.img" } }
                    ] } }
                ] } ] } ] } }
            ] },
            "inlineObjects": {
                "kix.img": { "inlineObjectProperties": { "embeddedObject": {
                    "imageProperties": { "contentUri": "https://img/1" }
                } } }
            }
        })
    }

    fn service(source: StaticDocumentSource) -> ExtractionService {
        ExtractionService::new(Arc::new(source), Arc::new(EchoSink))
    }

    #[test]
    fn normalizes_bare_ids_and_urls() {
        assert_eq!(
            ExtractionService::normalize_document_id("1abc_123-xyz").unwrap(),
            "1abc_123-xyz"
        );
        assert_eq!(
            ExtractionService::normalize_document_id(
                "https://docs.google.com/document/d/1abc123xyz/edit?tab=t.0"
            )
            .unwrap(),
            "1abc123xyz"
        );
        assert_eq!(
            ExtractionService::normalize_document_id(
                "https://docs.google.com/document/d/1abc123xyz"
            )
            .unwrap(),
            "1abc123xyz"
        );
    }

    #[test]
    fn normalizes_multi_account_urls() {
        assert_eq!(
            ExtractionService::normalize_document_id(
                "https://docs.google.com/document/u/1/d/1abc123xyz/edit"
            )
            .unwrap(),
            "1abc123xyz"
        );
        assert_eq!(
            ExtractionService::normalize_document_id(
                "https://docs.google.com/document/u/0/d/1abc123xyz?usp=sharing"
            )
            .unwrap(),
            "1abc123xyz"
        );
    }

    #[test]
    fn rejects_ids_that_could_escape_the_image_directory() {
        for bad in ["", "../etc", "a/b", "doc id", "https://docs.google.com/spreadsheets/x"] {
            assert!(
                matches!(
                    ExtractionService::normalize_document_id(bad),
                    Err(ExtractionError::InvalidDocumentId(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn full_content_flattens_document() {
        let service = service(StaticDocumentSource::with(vec![("doc1", sample_document())]));

        let blocks = service.extract_full_content("doc1").await.unwrap();

        assert_eq!(
            blocks,
            vec![
                ContentBlock::text("Intro text"),
                ContentBlock::Image {
                    url: "/images/doc1/imagem_1.png".to_string(),
                    base64: "b64:https://img/1".to_string(),
                    error: None,
                },
            ]
        );
    }

    #[tokio::test]
    async fn images_keep_only_image_blocks() {
        let service = service(StaticDocumentSource::with(vec![("doc1", sample_document())]));

        let images = service.extract_images("doc1").await.unwrap();

        assert_eq!(
            images,
            vec![ImageData {
                url: "/images/doc1/imagem_1.png".to_string(),
                base64: "b64:https://img/1".to_string(),
                error: None,
            }]
        );
    }

    #[tokio::test]
    async fn each_extraction_restarts_numbering() {
        let service = service(StaticDocumentSource::with(vec![("doc1", sample_document())]));

        let first = service.extract_images("doc1").await.unwrap();
        let second = service.extract_images("doc1").await.unwrap();

        assert_eq!(first[0].url, "/images/doc1/imagem_1.png");
        assert_eq!(second[0].url, "/images/doc1/imagem_1.png");
    }

    #[tokio::test]
    async fn raw_document_is_returned_untouched() {
        let service = service(StaticDocumentSource::with(vec![("doc1", sample_document())]));

        let raw = service
            .extract_raw_document("https://docs.google.com/document/d/doc1/edit")
            .await
            .unwrap();

        assert_eq!(raw, sample_document());
    }

    #[tokio::test]
    async fn fetch_failure_is_reported() {
        let service = service(StaticDocumentSource::default());

        let err = service.extract_full_content("nope").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Fetch(_)));
        assert!(err.to_string().contains("nope"));
    }

    #[tokio::test]
    async fn invalid_id_never_reaches_the_source() {
        let source = Arc::new(StaticDocumentSource::default());
        let service = ExtractionService::new(source.clone(), Arc::new(EchoSink));

        let err = service.extract_images("../secret").await.unwrap_err();

        assert!(matches!(err, ExtractionError::InvalidDocumentId(_)));
        assert!(source.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn undecodable_document_is_a_decode_error() {
        let service = service(StaticDocumentSource::with(vec![(
            "doc1",
            json!({ "body": { "content": "not a list" } }),
        )]));

        let err = service.extract_full_content("doc1").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Decode(_)));
    }
}
