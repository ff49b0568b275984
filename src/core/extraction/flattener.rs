// Document flattener - turns the nested paragraph/table tree into a flat list
// of text and image blocks, downloading images as it goes.
//
// The walk is depth-first and strictly sequential: table cells are expanded in
// row-major order and spliced into the surrounding sequence, and each image is
// materialized (awaited) before the walk moves on, so numbering and output
// order both follow document order.

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

use super::document_models::{
    ContentBlock, InlineObjectTable, Paragraph, ParagraphElement, StructuralElement,
    PUBLIC_IMAGE_ROUTE,
};

/// Number given to the first image of every top-level extraction.
pub const FIRST_IMAGE_NUMBER: u32 = 1;

#[derive(Debug, Error)]
pub enum ImageSinkError {
    #[error("Download failed: {0}")]
    Download(String),
    #[error("Download returned HTTP {0}")]
    Status(u16),
    #[error("Could not store image: {0}")]
    Storage(#[from] std::io::Error),
}

/// Downloads, stores and encodes images referenced by a document.
#[async_trait]
pub trait ImageSink: Send + Sync {
    /// Fetch `source_uri`, persist it under `document_id`/`file_name` and
    /// return the base64 encoding of its bytes.
    async fn materialize(
        &self,
        source_uri: &str,
        document_id: &str,
        file_name: &str,
    ) -> Result<String, ImageSinkError>;

    /// Public path the stored image is served from.
    fn public_url(&self, document_id: &str, file_name: &str) -> String {
        format!("{}/{}/{}", PUBLIC_IMAGE_ROUTE, document_id, file_name)
    }
}

/// File name for the `number`-th image of a document.
pub fn image_file_name(number: u32) -> String {
    format!("imagem_{}.png", number)
}

type FlattenFuture<'f> = Pin<Box<dyn Future<Output = Vec<ContentBlock>> + Send + 'f>>;

/// Flattens the structural elements of one document.
pub struct DocumentFlattener<'a, S: ImageSink + ?Sized> {
    document_id: &'a str,
    inline_objects: &'a InlineObjectTable,
    sink: &'a S,
}

impl<'a, S: ImageSink + ?Sized> DocumentFlattener<'a, S> {
    pub fn new(document_id: &'a str, inline_objects: &'a InlineObjectTable, sink: &'a S) -> Self {
        Self {
            document_id,
            inline_objects,
            sink,
        }
    }

    /// Flatten a whole document body, numbering images from [`FIRST_IMAGE_NUMBER`].
    pub async fn flatten_document(&self, elements: &[StructuralElement]) -> Vec<ContentBlock> {
        let mut counter = FIRST_IMAGE_NUMBER;
        self.flatten(elements, &mut counter).await
    }

    /// Flatten `elements`, continuing image numbering from `counter`.
    ///
    /// Table cells recurse through here with the same counter, so an image
    /// inside a cell gets the next number after whatever preceded the table.
    pub fn flatten<'f>(
        &'f self,
        elements: &'f [StructuralElement],
        counter: &'f mut u32,
    ) -> FlattenFuture<'f> {
        Box::pin(async move {
            let mut blocks = Vec::new();

            for element in elements {
                match element {
                    StructuralElement::Paragraph(paragraph) => {
                        self.flatten_paragraph(paragraph, counter, &mut blocks)
                            .await;
                    }
                    StructuralElement::Table(table) => {
                        for row in &table.table_rows {
                            for cell in &row.table_cells {
                                let cell_blocks = self.flatten(&cell.content, counter).await;
                                blocks.extend(cell_blocks);
                            }
                        }
                    }
                    StructuralElement::Unsupported => {}
                }
            }

            blocks
        })
    }

    async fn flatten_paragraph(
        &self,
        paragraph: &Paragraph,
        counter: &mut u32,
        blocks: &mut Vec<ContentBlock>,
    ) {
        let mut pending = String::new();

        for element in &paragraph.elements {
            match element {
                ParagraphElement::TextRun(content) => pending.push_str(content),
                ParagraphElement::InlineObject(object_id) => {
                    flush_text(&mut pending, blocks);
                    if let Some(block) = self.materialize_image(object_id, counter).await {
                        blocks.push(block);
                    }
                }
                ParagraphElement::Unsupported => {}
            }
        }

        flush_text(&mut pending, blocks);
    }

    /// Resolve an inline object and, if it is an image, hand it to the sink.
    ///
    /// Unknown ids and non-image objects produce nothing and leave the counter
    /// alone. Sink failures still produce a block, carrying the error.
    async fn materialize_image(&self, object_id: &str, counter: &mut u32) -> Option<ContentBlock> {
        let Some(source_uri) = self
            .inline_objects
            .get(object_id)
            .and_then(|object| object.image_source_uri())
        else {
            tracing::debug!(
                "Skipping inline object {} in document {}: not an image",
                object_id,
                self.document_id
            );
            return None;
        };

        let file_name = image_file_name(*counter);
        let url = self.sink.public_url(self.document_id, &file_name);

        let block = match self
            .sink
            .materialize(source_uri, self.document_id, &file_name)
            .await
        {
            Ok(base64) => ContentBlock::Image {
                url,
                base64,
                error: None,
            },
            Err(e) => {
                tracing::warn!(
                    "Failed to materialize {} for document {}: {}",
                    file_name,
                    self.document_id,
                    e
                );
                ContentBlock::Image {
                    url,
                    base64: String::new(),
                    error: Some(e.to_string()),
                }
            }
        };

        *counter += 1;
        Some(block)
    }
}

/// Emit buffered paragraph text as one block, minus a single trailing newline.
fn flush_text(pending: &mut String, blocks: &mut Vec<ContentBlock>) {
    if pending.is_empty() {
        return;
    }

    let mut text = std::mem::take(pending);
    if text.ends_with('\n') {
        text.pop();
    }
    blocks.push(ContentBlock::text(text));
}
