// Document model for extraction.
//
// These types mirror the subset of the Google Docs `documents.get` response the
// flattener needs. The API distinguishes element kinds by which optional field
// is present; here every node decodes into a tagged enum so the traversal can
// match exhaustively instead of probing for missing fields.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Route prefix under which downloaded images are publicly served.
pub const PUBLIC_IMAGE_ROUTE: &str = "/images";

// =============================================================================
// INPUT TREE
// =============================================================================

/// Inline objects keyed by the id used in `inlineObjectElement` references.
pub type InlineObjectTable = HashMap<String, InlineObject>;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[allow(dead_code)]
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub title: String,
    pub body: Option<Body>,
    #[serde(default)]
    pub inline_objects: InlineObjectTable,
}

impl Document {
    /// Top-level elements of the body, empty when the document has no body.
    pub fn content(&self) -> &[StructuralElement] {
        self.body
            .as_ref()
            .map(|body| body.content.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

/// A node of the document body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WireStructuralElement")]
pub enum StructuralElement {
    Paragraph(Paragraph),
    Table(Table),
    /// Section breaks, tables of contents and anything else without text we extract.
    Unsupported,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub elements: Vec<ParagraphElement>,
}

/// A run inside a paragraph.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WireParagraphElement")]
pub enum ParagraphElement {
    TextRun(String),
    /// Reference into the document's [`InlineObjectTable`].
    InlineObject(String),
    Unsupported,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub table_rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineObject {
    pub inline_object_properties: Option<InlineObjectProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineObjectProperties {
    pub embedded_object: Option<EmbeddedObject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedObject {
    pub image_properties: Option<ImageProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProperties {
    #[serde(default)]
    pub content_uri: String,
}

impl InlineObject {
    /// An inline object holding an image, pointing at `content_uri`.
    #[cfg(test)]
    pub fn image(content_uri: impl Into<String>) -> Self {
        Self {
            inline_object_properties: Some(InlineObjectProperties {
                embedded_object: Some(EmbeddedObject {
                    image_properties: Some(ImageProperties {
                        content_uri: content_uri.into(),
                    }),
                }),
            }),
        }
    }

    /// The image source URI, if this object carries image properties at all.
    pub fn image_source_uri(&self) -> Option<&str> {
        self.inline_object_properties
            .as_ref()?
            .embedded_object
            .as_ref()?
            .image_properties
            .as_ref()
            .map(|image| image.content_uri.as_str())
    }
}

// Raw API shapes. Only used to pick the enum variant during decoding.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStructuralElement {
    paragraph: Option<Paragraph>,
    table: Option<Table>,
}

impl From<WireStructuralElement> for StructuralElement {
    fn from(wire: WireStructuralElement) -> Self {
        match (wire.paragraph, wire.table) {
            (Some(paragraph), _) => StructuralElement::Paragraph(paragraph),
            (None, Some(table)) => StructuralElement::Table(table),
            (None, None) => StructuralElement::Unsupported,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireParagraphElement {
    text_run: Option<WireTextRun>,
    inline_object_element: Option<WireInlineObjectElement>,
}

#[derive(Deserialize)]
struct WireTextRun {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInlineObjectElement {
    #[serde(default)]
    inline_object_id: String,
}

impl From<WireParagraphElement> for ParagraphElement {
    fn from(wire: WireParagraphElement) -> Self {
        match (wire.text_run, wire.inline_object_element) {
            (Some(run), _) => ParagraphElement::TextRun(run.content),
            (None, Some(object)) => ParagraphElement::InlineObject(object.inline_object_id),
            (None, None) => ParagraphElement::Unsupported,
        }
    }
}

// =============================================================================
// OUTPUT BLOCKS
// =============================================================================

/// A flattened unit of output, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text {
        content: String,
    },
    Image {
        url: String,
        base64: String,
        /// Set when the image could not be downloaded or stored.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl ContentBlock {
    pub fn text(content: impl Into<String>) -> Self {
        ContentBlock::Text {
            content: content.into(),
        }
    }

    pub fn into_image(self) -> Option<ImageData> {
        match self {
            ContentBlock::Image { url, base64, error } => Some(ImageData { url, base64, error }),
            ContentBlock::Text { .. } => None,
        }
    }
}

/// Image-only projection of a [`ContentBlock::Image`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageData {
    pub url: String,
    pub base64: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
