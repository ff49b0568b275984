use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::extraction::{ImageSink, ImageSinkError};

/// Downloads images into `<root>/<document_id>/<file_name>`.
///
/// The same root is served statically, which is what makes the public URLs
/// handed out by [`ImageSink::public_url`] resolvable.
pub struct FileImageSink {
    client: Client,
    root: PathBuf,
}

impl FileImageSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn download(&self, source_uri: &str) -> Result<Bytes, ImageSinkError> {
        let response = self
            .client
            .get(source_uri)
            .send()
            .await
            .map_err(|e| ImageSinkError::Download(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageSinkError::Status(response.status().as_u16()));
        }

        response
            .bytes()
            .await
            .map_err(|e| ImageSinkError::Download(e.to_string()))
    }
}

#[async_trait]
impl ImageSink for FileImageSink {
    async fn materialize(
        &self,
        source_uri: &str,
        document_id: &str,
        file_name: &str,
    ) -> Result<String, ImageSinkError> {
        let bytes = self.download(source_uri).await?;

        let dir = self.root.join(document_id);
        fs::create_dir_all(&dir).await?;
        let path = dir.join(file_name);
        fs::write(&path, &bytes).await?;

        tracing::debug!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(STANDARD.encode(&bytes))
    }
}
