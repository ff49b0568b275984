// =============================================================================
// GOOGLE DOCS CLIENT
// =============================================================================
//
// Implements the core `DocumentSource` trait against the Docs REST API.
// The document JSON is handed back untouched; decoding into the typed model
// happens in the core so the raw endpoint can return exactly what Google sent.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

use super::installed_app::InstalledAppAuth;
use super::service_account::ServiceAccountAuth;
use super::AuthResult;
use crate::core::extraction::{DocumentSource, ExtractionError};

pub const DEFAULT_DOCS_API_BASE: &str = "https://docs.googleapis.com";

/// Where Google credentials come from. Checked in field order.
#[derive(Clone)]
pub struct GoogleCredentialsConfig {
    /// A ready-made bearer token, mostly useful for local testing.
    pub access_token: Option<String>,
    pub service_account_key_path: Option<PathBuf>,
    pub service_account_json: Option<String>,
    pub oauth_client_path: PathBuf,
    pub oauth_token_path: PathBuf,
}

// Secrets only show whether they are set.
impl fmt::Debug for GoogleCredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("GoogleCredentialsConfig")
            .field("access_token", &redacted(&self.access_token))
            .field("service_account_key_path", &self.service_account_key_path)
            .field("service_account_json", &redacted(&self.service_account_json))
            .field("oauth_client_path", &self.oauth_client_path)
            .field("oauth_token_path", &self.oauth_token_path)
            .finish()
    }
}

impl Default for GoogleCredentialsConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            service_account_key_path: None,
            service_account_json: None,
            oauth_client_path: PathBuf::from("credentials.json"),
            oauth_token_path: PathBuf::from("token.json"),
        }
    }
}

pub enum GoogleAuth {
    AccessToken(String),
    ServiceAccount(ServiceAccountAuth),
    InstalledApp(InstalledAppAuth),
}

impl GoogleAuth {
    pub async fn from_config(config: &GoogleCredentialsConfig) -> AuthResult<Self> {
        if let Some(token) = &config.access_token {
            return Ok(GoogleAuth::AccessToken(token.clone()));
        }

        if let Some(path) = &config.service_account_key_path {
            return Ok(GoogleAuth::ServiceAccount(
                ServiceAccountAuth::from_file(path).await?,
            ));
        }

        if let Some(json) = &config.service_account_json {
            return Ok(GoogleAuth::ServiceAccount(ServiceAccountAuth::from_json(
                json,
            )?));
        }

        Ok(GoogleAuth::InstalledApp(
            InstalledAppAuth::from_files(&config.oauth_client_path, &config.oauth_token_path)
                .await?,
        ))
    }

    pub async fn access_token(&self) -> AuthResult<String> {
        match self {
            GoogleAuth::AccessToken(token) => Ok(token.clone()),
            GoogleAuth::ServiceAccount(auth) => auth.get_access_token().await,
            GoogleAuth::InstalledApp(auth) => auth.get_access_token().await,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            GoogleAuth::AccessToken(_) => "static access token".to_string(),
            GoogleAuth::ServiceAccount(auth) => {
                format!("service account {}", auth.client_email())
            }
            GoogleAuth::InstalledApp(_) => "installed-app OAuth token".to_string(),
        }
    }
}

/// Client for the Google Docs `documents.get` endpoint.
pub struct GoogleDocsClient {
    client: Client,
    auth: GoogleAuth,
    api_base: String,
}

impl GoogleDocsClient {
    pub fn new(auth: GoogleAuth, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            auth,
            api_base: api_base.into(),
        }
    }

    fn document_url(&self, document_id: &str) -> String {
        format!(
            "{}/v1/documents/{}",
            self.api_base.trim_end_matches('/'),
            document_id
        )
    }
}

#[async_trait]
impl DocumentSource for GoogleDocsClient {
    async fn fetch_document(&self, document_id: &str) -> Result<Value, ExtractionError> {
        let token = self.auth.access_token().await.map_err(|e| {
            ExtractionError::Fetch(format!("Could not obtain an access token: {}", e))
        })?;

        tracing::debug!("Fetching Google Doc via API: {}", document_id);

        let response = self
            .client
            .get(self.document_url(document_id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ExtractionError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Fetch(format!(
                "Google Docs API error ({}): {}",
                status, text
            )));
        }

        let document: Value = response
            .json()
            .await
            .map_err(|e| ExtractionError::Fetch(e.to_string()))?;

        tracing::info!(
            "Fetched Google Doc '{}' ({})",
            document
                .get("title")
                .and_then(|title| title.as_str())
                .unwrap_or_default(),
            document_id
        );

        Ok(document)
    }
}
