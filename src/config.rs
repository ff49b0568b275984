// Runtime configuration, read from the environment (and `.env` via dotenv).

use std::path::PathBuf;

use crate::infra::google_docs::{GoogleCredentialsConfig, DEFAULT_DOCS_API_BASE};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_IMAGES_DIR: &str = "extracted_images";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_addr: String,
    /// Where downloaded images are written and served from.
    pub images_dir: PathBuf,
    pub docs_api_base: String,
    pub credentials: GoogleCredentialsConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = GoogleCredentialsConfig::default();

        Self {
            server_addr: get("SERVER_ADDR").unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string()),
            images_dir: get("IMAGES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGES_DIR)),
            docs_api_base: get("GOOGLE_DOCS_API_BASE")
                .unwrap_or_else(|| DEFAULT_DOCS_API_BASE.to_string()),
            credentials: GoogleCredentialsConfig {
                access_token: get("GOOGLE_ACCESS_TOKEN"),
                service_account_key_path: get("GOOGLE_SERVICE_ACCOUNT_KEY").map(PathBuf::from),
                service_account_json: get("GOOGLE_SERVICE_ACCOUNT_JSON"),
                oauth_client_path: get("GOOGLE_OAUTH_CREDENTIALS")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.oauth_client_path),
                oauth_token_path: get("GOOGLE_OAUTH_TOKEN")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.oauth_token_path),
            },
        }
    }
}
