// =============================================================================
// INSTALLED-APP OAUTH2 (USER CONSENT)
// =============================================================================
//
// For personal documents that are not shared with a service account.
//
// **Files:**
// - `credentials.json`: OAuth client downloaded from the Cloud Console
//   ("Desktop app" or "Web application" client).
// - `token.json`: the user's token, written after the first consent. It uses
//   the same field names as other Google client libraries (`access_token`,
//   `token_type`, `refresh_token`, `expiry`), so an existing file can be reused.
//
// On first start without a token file the consent URL is printed and the
// authorization code is read from stdin.

use chrono::{DateTime, Datelike, Duration, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::RwLock;

use super::{AuthResult, DOCUMENTS_READONLY_SCOPE};

const DEFAULT_REDIRECT_URI: &str = "http://localhost";

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<OAuthClientConfig>,
    web: Option<OAuthClientConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthClientConfig {
    client_id: String,
    client_secret: String,
    auth_uri: String,
    token_uri: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl OAuthClientConfig {
    /// Reads the `installed` (or `web`) section of a client secret file.
    pub fn from_json(json: &str) -> AuthResult<Self> {
        let file: ClientSecretFile = serde_json::from_str(json)?;
        file.installed
            .or(file.web)
            .ok_or_else(|| "OAuth client file has neither an 'installed' nor a 'web' section".into())
    }

    fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_REDIRECT_URI)
    }

    /// URL the user opens to grant read-only access to their documents.
    pub fn consent_url(&self) -> AuthResult<Url> {
        let url = Url::parse_with_params(
            &self.auth_uri,
            &[
                ("access_type", "offline"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri()),
                ("response_type", "code"),
                ("scope", DOCUMENTS_READONLY_SCOPE),
                ("state", "state-token"),
            ],
        )?;
        Ok(url)
    }
}

/// A user token as persisted in `token.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Expiry, treating the zero timestamp some libraries write as "never".
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiry.filter(|expiry| expiry.year() > 1)
    }

    /// Usable for at least another minute.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expires_at() {
            Some(expiry) => expiry - Duration::seconds(60) > now,
            None => true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl OAuthTokenResponse {
    fn into_stored(self, previous_refresh_token: Option<String>) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            token_type: self.token_type,
            // Refresh responses usually omit the refresh token; keep the old one.
            refresh_token: self.refresh_token.or(previous_refresh_token),
            expiry: self
                .expires_in
                .map(|seconds| Utc::now() + Duration::seconds(seconds)),
        }
    }
}

/// Authenticator backed by a user's OAuth2 consent.
pub struct InstalledAppAuth {
    config: OAuthClientConfig,
    client: Client,
    token: RwLock<StoredToken>,
}

impl InstalledAppAuth {
    pub fn new(config: OAuthClientConfig, token: StoredToken) -> Self {
        Self {
            config,
            client: Client::new(),
            token: RwLock::new(token),
        }
    }

    /// Loads the client file and the saved token, asking the user for consent
    /// on stdin when no token has been saved yet.
    pub async fn from_files(credentials_path: &Path, token_path: &Path) -> AuthResult<Self> {
        let content = tokio::fs::read_to_string(credentials_path)
            .await
            .map_err(|e| {
                format!(
                    "Could not read OAuth client file {}: {}",
                    credentials_path.display(),
                    e
                )
            })?;
        let config = OAuthClientConfig::from_json(&content)?;

        let token = match load_token(token_path).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("No usable token at {}: {}", token_path.display(), e);
                let auth = Self::new(config.clone(), StoredToken::default());
                let token = auth.authorize_interactively().await?;
                save_token(token_path, &token).await?;
                token
            }
        };

        Ok(Self::new(config, token))
    }

    /// Gets a valid access token, refreshing it with the refresh token if needed.
    pub async fn get_access_token(&self) -> AuthResult<String> {
        {
            let token = self.token.read().await;
            if token.is_fresh(Utc::now()) {
                return Ok(token.access_token.clone());
            }
        }

        let mut token = self.token.write().await;
        // Another request may have refreshed while we waited for the lock.
        if token.is_fresh(Utc::now()) {
            return Ok(token.access_token.clone());
        }

        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or("Access token expired and no refresh token is available")?;

        tracing::debug!("Refreshing Google OAuth access token");
        let refreshed = self
            .request_token(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .await?;

        *token = refreshed.into_stored(Some(refresh_token));
        Ok(token.access_token.clone())
    }

    async fn authorize_interactively(&self) -> AuthResult<StoredToken> {
        let url = self.config.consent_url()?;
        println!(
            "Open this URL in your browser and authorize the application:\n{}",
            url
        );
        print!("Enter the authorization code: ");
        std::io::stdout().flush()?;

        let mut code = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut code)
            .await
            .map_err(|e| format!("Could not read the authorization code: {}", e))?;
        let code = code.trim();
        if code.is_empty() {
            return Err("No authorization code entered".into());
        }

        let response = self
            .request_token(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri()),
                ("grant_type", "authorization_code"),
            ])
            .await?;
        Ok(response.into_stored(None))
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> AuthResult<OAuthTokenResponse> {
        let response = self
            .client
            .post(&self.config.token_uri)
            .form(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(format!("Token request failed ({}): {}", status, text).into());
        }

        Ok(response.json().await?)
    }
}

async fn load_token(path: &Path) -> AuthResult<StoredToken> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

async fn save_token(path: &Path, token: &StoredToken) -> AuthResult<()> {
    tracing::info!("Saving OAuth token to {}", path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, serde_json::to_string_pretty(token)?).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    }

    Ok(())
}
