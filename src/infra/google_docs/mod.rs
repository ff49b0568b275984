// =============================================================================
// GOOGLE DOCS MODULE
// =============================================================================
//
// Fetches documents from the Google Docs API for the extraction core.
//
// **Architecture:**
// This module lives in the infra layer because it handles external I/O
// (HTTP requests to Google APIs). The core only sees the `DocumentSource`
// trait and raw document JSON.
//
// **Authentication Options** (first configured one wins):
// 1. **Access token**: a bearer token passed in directly (`GOOGLE_ACCESS_TOKEN`)
// 2. **Service Account**: private docs shared with the service account email
//    (`GOOGLE_SERVICE_ACCOUNT_KEY` or `GOOGLE_SERVICE_ACCOUNT_JSON`)
// 3. **Installed-app OAuth 2.0**: the user's own documents, via a one-time
//    consent (`GOOGLE_OAUTH_CREDENTIALS` + `GOOGLE_OAUTH_TOKEN`)

use std::error::Error;

pub mod google_docs_client;
pub mod installed_app;
pub mod service_account;

pub use google_docs_client::{
    GoogleAuth, GoogleCredentialsConfig, GoogleDocsClient, DEFAULT_DOCS_API_BASE,
};

/// Read-only access to Google Docs.
pub const DOCUMENTS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/documents.readonly";

pub type AuthResult<T> = Result<T, Box<dyn Error + Send + Sync>>;
