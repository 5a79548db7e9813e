//! HTTP-backed implementation of the `conversation_store::DocumentStore`
//! contract.
//!
//! Each user's conversation collection lives at `{base}/users/{user_id}`
//! as a single JSON document, read with GET and replaced wholesale with
//! PUT. The caller owns access control; this crate only attaches the
//! configured bearer token.

use std::time::Duration;

use conversation_store::{DocumentStore, DocumentStoreError, UserDocument};
use reqwest::StatusCode;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime configuration for the HTTP document store.
#[derive(Debug, Clone)]
pub struct HttpDocumentStoreConfig {
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub timeout: Duration,
}

impl HttpDocumentStoreConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_bearer_token(mut self, bearer_token: impl Into<String>) -> Self {
        self.bearer_token = Some(bearer_token.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Builds the per-user document endpoint from a base URL.
#[must_use]
pub fn user_document_url(base_url: &str, user_id: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/users/{user_id}")
}

pub struct HttpDocumentStore {
    config: HttpDocumentStoreConfig,
    client: reqwest::Client,
}

impl HttpDocumentStore {
    pub fn new(config: HttpDocumentStoreConfig) -> Result<Self, DocumentStoreError> {
        if config.base_url.trim().is_empty() {
            return Err(DocumentStoreError::remote(
                "configure",
                "",
                "base URL must not be empty",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| {
                DocumentStoreError::remote("configure", "", format!("building HTTP client: {error}"))
            })?;

        Ok(Self { config, client })
    }

    #[must_use]
    pub fn config(&self) -> &HttpDocumentStoreConfig {
        &self.config
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn block_on<T>(
        &self,
        operation: &'static str,
        user_id: &str,
        future: impl std::future::Future<Output = Result<T, DocumentStoreError>>,
    ) -> Result<T, DocumentStoreError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                DocumentStoreError::remote(
                    operation,
                    user_id,
                    format!("failed to initialize tokio runtime: {error}"),
                )
            })?;

        runtime.block_on(future)
    }

    async fn load_async(&self, user_id: &str) -> Result<Option<UserDocument>, DocumentStoreError> {
        let url = user_document_url(&self.config.base_url, user_id);
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|error| DocumentStoreError::remote("GET", user_id, error.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            return Err(DocumentStoreError::remote(
                "GET",
                user_id,
                status_message(status),
            ));
        }

        let document = response
            .json::<UserDocument>()
            .await
            .map_err(|error| DocumentStoreError::remote("GET", user_id, error.to_string()))?;
        Ok(Some(document))
    }

    async fn save_async(
        &self,
        user_id: &str,
        document: &UserDocument,
    ) -> Result<(), DocumentStoreError> {
        let url = user_document_url(&self.config.base_url, user_id);
        let response = self
            .authorize(self.client.put(&url))
            .json(document)
            .send()
            .await
            .map_err(|error| DocumentStoreError::remote("PUT", user_id, error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocumentStoreError::remote(
                "PUT",
                user_id,
                status_message(status),
            ));
        }

        Ok(())
    }
}

impl DocumentStore for HttpDocumentStore {
    fn load(&self, user_id: &str) -> Result<Option<UserDocument>, DocumentStoreError> {
        self.block_on("GET", user_id, self.load_async(user_id))
    }

    fn save(&self, user_id: &str, document: &UserDocument) -> Result<(), DocumentStoreError> {
        self.block_on("PUT", user_id, self.save_async(user_id, document))
    }
}

fn status_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => format!("{}", status.as_u16()),
    }
}
