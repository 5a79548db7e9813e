//! Gemini-backed implementation of the shared `completion_provider`
//! contract.
//!
//! This adapter translates provider-neutral transcript messages into the
//! `gemini_api` wire payload and maps transport outcomes onto the
//! cancellation-aware completion result.

use std::sync::Arc;
use std::time::Duration;

use completion_provider::{
    CancelSignal, ChatMessage, ChatRole, CompletionError, CompletionProvider, CompletionRequest,
    ProviderInitError, ProviderProfile,
};
use gemini_api::{
    split_data_url, Content, GeminiApiClient, GeminiApiConfig, GeminiApiError,
    GenerateContentRequest, Part,
};

/// Stable provider identifier used by startup selection.
pub const GEMINI_PROVIDER_ID: &str = "gemini";

/// Runtime configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiProviderConfig {
    pub api_key: String,
    pub model_id: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl GeminiProviderConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model_id: None,
            base_url: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn into_gemini_api_config(self) -> GeminiApiConfig {
        let mut config = GeminiApiConfig::new(self.api_key);

        if let Some(model_id) = self.model_id {
            config = config.with_model_id(model_id);
        }

        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        config
    }
}

trait GenerateClient: Send + Sync {
    fn generate(
        &self,
        request: &GenerateContentRequest,
        cancel: &CancelSignal,
    ) -> Result<String, GeminiApiError>;

    fn model_id(&self) -> String;
}

#[derive(Debug)]
struct DefaultGenerateClient {
    client: GeminiApiClient,
}

impl GenerateClient for DefaultGenerateClient {
    fn generate(
        &self,
        request: &GenerateContentRequest,
        cancel: &CancelSignal,
    ) -> Result<String, GeminiApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                GeminiApiError::Unknown(format!("failed to initialize tokio runtime: {error}"))
            })?;

        runtime.block_on(self.client.generate(request, Some(cancel)))
    }

    fn model_id(&self) -> String {
        self.client.config().model_id.clone()
    }
}

/// `CompletionProvider` adapter backed by `gemini_api` transport primitives.
pub struct GeminiProvider {
    generate_client: Arc<dyn GenerateClient>,
}

impl GeminiProvider {
    /// Creates a provider using real Gemini transport.
    pub fn new(config: GeminiProviderConfig) -> Result<Self, ProviderInitError> {
        let client = GeminiApiClient::new(config.into_gemini_api_config())
            .map_err(|error| ProviderInitError::new(error.to_string()))?;

        Ok(Self {
            generate_client: Arc::new(DefaultGenerateClient { client }),
        })
    }

    #[cfg(test)]
    fn with_generate_client(generate_client: Arc<dyn GenerateClient>) -> Self {
        Self { generate_client }
    }
}

impl CompletionProvider for GeminiProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: GEMINI_PROVIDER_ID.to_string(),
            model_id: self.generate_client.model_id(),
        }
    }

    fn complete(
        &self,
        request: CompletionRequest,
        cancel: CancelSignal,
    ) -> Result<String, CompletionError> {
        let payload = build_payload(&request.messages);

        match self.generate_client.generate(&payload, &cancel) {
            Ok(text) => Ok(text),
            Err(error) if error.is_cancelled() => Err(CompletionError::Cancelled),
            Err(error) => Err(CompletionError::Failed(error.to_string())),
        }
    }
}

fn build_payload(messages: &[ChatMessage]) -> GenerateContentRequest {
    let contents = messages.iter().map(content_for_message).collect();
    GenerateContentRequest::new(contents)
}

fn content_for_message(message: &ChatMessage) -> Content {
    let mut parts = Vec::new();

    if !message.content.is_empty() {
        parts.push(Part::text(message.content.clone()));
    }

    for image in &message.images {
        // Attachments may arrive as raw base64 or as a full data URL.
        if let Some((mime_type, data)) = split_data_url(&image.data) {
            parts.push(Part::inline_data(mime_type, data));
        } else {
            parts.push(Part::inline_data(
                image.mime_type.clone(),
                image.data.clone(),
            ));
        }
    }

    match message.role {
        ChatRole::User => Content::user(parts),
        ChatRole::Assistant => Content::model(parts),
    }
}
