use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use reqwest::Client;

use crate::config::GeminiApiConfig;
use crate::error::{parse_error_message, GeminiApiError};
use crate::payload::{GenerateContentRequest, GenerateContentResponse};
use crate::url::generate_content_url;

/// Optional cancellation signal shared across the request lifecycle.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct GeminiApiClient {
    http: Client,
    config: GeminiApiConfig,
}

impl GeminiApiClient {
    pub fn new(config: GeminiApiConfig) -> Result<Self, GeminiApiError> {
        if config.api_key.trim().is_empty() {
            return Err(GeminiApiError::MissingApiKey);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(GeminiApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GeminiApiConfig {
        &self.config
    }

    pub fn endpoint(&self) -> String {
        generate_content_url(
            &self.config.base_url,
            &self.config.model_id,
            &self.config.api_key,
        )
    }

    pub fn build_request(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<reqwest::RequestBuilder, GeminiApiError> {
        if request.contents.is_empty() {
            return Err(GeminiApiError::Unknown(
                "'contents' must carry at least one transcript turn".to_string(),
            ));
        }

        let payload = self.request_with_transport_defaults(request);
        Ok(self.http.post(self.endpoint()).json(&payload))
    }

    fn request_with_transport_defaults(
        &self,
        request: &GenerateContentRequest,
    ) -> GenerateContentRequest {
        let mut payload = request.clone();
        payload.generation_config.temperature = self.config.temperature;
        payload.generation_config.max_output_tokens = self.config.max_output_tokens;
        payload
    }

    /// Executes one generateContent request to a single atomic response
    /// string. No automatic retry: failures surface immediately and the
    /// caller's next attempt is the implicit retry.
    pub async fn generate(
        &self,
        request: &GenerateContentRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<String, GeminiApiError> {
        if is_cancelled(cancellation) {
            return Err(GeminiApiError::Cancelled);
        }

        let response = self.build_request(request)?.send();
        let response = await_or_cancel(response, cancellation)
            .await?
            .map_err(GeminiApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = await_or_cancel(response.text(), cancellation)
                .await?
                .unwrap_or_default();
            return Err(GeminiApiError::Status(
                status,
                parse_error_message(status, &body),
            ));
        }

        let parsed = await_or_cancel(response.json::<GenerateContentResponse>(), cancellation)
            .await?
            .map_err(GeminiApiError::from)?;

        if is_cancelled(cancellation) {
            return Err(GeminiApiError::Cancelled);
        }

        parsed
            .first_candidate_text()
            .ok_or(GeminiApiError::EmptyResponse)
    }
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, GeminiApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(GeminiApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(GeminiApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}
