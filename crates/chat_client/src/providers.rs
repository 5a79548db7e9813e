use std::sync::Arc;

use completion_provider::{CompletionProvider, ProviderInitError};
use completion_provider_gemini::{GeminiProvider, GeminiProviderConfig, GEMINI_PROVIDER_ID};
use completion_provider_mock::{MockProvider, MOCK_PROVIDER_ID};

pub const DEFAULT_PROVIDER_ID: &str = MOCK_PROVIDER_ID;
pub const PROVIDER_ENV_VAR: &str = "PLUME_PROVIDER";
pub const GEMINI_API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_ENV_VAR: &str = "PLUME_MODEL";

pub fn provider_from_env() -> Result<Arc<dyn CompletionProvider>, ProviderInitError> {
    let provider_id = std::env::var(PROVIDER_ENV_VAR)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    provider_for_id(provider_id.as_deref().unwrap_or(DEFAULT_PROVIDER_ID))
}

pub fn provider_for_id(provider_id: &str) -> Result<Arc<dyn CompletionProvider>, ProviderInitError> {
    match provider_id {
        MOCK_PROVIDER_ID => Ok(Arc::new(MockProvider::new(Vec::new()))),
        GEMINI_PROVIDER_ID => gemini_provider_from_env(),
        unknown => Err(ProviderInitError::new(format!(
            "Unsupported provider '{unknown}'. Available providers: {MOCK_PROVIDER_ID}, {GEMINI_PROVIDER_ID}"
        ))),
    }
}

fn gemini_provider_from_env() -> Result<Arc<dyn CompletionProvider>, ProviderInitError> {
    let api_key = std::env::var(GEMINI_API_KEY_ENV_VAR)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            ProviderInitError::new(format!(
                "{GEMINI_API_KEY_ENV_VAR} must be set when {PROVIDER_ENV_VAR}={GEMINI_PROVIDER_ID}"
            ))
        })?;

    let mut config = GeminiProviderConfig::new(api_key);
    if let Ok(model_id) = std::env::var(MODEL_ENV_VAR) {
        let model_id = model_id.trim();
        if !model_id.is_empty() {
            config = config.with_model_id(model_id);
        }
    }

    Ok(Arc::new(GeminiProvider::new(config)?))
}
