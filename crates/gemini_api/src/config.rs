use std::time::Duration;

use crate::url::DEFAULT_GEMINI_BASE_URL;

/// Default generation model.
pub const DEFAULT_MODEL_ID: &str = "gemini-2.0-flash";
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Default response token budget.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

/// Transport configuration for generateContent requests.
#[derive(Debug, Clone)]
pub struct GeminiApiConfig {
    /// API key carried as the `key` query parameter.
    pub api_key: String,
    /// Model identifier embedded in the request path.
    pub model_id: String,
    /// Base URL for the generative language API.
    pub base_url: String,
    /// Sampling temperature forwarded in `generationConfig`.
    pub temperature: f64,
    /// Response token budget forwarded in `generationConfig`.
    pub max_output_tokens: u32,
    /// Optional request timeout.
    pub timeout: Option<Duration>,
}

impl Default for GeminiApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout: None,
        }
    }
}

impl GeminiApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
