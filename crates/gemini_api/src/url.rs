/// Default base URL for generative language API requests.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Builds the generateContent endpoint for a model, with the API key as the
/// `key` query parameter.
///
/// An empty base URL falls back to [`DEFAULT_GEMINI_BASE_URL`]; trailing
/// slashes are tolerated.
pub fn generate_content_url(base_url: &str, model_id: &str, api_key: &str) -> String {
    let base = if base_url.trim().is_empty() {
        DEFAULT_GEMINI_BASE_URL
    } else {
        base_url.trim()
    };
    let base = base.trim_end_matches('/');

    format!("{base}/models/{model_id}:generateContent?key={api_key}")
}
