use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum GeminiApiError {
    MissingApiKey,
    Request(reqwest::Error),
    Status(StatusCode, String),
    EmptyResponse,
    Serde(JsonError),
    Cancelled,
    Unknown(String),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(rename = "error")]
    pub value: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayloadFields {
    pub message: Option<String>,
    pub status: Option<String>,
}

/// Extracts a human-readable message from a non-success response body.
///
/// Error bodies carry `{"error":{"code","message","status"}}`; anything
/// unparseable falls back to the HTTP reason phrase.
#[must_use]
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(fields) = payload.value {
            if let Some(message) = fields
                .message
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
            {
                return message.to_string();
            }
            if let Some(reason) = fields
                .status
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
            {
                return reason.to_string();
            }
        }
    }

    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

impl fmt::Display for GeminiApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "API key is required"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::EmptyResponse => write!(f, "response contained no candidate text"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::Cancelled => write!(f, "request cancelled"),
            Self::Unknown(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for GeminiApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(error) => Some(error),
            Self::Serde(error) => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GeminiApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for GeminiApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

impl GeminiApiError {
    /// True for user-initiated cancellation, never treated as a failure.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
