//! Transport-only client primitives for the Gemini `generateContent`
//! endpoint.
//!
//! This crate owns request building, payload shapes, error parsing, and
//! cooperative cancellation for the non-streaming completion call. It
//! intentionally contains no auth/session code and no chat orchestration
//! coupling; callers supply a finished transcript payload and receive one
//! atomic response string.

pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod url;

pub use client::{CancellationSignal, GeminiApiClient};
pub use config::GeminiApiConfig;
pub use error::GeminiApiError;
pub use payload::{
    split_data_url, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    InlineData, Part,
};
pub use url::{generate_content_url, DEFAULT_GEMINI_BASE_URL};
