//! Minimal provider-agnostic contract for executing one completion request.
//!
//! This crate intentionally defines only the shared request/response types
//! and the cancellation handshake. It excludes provider transport details,
//! wire payloads, and multi-request orchestration concerns.

use std::fmt;
use std::sync::{atomic::AtomicBool, Arc};

/// Identifier for one completion request.
pub type RequestId = u64;

/// Shared cancellation flag for a request.
pub type CancelSignal = Arc<AtomicBool>;

/// Error returned while constructing/configuring a provider before any
/// request starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInitError {
    message: String,
}

impl ProviderInitError {
    /// Creates a new provider initialization error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the underlying error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderInitError {}

impl From<String> for ProviderInitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ProviderInitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Speaker of one transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// Image attachment payload carried alongside message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// MIME type of the decoded payload, e.g. `image/png`.
    pub mime_type: String,
    /// Base64 payload with no data-URL prefix.
    pub data: String,
}

/// Provider-neutral transcript message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub images: Vec<ImageData>,
}

impl ChatMessage {
    /// Constructs a text-only user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            images: Vec::new(),
        }
    }

    /// Constructs a text-only assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            images: Vec::new(),
        }
    }

    /// Attaches image payloads to this message.
    #[must_use]
    pub fn with_images(mut self, images: Vec<ImageData>) -> Self {
        self.images = images;
        self
    }
}

/// Input required to start a completion request: the accumulated transcript,
/// newest user message last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub request_id: RequestId,
    pub messages: Vec<ChatMessage>,
}

/// Terminal outcome of a request that produced no response text.
///
/// Cancellation is not a failure: callers suppress all side effects for
/// `Cancelled` and surface `Failed` to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// The request was cancelled through its [`CancelSignal`].
    Cancelled,
    /// Any non-cancellation failure (transport, protocol, provider).
    Failed(String),
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "request cancelled"),
            Self::Failed(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for CompletionError {}

/// Immutable metadata describing a completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub model_id: String,
}

/// Provider interface for executing one completion request.
///
/// `complete` blocks the calling thread until the request reaches a terminal
/// state; hosts run it on a worker thread and poll `cancel` cooperatively.
/// The response is one atomic string — providers never stream partial text.
pub trait CompletionProvider: Send + Sync + 'static {
    /// Returns provider/model identity metadata.
    fn profile(&self) -> ProviderProfile;

    /// Executes one request to completion, cancellation, or failure.
    fn complete(
        &self,
        request: CompletionRequest,
        cancel: CancelSignal,
    ) -> Result<String, CompletionError>;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::{
        ChatMessage, ChatRole, CompletionError, CompletionProvider, CompletionRequest,
        ProviderInitError, ProviderProfile,
    };

    struct EchoProvider;

    impl CompletionProvider for EchoProvider {
        fn profile(&self) -> ProviderProfile {
            ProviderProfile {
                provider_id: "echo".to_string(),
                model_id: "echo-model".to_string(),
            }
        }

        fn complete(
            &self,
            request: CompletionRequest,
            cancel: super::CancelSignal,
        ) -> Result<String, CompletionError> {
            if cancel.load(Ordering::Acquire) {
                return Err(CompletionError::Cancelled);
            }
            let last = request
                .messages
                .last()
                .ok_or_else(|| CompletionError::Failed("empty transcript".to_string()))?;
            Ok(last.content.clone())
        }
    }

    #[test]
    fn request_carries_transcript_newest_last() {
        let request = CompletionRequest {
            request_id: 7,
            messages: vec![
                ChatMessage::user("hello"),
                ChatMessage::assistant("hi"),
                ChatMessage::user("again"),
            ],
        };

        assert_eq!(request.request_id, 7);
        assert_eq!(request.messages.last().map(|m| m.content.as_str()), Some("again"));
    }

    #[test]
    fn echo_provider_round_trip() {
        let provider = EchoProvider;
        let request = CompletionRequest {
            request_id: 1,
            messages: vec![ChatMessage::user("ping")],
        };

        let response = provider
            .complete(request, Arc::new(AtomicBool::new(false)))
            .expect("echo completes");
        assert_eq!(response, "ping");
    }

    #[test]
    fn pre_set_cancel_signal_reports_cancelled() {
        let provider = EchoProvider;
        let request = CompletionRequest {
            request_id: 2,
            messages: vec![ChatMessage::user("ping")],
        };

        let result = provider.complete(request, Arc::new(AtomicBool::new(true)));
        assert_eq!(result, Err(CompletionError::Cancelled));
    }

    #[test]
    fn cancellation_is_distinguishable_from_failure() {
        assert_ne!(
            CompletionError::Cancelled,
            CompletionError::Failed("boom".to_string())
        );
        assert_eq!(CompletionError::Cancelled.to_string(), "request cancelled");
        assert_eq!(
            CompletionError::Failed("boom".to_string()).to_string(),
            "boom"
        );
    }

    #[test]
    fn provider_init_error_preserves_message() {
        let error = ProviderInitError::new("missing api key");
        assert_eq!(error.message(), "missing api key");
        assert_eq!(error.to_string(), "missing api key");
    }

    #[test]
    fn message_constructors_set_role_and_attachments() {
        let message = ChatMessage::user("look").with_images(vec![super::ImageData {
            mime_type: "image/png".to_string(),
            data: "aGk=".to_string(),
        }]);

        assert_eq!(message.role, ChatRole::User);
        assert_eq!(message.images.len(), 1);
        assert!(ChatMessage::assistant("ok").images.is_empty());
    }
}
