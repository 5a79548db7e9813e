use std::path::PathBuf;

use thiserror::Error;

/// Store-level failures. Not-found variants are benign: callers treat them
/// as no-ops and the store is never left in a partial state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationStoreError {
    #[error("conversation '{id}' not found")]
    ConversationNotFound { id: String },

    #[error("message '{message_id}' not found in conversation '{conversation_id}'")]
    MessageNotFound {
        conversation_id: String,
        message_id: String,
    },

    #[error("loaded document contains duplicate conversation id '{id}'")]
    DuplicateConversationId { id: String },
}

#[derive(Debug, Error)]
pub enum DocumentStoreError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse document JSON at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize document for user '{user_id}': {source}")]
    JsonSerialize {
        user_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("document store rejected {operation} for user '{user_id}': {message}")]
    Remote {
        operation: &'static str,
        user_id: String,
        message: String,
    },
}

impl DocumentStoreError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn json_parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::JsonParse {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn json_serialize(user_id: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonSerialize {
            user_id: user_id.into(),
            source,
        }
    }

    #[must_use]
    pub fn remote(
        operation: &'static str,
        user_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Remote {
            operation,
            user_id: user_id.into(),
            message: message.into(),
        }
    }
}
