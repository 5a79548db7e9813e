use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

/// UUID v4 string identifying one conversation.
pub type ConversationId = String;
/// UUID v4 string identifying one message within a conversation.
pub type MessageId = String;

/// Current UTC wall clock as an RFC 3339 string.
#[must_use]
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

/// Speaker of one transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Image owned exclusively by the message that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub id: String,
    /// Data-URL string: `data:<mime>;base64,<payload>`.
    pub data: String,
    pub name: String,
}

impl ImageAttachment {
    #[must_use]
    pub fn new(data: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            data: data.into(),
            name: name.into(),
        }
    }
}

/// One transcript entry. Immutable once created apart from in-place content
/// correction through [`MessageUpdate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub images: Vec<ImageAttachment>,
    /// RFC 3339 creation time.
    pub timestamp: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            images: Vec::new(),
            timestamp: now_rfc3339(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    #[must_use]
    pub fn with_images(mut self, images: Vec<ImageAttachment>) -> Self {
        self.images = images;
        self
    }
}

/// Partial message fields merged in place by
/// [`crate::ConversationStore::update_message`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageUpdate {
    pub content: Option<String>,
    pub images: Option<Vec<ImageAttachment>>,
}

impl MessageUpdate {
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            images: None,
        }
    }

    pub(crate) fn apply(self, message: &mut Message) {
        if let Some(content) = self.content {
            message.content = content;
        }
        if let Some(images) = self.images {
            message.images = images;
        }
    }
}

/// A titled, append-ordered transcript. Message order is semantically
/// significant and never changes after append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub messages: Vec<Message>,
    /// RFC 3339 creation time.
    pub created_at: String,
}

impl Conversation {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            messages: Vec::new(),
            created_at: now_rfc3339(),
        }
    }
}

/// Full serialized conversation collection for one user — the unit of
/// remote persistence. Every write replaces the whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(default)]
    pub conversations: Vec<Conversation>,
}
