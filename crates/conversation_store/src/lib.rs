//! Authoritative in-memory conversation state plus its remote-document
//! synchronization protocol.
//!
//! [`ConversationStore`] holds every conversation of the active session and
//! exposes atomic mutations; [`SyncController`] keeps one remote per-user
//! document eventually consistent with the store through full-document
//! overwrites — load on session start, coalesced serialized writes on
//! mutation, and a write-free clear on session end.

mod error;
mod paths;
mod remote;
mod schema;
mod store;
mod sync;

pub use error::{ConversationStoreError, DocumentStoreError};
pub use paths::{document_file_name, sanitize_user_id};
pub use remote::{DocumentStore, FileDocumentStore, MemoryDocumentStore};
pub use schema::{
    now_rfc3339, Conversation, ConversationId, ImageAttachment, Message, MessageId, MessageUpdate,
    Role, UserDocument,
};
pub use store::{ConversationStore, NEW_CHAT_TITLE, TITLE_PREVIEW_CHARS};
pub use sync::SyncController;
