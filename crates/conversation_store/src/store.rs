use std::collections::HashSet;

use crate::error::ConversationStoreError;
use crate::schema::{
    Conversation, ConversationId, Message, MessageId, MessageUpdate, UserDocument,
};

/// Title given to a conversation before its first message arrives.
pub const NEW_CHAT_TITLE: &str = "New Chat";
/// Characters of the first user message kept as the derived title.
pub const TITLE_PREVIEW_CHARS: usize = 30;

/// In-memory collection of the active session's conversations plus the
/// active-conversation pointer. Mutations are atomic: an operation either
/// applies fully or leaves the store untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active_id: Option<ConversationId>,
}

impl ConversationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Conversations in display order, most recently created first.
    #[must_use]
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Front-inserts a new empty conversation and makes it active.
    pub fn create_conversation(&mut self) -> ConversationId {
        let conversation = Conversation::new(NEW_CHAT_TITLE);
        let id = conversation.id.clone();
        self.conversations.insert(0, conversation);
        self.active_id = Some(id.clone());
        id
    }

    /// Appends a message; the first message of a conversation derives its
    /// title from the message content.
    pub fn append_message(
        &mut self,
        conversation_id: &str,
        message: Message,
    ) -> Result<(), ConversationStoreError> {
        let conversation = self.find_mut(conversation_id)?;

        if conversation.messages.is_empty() {
            conversation.title = derive_title(&message.content);
        }
        conversation.messages.push(message);
        Ok(())
    }

    /// Merges fields into an existing message in place.
    pub fn update_message(
        &mut self,
        conversation_id: &str,
        message_id: &str,
        update: MessageUpdate,
    ) -> Result<(), ConversationStoreError> {
        let conversation = self.find_mut(conversation_id)?;
        let message = conversation
            .messages
            .iter_mut()
            .find(|message| message.id == message_id)
            .ok_or_else(|| ConversationStoreError::MessageNotFound {
                conversation_id: conversation_id.to_string(),
                message_id: message_id.to_string(),
            })?;

        update.apply(message);
        Ok(())
    }

    /// Removes a conversation. Deleting the active conversation clears the
    /// active pointer without selecting a replacement.
    pub fn delete_conversation(
        &mut self,
        conversation_id: &str,
    ) -> Result<(), ConversationStoreError> {
        let index = self.find_index(conversation_id)?;
        self.conversations.remove(index);

        if self.active_id.as_deref() == Some(conversation_id) {
            self.active_id = None;
        }
        Ok(())
    }

    /// Makes an existing conversation the active one.
    pub fn select_conversation(
        &mut self,
        conversation_id: &str,
    ) -> Result<(), ConversationStoreError> {
        self.find_index(conversation_id)?;
        self.active_id = Some(conversation_id.to_string());
        Ok(())
    }

    #[must_use]
    pub fn active_conversation(&self) -> Option<&Conversation> {
        let active_id = self.active_id.as_deref()?;
        self.conversations
            .iter()
            .find(|conversation| conversation.id == active_id)
    }

    #[must_use]
    pub fn active_conversation_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// Wholesale replacement from a loaded document. Rejects collections
    /// with duplicate ids and leaves the store untouched when it does.
    pub fn replace_all(
        &mut self,
        conversations: Vec<Conversation>,
    ) -> Result<(), ConversationStoreError> {
        let mut seen = HashSet::new();
        for conversation in &conversations {
            if !seen.insert(conversation.id.as_str()) {
                return Err(ConversationStoreError::DuplicateConversationId {
                    id: conversation.id.clone(),
                });
            }
        }

        self.conversations = conversations;
        self.active_id = None;
        Ok(())
    }

    /// Drops all local state. Used on session end; never writes remotely.
    pub fn clear(&mut self) {
        self.conversations.clear();
        self.active_id = None;
    }

    /// Snapshot of the full collection as the remote persistence unit.
    #[must_use]
    pub fn document(&self) -> UserDocument {
        UserDocument {
            conversations: self.conversations.clone(),
        }
    }

    #[must_use]
    pub fn message(&self, conversation_id: &str, message_id: &str) -> Option<&Message> {
        self.conversations
            .iter()
            .find(|conversation| conversation.id == conversation_id)?
            .messages
            .iter()
            .find(|message| message.id == message_id)
    }

    fn find_index(&self, conversation_id: &str) -> Result<usize, ConversationStoreError> {
        self.conversations
            .iter()
            .position(|conversation| conversation.id == conversation_id)
            .ok_or_else(|| ConversationStoreError::ConversationNotFound {
                id: conversation_id.to_string(),
            })
    }

    fn find_mut(
        &mut self,
        conversation_id: &str,
    ) -> Result<&mut Conversation, ConversationStoreError> {
        let index = self.find_index(conversation_id)?;
        Ok(&mut self.conversations[index])
    }
}

/// Title preview derived from the first message: 30 characters plus an
/// unconditional ellipsis, matching display expectations.
#[must_use]
pub(crate) fn derive_title(content: &str) -> String {
    let mut title: String = content.chars().take(TITLE_PREVIEW_CHARS).collect();
    title.push_str("...");
    title
}
