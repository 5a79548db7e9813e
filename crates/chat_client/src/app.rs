use std::collections::VecDeque;

use completion_provider::{ChatMessage, ChatRole, ImageData, RequestId};
use conversation_store::{Conversation, ConversationId, ConversationStore, ImageAttachment, Message, Role};

use crate::commands::{parse_slash_command, SlashCommand};

/// Assistant message recorded when a request fails for any reason other
/// than user cancellation.
pub const FALLBACK_ASSISTANT_MESSAGE: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

const HELP_TEXT: &str = "Commands: /help, /new, /list, /select <number>, /delete, /cancel, /quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Sending { request_id: RequestId },
}

/// A user turn waiting to be dispatched: the text plus any attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub content: String,
    pub images: Vec<ImageAttachment>,
}

impl OutboundMessage {
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            images: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_images(mut self, images: Vec<ImageAttachment>) -> Self {
        self.images = images;
        self
    }
}

/// Host-side effects the app requests but never performs itself.
pub trait HostOps {
    /// Starts a completion for the given transcript, newest message last.
    fn start_completion(&mut self, messages: Vec<ChatMessage>) -> Result<RequestId, String>;
    fn cancel_completion(&mut self, request_id: RequestId);
    /// Surfaces a transient, non-transcript notice to the user.
    fn notify(&mut self, text: &str);
    fn request_render(&mut self);
}

/// Per-session chat state machine.
///
/// One request is in flight at a time; submissions that arrive while a
/// request is pending queue up and drain in order as requests reach a
/// terminal state. Events carrying a request id that is neither in flight
/// nor being cancelled are stale and ignored.
pub struct ChatApp {
    pub mode: Mode,
    store: ConversationStore,
    queued_outbound: VecDeque<OutboundMessage>,
    cancelling_request: Option<RequestId>,
    inflight_conversation: Option<ConversationId>,
    pub should_exit: bool,
}

impl Default for ChatApp {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatApp {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: Mode::Idle,
            store: ConversationStore::new(),
            queued_outbound: VecDeque::new(),
            cancelling_request: None,
            inflight_conversation: None,
            should_exit: false,
        }
    }

    #[must_use]
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ConversationStore {
        &mut self.store
    }

    /// Number of user turns waiting behind the in-flight request.
    #[must_use]
    pub fn queued_count(&self) -> usize {
        self.queued_outbound.len()
    }

    pub fn on_submit(&mut self, input: &str, host: &mut dyn HostOps) {
        let prompt = input.trim().to_string();
        if prompt.is_empty() {
            host.request_render();
            return;
        }

        if let Some(command) = parse_slash_command(&prompt) {
            match command {
                SlashCommand::Help => {
                    host.notify(HELP_TEXT);
                    host.request_render();
                }
                SlashCommand::New => {
                    self.store.create_conversation();
                    host.request_render();
                }
                SlashCommand::List => {
                    host.notify(&self.conversation_listing());
                    host.request_render();
                }
                SlashCommand::Select(index) => {
                    self.on_select(index, host);
                }
                SlashCommand::Delete => {
                    self.on_delete_active(host);
                }
                SlashCommand::Cancel => {
                    self.on_cancel(host);
                }
                SlashCommand::Quit => {
                    self.should_exit = true;
                    host.request_render();
                }
                SlashCommand::Unknown(command) => {
                    host.notify(&format!("Unknown command: {command}"));
                    host.request_render();
                }
            }

            return;
        }

        self.submit_outbound(OutboundMessage::text(prompt), host);
    }

    /// Submits a user turn. Dispatched immediately when idle, queued
    /// behind the in-flight request otherwise.
    pub fn submit_outbound(&mut self, outbound: OutboundMessage, host: &mut dyn HostOps) {
        if matches!(self.mode, Mode::Sending { .. }) || self.cancelling_request.is_some() {
            self.queued_outbound.push_back(outbound);
            host.request_render();
            return;
        }

        self.dispatch_outbound(outbound, host);
    }

    fn dispatch_outbound(&mut self, outbound: OutboundMessage, host: &mut dyn HostOps) {
        if self.store.active_conversation().is_none() {
            self.store.create_conversation();
        }

        let Some(conversation_id) = self.store.active_conversation_id().map(str::to_string) else {
            host.notify("No active conversation");
            host.request_render();
            return;
        };

        let message = Message::user(outbound.content).with_images(outbound.images);
        if let Err(error) = self.store.append_message(&conversation_id, message) {
            host.notify(&format!("Could not record message: {error}"));
            host.request_render();
            return;
        }

        let transcript = self
            .store
            .active_conversation()
            .map(transcript_for)
            .unwrap_or_default();

        match host.start_completion(transcript) {
            Ok(request_id) => {
                self.mode = Mode::Sending { request_id };
                self.inflight_conversation = Some(conversation_id);
            }
            Err(error) => {
                self.record_fallback_reply(&conversation_id);
                host.notify(&format!("Failed to start request: {error}"));
            }
        }

        host.request_render();
    }

    /// Numbered conversation listing in display order, marking the active
    /// one. The numbers are what `/select` takes.
    fn conversation_listing(&self) -> String {
        if self.store.is_empty() {
            return "No conversations".to_string();
        }

        let active_id = self.store.active_conversation_id();
        self.store
            .conversations()
            .iter()
            .enumerate()
            .map(|(position, conversation)| {
                let marker = if active_id == Some(conversation.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                format!("{marker} {}. {}", position + 1, conversation.title)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Switches the active conversation to the 1-based `/list` position.
    fn on_select(&mut self, index: Option<usize>, host: &mut dyn HostOps) {
        let Some(index) = index.filter(|index| *index >= 1) else {
            host.notify("Usage: /select <number> (see /list)");
            host.request_render();
            return;
        };

        let Some(conversation) = self.store.conversations().get(index - 1) else {
            host.notify(&format!("No conversation numbered {index}"));
            host.request_render();
            return;
        };

        let conversation_id = conversation.id.clone();
        let title = conversation.title.clone();
        match self.store.select_conversation(&conversation_id) {
            Ok(()) => host.notify(&format!("Switched to: {title}")),
            Err(error) => host.notify(&format!("Could not select conversation: {error}")),
        }
        host.request_render();
    }

    fn on_delete_active(&mut self, host: &mut dyn HostOps) {
        let Some(conversation_id) = self.store.active_conversation_id().map(str::to_string) else {
            host.notify("No active conversation");
            host.request_render();
            return;
        };

        // A reply still in flight for this conversation would resurface
        // into a deleted target; drop it like a cancellation.
        if self.inflight_conversation.as_deref() == Some(conversation_id.as_str()) {
            self.on_cancel(host);
        }

        if let Err(error) = self.store.delete_conversation(&conversation_id) {
            host.notify(&format!("Could not delete conversation: {error}"));
        } else {
            host.notify("Conversation deleted");
        }
        host.request_render();
    }

    pub fn on_cancel(&mut self, host: &mut dyn HostOps) {
        if let Mode::Sending { request_id } = self.mode {
            self.cancelling_request = Some(request_id);
            self.mode = Mode::Idle;
            self.inflight_conversation = None;
            host.cancel_completion(request_id);
            host.notify("Request cancelled");
        } else {
            host.notify("No request in flight");
        }

        host.request_render();
    }

    pub fn on_completion_finished(
        &mut self,
        request_id: RequestId,
        text: &str,
        host: &mut dyn HostOps,
    ) {
        if self.settle_cancelled(request_id, host) {
            return;
        }

        if self.mode != (Mode::Sending { request_id }) {
            return;
        }

        if let Some(conversation_id) = self.inflight_conversation.take() {
            if self
                .store
                .append_message(&conversation_id, Message::assistant(text))
                .is_err()
            {
                host.notify("The conversation for this reply no longer exists");
            }
        }

        self.mode = Mode::Idle;
        self.dispatch_next_queued(host);
        host.request_render();
    }

    pub fn on_completion_failed(
        &mut self,
        request_id: RequestId,
        error: &str,
        host: &mut dyn HostOps,
    ) {
        if self.settle_cancelled(request_id, host) {
            return;
        }

        if self.mode != (Mode::Sending { request_id }) {
            return;
        }

        if let Some(conversation_id) = self.inflight_conversation.take() {
            self.record_fallback_reply(&conversation_id);
        }

        host.notify(&format!("Request failed: {error}"));
        self.mode = Mode::Idle;
        self.dispatch_next_queued(host);
        host.request_render();
    }

    pub fn on_completion_cancelled(&mut self, request_id: RequestId, host: &mut dyn HostOps) {
        self.settle_cancelled(request_id, host);
    }

    /// Returns true when the event belonged to a request the user already
    /// cancelled; its result is discarded and the queue advances.
    fn settle_cancelled(&mut self, request_id: RequestId, host: &mut dyn HostOps) -> bool {
        if self.cancelling_request != Some(request_id) {
            return false;
        }

        self.cancelling_request = None;
        self.dispatch_next_queued(host);
        host.request_render();
        true
    }

    fn dispatch_next_queued(&mut self, host: &mut dyn HostOps) {
        if self.mode != Mode::Idle || self.cancelling_request.is_some() {
            return;
        }

        if let Some(next) = self.queued_outbound.pop_front() {
            self.dispatch_outbound(next, host);
        }
    }

    fn record_fallback_reply(&mut self, conversation_id: &str) {
        let _ = self
            .store
            .append_message(conversation_id, Message::assistant(FALLBACK_ASSISTANT_MESSAGE));
    }
}

/// Maps a stored conversation to the provider-neutral transcript.
fn transcript_for(conversation: &Conversation) -> Vec<ChatMessage> {
    conversation
        .messages
        .iter()
        .map(|message| {
            let role = match message.role {
                Role::User => ChatRole::User,
                Role::Assistant => ChatRole::Assistant,
            };
            let images = message.images.iter().map(image_payload).collect();
            ChatMessage {
                role,
                content: message.content.clone(),
                images,
            }
        })
        .collect()
}

/// Splits a stored `data:<mime>;base64,<payload>` attachment into the raw
/// payload providers expect. Attachments that are not data URLs pass
/// through opaquely.
fn image_payload(attachment: &ImageAttachment) -> ImageData {
    if let Some(rest) = attachment.data.strip_prefix("data:") {
        if let Some((meta, payload)) = rest.split_once(',') {
            let mime_type = meta.split(';').next().unwrap_or(meta);
            return ImageData {
                mime_type: mime_type.to_string(),
                data: payload.to_string(),
            };
        }
    }

    ImageData {
        mime_type: "application/octet-stream".to_string(),
        data: attachment.data.clone(),
    }
}
