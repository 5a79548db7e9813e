mod support;

use chat_client::app::{ChatApp, Mode, FALLBACK_ASSISTANT_MESSAGE};
use completion_provider::ChatRole;
use conversation_store::Role;

use support::HostSpy;

#[test]
fn submit_starts_completion_and_enters_sending_mode() {
    let mut app = ChatApp::new();
    let mut host = HostSpy::with_next_request_id(42);

    app.on_submit("describe the module layout", &mut host);

    assert_eq!(app.mode, Mode::Sending { request_id: 42 });
    assert_eq!(host.started_transcripts.len(), 1);
    let transcript = &host.started_transcripts[0];
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].role, ChatRole::User);
    assert_eq!(transcript[0].content, "describe the module layout");

    let conversation = app.store().active_conversation().expect("conversation");
    assert_eq!(conversation.messages.len(), 1);
    assert_eq!(conversation.messages[0].role, Role::User);
}

#[test]
fn first_message_derives_the_conversation_title() {
    let mut app = ChatApp::new();
    let mut host = HostSpy::default();

    app.on_submit("What is the weather like in Paris today?", &mut host);

    let conversation = app.store().active_conversation().expect("conversation");
    assert_eq!(conversation.title, "What is the weather like in Pa...");
}

#[test]
fn completion_finished_appends_assistant_reply_and_returns_to_idle() {
    let mut app = ChatApp::new();
    let mut host = HostSpy::with_next_request_id(7);

    app.on_submit("hello", &mut host);
    app.on_completion_finished(7, "Hi! How can I help?", &mut host);

    assert_eq!(app.mode, Mode::Idle);
    let conversation = app.store().active_conversation().expect("conversation");
    assert_eq!(conversation.messages.len(), 2);
    assert_eq!(conversation.messages[1].role, Role::Assistant);
    assert_eq!(conversation.messages[1].content, "Hi! How can I help?");
}

#[test]
fn transcript_carries_prior_turns_on_the_next_submission() {
    let mut app = ChatApp::new();
    let mut host = HostSpy::with_next_request_id(1);

    app.on_submit("first question", &mut host);
    app.on_completion_finished(1, "first answer", &mut host);
    app.on_submit("second question", &mut host);

    assert_eq!(host.started_transcripts.len(), 2);
    let transcript = &host.started_transcripts[1];
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[0].content, "first question");
    assert_eq!(transcript[1].role, ChatRole::Assistant);
    assert_eq!(transcript[1].content, "first answer");
    assert_eq!(transcript[2].content, "second question");
}

#[test]
fn completion_failure_records_fallback_message_and_notice() {
    let mut app = ChatApp::new();
    let mut host = HostSpy::with_next_request_id(3);

    app.on_submit("hello", &mut host);
    app.on_completion_failed(3, "transport unreachable", &mut host);

    assert_eq!(app.mode, Mode::Idle);
    let conversation = app.store().active_conversation().expect("conversation");
    assert_eq!(conversation.messages.len(), 2);
    assert_eq!(conversation.messages[1].content, FALLBACK_ASSISTANT_MESSAGE);
    assert!(host
        .notices
        .iter()
        .any(|notice| notice.contains("transport unreachable")));
}

#[test]
fn failed_start_records_fallback_without_leaving_idle() {
    let mut app = ChatApp::new();
    let mut host = HostSpy {
        fail_start_with: Some("no provider configured".to_string()),
        ..HostSpy::default()
    };

    app.on_submit("hello", &mut host);

    assert_eq!(app.mode, Mode::Idle);
    let conversation = app.store().active_conversation().expect("conversation");
    assert_eq!(conversation.messages.len(), 2);
    assert_eq!(conversation.messages[1].content, FALLBACK_ASSISTANT_MESSAGE);
}

#[test]
fn stale_completion_events_are_ignored() {
    let mut app = ChatApp::new();
    let mut host = HostSpy::with_next_request_id(5);

    app.on_submit("hello", &mut host);
    app.on_completion_finished(99, "from another life", &mut host);

    assert_eq!(app.mode, Mode::Sending { request_id: 5 });
    let conversation = app.store().active_conversation().expect("conversation");
    assert_eq!(conversation.messages.len(), 1);
}

#[test]
fn submissions_while_sending_queue_and_drain_in_order() {
    let mut app = ChatApp::new();
    let mut host = HostSpy::with_next_request_id(1);

    app.on_submit("first", &mut host);
    app.on_submit("second", &mut host);

    assert_eq!(host.started_transcripts.len(), 1);
    assert_eq!(app.queued_count(), 1);

    app.on_completion_finished(1, "answer one", &mut host);

    assert_eq!(app.queued_count(), 0);
    assert_eq!(host.started_transcripts.len(), 2);
    let second = host.started_transcripts[1].last().expect("transcript tail");
    assert_eq!(second.content, "second");
    assert_eq!(app.mode, Mode::Sending { request_id: 2 });
}

#[test]
fn cancel_discards_the_late_result() {
    let mut app = ChatApp::new();
    let mut host = HostSpy::with_next_request_id(11);

    app.on_submit("hello", &mut host);
    app.on_cancel(&mut host);

    assert_eq!(app.mode, Mode::Idle);
    assert_eq!(host.cancelled_requests, vec![11]);

    // A result for the cancelled request must not surface.
    app.on_completion_finished(11, "too late", &mut host);

    let conversation = app.store().active_conversation().expect("conversation");
    assert_eq!(conversation.messages.len(), 1);
    assert_eq!(conversation.messages[0].role, Role::User);
}

#[test]
fn cancel_with_nothing_in_flight_only_notifies() {
    let mut app = ChatApp::new();
    let mut host = HostSpy::default();

    app.on_cancel(&mut host);

    assert_eq!(app.mode, Mode::Idle);
    assert!(host.cancelled_requests.is_empty());
    assert!(host.notices.iter().any(|notice| notice.contains("No request")));
}

#[test]
fn slash_new_starts_a_fresh_active_conversation() {
    let mut app = ChatApp::new();
    let mut host = HostSpy::with_next_request_id(1);

    app.on_submit("hello", &mut host);
    app.on_completion_finished(1, "hi", &mut host);
    app.on_submit("/new", &mut host);

    assert_eq!(app.store().conversations().len(), 2);
    let active = app.store().active_conversation().expect("conversation");
    assert!(active.messages.is_empty());
    assert_eq!(active.title, "New Chat");
}

#[test]
fn slash_delete_removes_the_active_conversation() {
    let mut app = ChatApp::new();
    let mut host = HostSpy::with_next_request_id(1);

    app.on_submit("hello", &mut host);
    app.on_completion_finished(1, "hi", &mut host);
    app.on_submit("/delete", &mut host);

    assert!(app.store().conversations().is_empty());
    assert!(app.store().active_conversation().is_none());
}

#[test]
fn slash_list_numbers_conversations_and_marks_the_active_one() {
    let mut app = ChatApp::new();
    let mut host = HostSpy::with_next_request_id(1);

    app.on_submit("older topic", &mut host);
    app.on_completion_finished(1, "noted", &mut host);
    app.on_submit("/new", &mut host);
    app.on_submit("newer topic", &mut host);
    app.on_submit("/list", &mut host);

    let listing = host.notices.last().expect("listing notice");
    assert_eq!(listing, "* 1. newer topic...\n  2. older topic...");
}

#[test]
fn slash_select_switches_replies_to_the_chosen_conversation() {
    let mut app = ChatApp::new();
    let mut host = HostSpy::with_next_request_id(1);

    app.on_submit("older topic", &mut host);
    app.on_completion_finished(1, "noted", &mut host);
    let older_id = app
        .store()
        .active_conversation_id()
        .expect("active")
        .to_string();
    app.on_submit("/new", &mut host);

    app.on_submit("/select 2", &mut host);
    assert_eq!(app.store().active_conversation_id(), Some(older_id.as_str()));
    assert!(host
        .notices
        .iter()
        .any(|notice| notice == "Switched to: older topic..."));

    app.on_submit("follow-up", &mut host);
    app.on_completion_finished(2, "resumed", &mut host);

    let conversation = app.store().active_conversation().expect("conversation");
    assert_eq!(conversation.id, older_id);
    assert_eq!(conversation.messages.len(), 4);
    assert_eq!(conversation.messages[3].content, "resumed");
    // Switching never spawned a conversation of its own.
    assert_eq!(app.store().conversations().len(), 2);
}

#[test]
fn slash_select_rejects_missing_or_out_of_range_numbers() {
    let mut app = ChatApp::new();
    let mut host = HostSpy::with_next_request_id(1);

    app.on_submit("only topic", &mut host);
    let active = app.store().active_conversation_id().map(str::to_string);

    app.on_submit("/select", &mut host);
    app.on_submit("/select 0", &mut host);
    app.on_submit("/select 5", &mut host);

    assert_eq!(app.store().active_conversation_id(), active.as_deref());
    assert!(host
        .notices
        .iter()
        .any(|notice| notice.starts_with("Usage: /select")));
    assert!(host
        .notices
        .iter()
        .any(|notice| notice == "No conversation numbered 5"));
}

#[test]
fn slash_quit_requests_exit() {
    let mut app = ChatApp::new();
    let mut host = HostSpy::default();

    app.on_submit("/quit", &mut host);

    assert!(app.should_exit);
}

#[test]
fn unknown_commands_notify_without_submitting() {
    let mut app = ChatApp::new();
    let mut host = HostSpy::default();

    app.on_submit("/frobnicate", &mut host);

    assert!(host.started_transcripts.is_empty());
    assert!(host
        .notices
        .iter()
        .any(|notice| notice.contains("Unknown command: /frobnicate")));
}
