use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use conversation_store::{
    ConversationStore, DocumentStore, DocumentStoreError, FileDocumentStore, Message,
    SyncController, UserDocument,
};

fn store_with_exchange() -> ConversationStore {
    let mut store = ConversationStore::new();
    let id = store.create_conversation();
    store
        .append_message(&id, Message::user("What is the capital of France?"))
        .expect("append user message");
    store
        .append_message(&id, Message::assistant("The capital of France is **Paris**."))
        .expect("append assistant message");
    store
}

#[test]
fn conversations_survive_a_restart_on_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = store_with_exchange();
    let expected = store.document();

    {
        let remote: Arc<dyn DocumentStore> = Arc::new(FileDocumentStore::new(dir.path()));
        let controller = SyncController::new(remote);
        controller.begin_session(&mut store, "alice@example.com");
        controller.queue_save(&store);
        controller.flush();
    }

    let remote: Arc<dyn DocumentStore> = Arc::new(FileDocumentStore::new(dir.path()));
    let controller = SyncController::new(remote);
    let mut restored = ConversationStore::new();
    controller.begin_session(&mut restored, "alice@example.com");

    assert_eq!(restored.document(), expected);
}

#[test]
fn documents_are_isolated_per_user() {
    let dir = tempfile::tempdir().expect("temp dir");
    let remote: Arc<dyn DocumentStore> = Arc::new(FileDocumentStore::new(dir.path()));
    let controller = SyncController::new(remote);

    let mut alice = store_with_exchange();
    controller.begin_session(&mut alice, "alice");
    controller.queue_save(&alice);
    controller.flush();
    controller.end_session(&mut alice);

    let mut bob = ConversationStore::new();
    controller.begin_session(&mut bob, "bob");
    assert!(bob.document().conversations.is_empty());
}

struct FailingStore {
    attempted_saves: AtomicUsize,
}

impl DocumentStore for FailingStore {
    fn load(&self, _user_id: &str) -> Result<Option<UserDocument>, DocumentStoreError> {
        Ok(None)
    }

    fn save(&self, user_id: &str, _document: &UserDocument) -> Result<(), DocumentStoreError> {
        self.attempted_saves.fetch_add(1, Ordering::SeqCst);
        Err(DocumentStoreError::remote("PUT", user_id, "503 service unavailable"))
    }
}

#[test]
fn failed_saves_leave_the_session_usable() {
    let remote = Arc::new(FailingStore {
        attempted_saves: AtomicUsize::new(0),
    });
    let controller = SyncController::new(Arc::clone(&remote) as Arc<dyn DocumentStore>);
    let mut store = store_with_exchange();

    controller.begin_session(&mut store, "alice");
    controller.queue_save(&store);
    controller.flush();

    assert_eq!(remote.attempted_saves.load(Ordering::SeqCst), 1);
    assert!(controller.signed_in());

    let id = store.create_conversation();
    store
        .append_message(&id, Message::user("still working locally"))
        .expect("append after failed save");
    controller.queue_save(&store);
    controller.flush();
    assert_eq!(remote.attempted_saves.load(Ordering::SeqCst), 2);
}

#[test]
fn loading_a_corrupt_document_keeps_local_state() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("alice.json"), "]]not json[[").expect("write corrupt file");

    let remote: Arc<dyn DocumentStore> = Arc::new(FileDocumentStore::new(dir.path()));
    let controller = SyncController::new(remote);
    let mut store = store_with_exchange();
    let before = store.document();

    controller.begin_session(&mut store, "alice");

    assert_eq!(store.document(), before);
    assert!(controller.signed_in());
}
