use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::remote::{lock_unpoisoned, DocumentStore};
use crate::schema::UserDocument;
use crate::store::ConversationStore;

enum Job {
    Write { user_id: String, document: UserDocument },
    Flush(mpsc::Sender<()>),
}

/// Mirrors the in-memory store to a per-user remote document.
///
/// Writes are queued to a background thread and coalesced: when several
/// snapshots pile up, only the most recent one is written. Reads happen
/// once per session, at sign-in. Sign-out detaches the local store from
/// the remote document without writing.
pub struct SyncController {
    store: Arc<dyn DocumentStore>,
    user_id: Mutex<Option<String>>,
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    writer: Option<JoinHandle<()>>,
}

impl SyncController {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let (sender, receiver) = mpsc::channel();
        let writer_store = Arc::clone(&store);
        let writer = thread::Builder::new()
            .name("document-writer".to_string())
            .spawn(move || writer_loop(&receiver, writer_store.as_ref()))
            .ok();

        Self {
            store,
            user_id: Mutex::new(None),
            sender: Mutex::new(Some(sender)),
            writer,
        }
    }

    /// Loads the signed-in user's document into the store. The local store
    /// is kept untouched when the remote document is absent, empty,
    /// unreadable, or malformed; sign-in never destroys local state.
    pub fn begin_session(&self, store: &mut ConversationStore, user_id: &str) {
        *lock_unpoisoned(&self.user_id) = Some(user_id.to_string());

        match self.store.load(user_id) {
            Ok(Some(document)) if !document.conversations.is_empty() => {
                let count = document.conversations.len();
                if let Err(error) = store.replace_all(document.conversations) {
                    warn!(user_id, %error, "loaded document rejected, keeping local state");
                } else {
                    debug!(user_id, count, "loaded remote document");
                }
            }
            Ok(Some(_)) | Ok(None) => {
                debug!(user_id, "no remote conversations yet");
            }
            Err(error) => {
                warn!(user_id, %error, "loading remote document failed, keeping local state");
            }
        }
    }

    /// Detaches from the remote document and clears local state. Nothing
    /// is written; unsynced local changes queued before sign-out still
    /// drain through the writer.
    pub fn end_session(&self, store: &mut ConversationStore) {
        *lock_unpoisoned(&self.user_id) = None;
        store.clear();
    }

    pub fn signed_in(&self) -> bool {
        lock_unpoisoned(&self.user_id).is_some()
    }

    /// Queues a write of the store's current snapshot. A no-op while
    /// signed out, and an empty store is never written so a fresh
    /// sign-in cannot blank an existing remote document.
    pub fn queue_save(&self, store: &ConversationStore) {
        let Some(user_id) = lock_unpoisoned(&self.user_id).clone() else {
            return;
        };

        let document = store.document();
        if document.conversations.is_empty() {
            return;
        }

        let sender = lock_unpoisoned(&self.sender);
        if let Some(sender) = sender.as_ref() {
            if sender.send(Job::Write { user_id, document }).is_err() {
                warn!("document writer is gone, dropping save");
            }
        }
    }

    /// Blocks until every previously queued write has been attempted.
    pub fn flush(&self) {
        let (ack_sender, ack_receiver) = mpsc::channel();
        {
            let sender = lock_unpoisoned(&self.sender);
            let Some(sender) = sender.as_ref() else {
                return;
            };
            if sender.send(Job::Flush(ack_sender)).is_err() {
                return;
            }
        }
        let _ = ack_receiver.recv();
    }
}

impl Drop for SyncController {
    fn drop(&mut self) {
        // Dropping the sender ends the writer loop once the queue drains.
        lock_unpoisoned(&self.sender).take();
        if let Some(writer) = self.writer.take() {
            let _ = writer.join();
        }
    }
}

fn writer_loop(receiver: &mpsc::Receiver<Job>, store: &dyn DocumentStore) {
    while let Ok(job) = receiver.recv() {
        let mut latest_write = None;
        let mut flush_acks = Vec::new();
        collect_job(job, &mut latest_write, &mut flush_acks);

        // Coalesce whatever else is already queued; only the newest
        // snapshot per batch reaches the backing store.
        while let Ok(job) = receiver.try_recv() {
            collect_job(job, &mut latest_write, &mut flush_acks);
        }

        if let Some((user_id, document)) = latest_write {
            if let Err(error) = store.save(&user_id, &document) {
                warn!(user_id = %user_id, %error, "saving document failed");
            }
        }

        for ack in flush_acks {
            let _ = ack.send(());
        }
    }
}

fn collect_job(
    job: Job,
    latest_write: &mut Option<(String, UserDocument)>,
    flush_acks: &mut Vec<mpsc::Sender<()>>,
) {
    match job {
        Job::Write { user_id, document } => *latest_write = Some((user_id, document)),
        Job::Flush(ack) => flush_acks.push(ack),
    }
}
