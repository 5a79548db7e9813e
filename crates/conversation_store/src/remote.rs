use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::DocumentStoreError;
use crate::paths::document_file_name;
use crate::schema::UserDocument;

/// Narrow seam onto the per-user remote document: one document per user
/// identity, read whole and written whole. Access control (a user reaching
/// only their own document) is the backing store's concern, not this
/// crate's.
pub trait DocumentStore: Send + Sync {
    /// Reads a user's document; `Ok(None)` when it does not exist yet.
    fn load(&self, user_id: &str) -> Result<Option<UserDocument>, DocumentStoreError>;

    /// Replaces a user's document wholesale.
    fn save(&self, user_id: &str, document: &UserDocument) -> Result<(), DocumentStoreError>;
}

/// HashMap-backed document store for tests and ephemeral local runs.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<String, UserDocument>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn load(&self, user_id: &str) -> Result<Option<UserDocument>, DocumentStoreError> {
        let documents = lock_unpoisoned(&self.documents);
        Ok(documents.get(user_id).cloned())
    }

    fn save(&self, user_id: &str, document: &UserDocument) -> Result<(), DocumentStoreError> {
        let mut documents = lock_unpoisoned(&self.documents);
        documents.insert(user_id.to_string(), document.clone());
        Ok(())
    }
}

pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// One JSON document per user under a root directory.
#[derive(Debug)]
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, user_id: &str) -> PathBuf {
        self.root.join(document_file_name(user_id))
    }
}

impl DocumentStore for FileDocumentStore {
    fn load(&self, user_id: &str) -> Result<Option<UserDocument>, DocumentStoreError> {
        let path = self.document_path(user_id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(DocumentStoreError::io("reading document", &path, error));
            }
        };

        let document = serde_json::from_str(&raw)
            .map_err(|source| DocumentStoreError::json_parse(&path, source))?;
        Ok(Some(document))
    }

    fn save(&self, user_id: &str, document: &UserDocument) -> Result<(), DocumentStoreError> {
        fs::create_dir_all(&self.root)
            .map_err(|source| DocumentStoreError::io("creating document root", &self.root, source))?;

        let encoded = serde_json::to_vec(document)
            .map_err(|source| DocumentStoreError::json_serialize(user_id, source))?;

        let path = self.document_path(user_id);
        fs::write(&path, encoded)
            .map_err(|source| DocumentStoreError::io("writing document", &path, source))
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentStore, FileDocumentStore, MemoryDocumentStore};
    use crate::schema::{Conversation, Message, UserDocument};

    fn sample_document() -> UserDocument {
        let mut conversation = Conversation::new("hello...");
        conversation.messages.push(Message::user("hello world"));
        UserDocument {
            conversations: vec![conversation],
        }
    }

    #[test]
    fn memory_store_round_trips_per_user() {
        let store = MemoryDocumentStore::new();
        let document = sample_document();

        assert_eq!(store.load("alice").expect("load"), None);
        store.save("alice", &document).expect("save");
        assert_eq!(store.load("alice").expect("load"), Some(document));
        assert_eq!(store.load("bob").expect("load"), None);
    }

    #[test]
    fn file_store_round_trips_and_reports_absent_documents() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileDocumentStore::new(dir.path().join("documents"));
        let document = sample_document();

        assert_eq!(store.load("user-1").expect("load"), None);
        store.save("user-1", &document).expect("save");
        assert_eq!(store.load("user-1").expect("load"), Some(document));
    }

    #[test]
    fn file_store_save_overwrites_previous_document() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileDocumentStore::new(dir.path());

        store.save("u", &sample_document()).expect("first save");
        store.save("u", &UserDocument::default()).expect("second save");

        assert_eq!(store.load("u").expect("load"), Some(UserDocument::default()));
    }

    #[test]
    fn file_store_rejects_corrupt_documents() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileDocumentStore::new(dir.path());
        std::fs::write(dir.path().join("u.json"), "{not json").expect("write corrupt file");

        assert!(store.load("u").is_err());
    }
}
