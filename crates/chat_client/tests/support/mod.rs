use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use chat_client::app::{ChatApp, HostOps};
use chat_client::runtime::ChatController;
use completion_provider::{ChatMessage, CompletionProvider, RequestId};
use conversation_store::{DocumentStore, MemoryDocumentStore, SyncController};

/// Records every host effect the app requests, without running anything.
#[derive(Default)]
pub struct HostSpy {
    pub next_request_id: RequestId,
    pub started_transcripts: Vec<Vec<ChatMessage>>,
    pub cancelled_requests: Vec<RequestId>,
    pub notices: Vec<String>,
    pub render_requests: usize,
    pub fail_start_with: Option<String>,
}

impl HostSpy {
    pub fn with_next_request_id(request_id: RequestId) -> Self {
        Self {
            next_request_id: request_id,
            ..Self::default()
        }
    }
}

impl HostOps for HostSpy {
    fn start_completion(&mut self, messages: Vec<ChatMessage>) -> Result<RequestId, String> {
        if let Some(error) = self.fail_start_with.clone() {
            return Err(error);
        }

        self.started_transcripts.push(messages);
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        Ok(request_id)
    }

    fn cancel_completion(&mut self, request_id: RequestId) {
        self.cancelled_requests.push(request_id);
    }

    fn notify(&mut self, text: &str) {
        self.notices.push(text.to_string());
    }

    fn request_render(&mut self) {
        self.render_requests += 1;
    }
}

pub struct Harness {
    pub app: Arc<Mutex<ChatApp>>,
    pub controller: Arc<ChatController>,
    pub sync: Arc<SyncController>,
    pub remote: Arc<MemoryDocumentStore>,
}

/// Wires an app, controller, and in-memory document store around the
/// given provider.
pub fn harness_with_provider(provider: Arc<dyn CompletionProvider>) -> Harness {
    let remote = Arc::new(MemoryDocumentStore::new());
    let sync = Arc::new(SyncController::new(
        Arc::clone(&remote) as Arc<dyn DocumentStore>
    ));
    let app = Arc::new(Mutex::new(ChatApp::new()));
    let controller = ChatController::new(Arc::clone(&app), provider, Arc::clone(&sync));

    Harness {
        app,
        controller,
        sync,
        remote,
    }
}

/// Pumps controller events until the predicate holds or the timeout
/// elapses; returns whether the predicate held.
pub fn pump_until(
    controller: &Arc<ChatController>,
    timeout: Duration,
    mut predicate: impl FnMut() -> bool,
) -> bool {
    let deadline = Instant::now() + timeout;

    loop {
        controller.flush_pending_events();
        if predicate() {
            return true;
        }

        if Instant::now() >= deadline {
            return false;
        }

        thread::sleep(Duration::from_millis(5));
    }
}
