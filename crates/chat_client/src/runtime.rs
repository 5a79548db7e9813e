use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use completion_provider::{
    CancelSignal, ChatMessage, CompletionError, CompletionProvider, CompletionRequest, RequestId,
};
use conversation_store::SyncController;

use crate::app::{ChatApp, HostOps};

/// Terminal outcome of a background completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionEvent {
    Finished { request_id: RequestId, text: String },
    Failed { request_id: RequestId, error: String },
    Cancelled { request_id: RequestId },
}

impl CompletionEvent {
    fn request_id(&self) -> RequestId {
        match self {
            Self::Finished { request_id, .. }
            | Self::Failed { request_id, .. }
            | Self::Cancelled { request_id } => *request_id,
        }
    }
}

struct ActiveRequest {
    request_id: RequestId,
    cancel: CancelSignal,
    join_handle: Option<JoinHandle<()>>,
}

/// Bridges [`ChatApp`] to provider worker threads and the sync controller.
///
/// Workers enqueue terminal events; callers drain them onto the app from
/// the foreground thread with [`ChatController::flush_pending_events`].
/// Every applied event and every submission queues a store snapshot to the
/// sync controller.
pub struct ChatController {
    app: Arc<Mutex<ChatApp>>,
    provider: Arc<dyn CompletionProvider>,
    sync: Arc<SyncController>,
    pending_events: Mutex<VecDeque<CompletionEvent>>,
    pending_notices: Mutex<Vec<String>>,
    render_requested: AtomicBool,
    next_request_id: AtomicU64,
    active_request: Mutex<Option<ActiveRequest>>,
}

impl ChatController {
    pub fn new(
        app: Arc<Mutex<ChatApp>>,
        provider: Arc<dyn CompletionProvider>,
        sync: Arc<SyncController>,
    ) -> Arc<Self> {
        Arc::new(Self {
            app,
            provider,
            sync,
            pending_events: Mutex::new(VecDeque::new()),
            pending_notices: Mutex::new(Vec::new()),
            render_requested: AtomicBool::new(false),
            next_request_id: AtomicU64::new(1),
            active_request: Mutex::new(None),
        })
    }

    /// Feeds one line of user input through the app and queues a sync
    /// snapshot for whatever it changed.
    pub fn submit_line(self: &Arc<Self>, line: &str) {
        let mut host = Arc::clone(self);
        let mut app = lock_unpoisoned(&self.app);
        app.on_submit(line, &mut host);
        self.sync.queue_save(app.store());
    }

    pub fn begin_session(&self, user_id: &str) {
        let mut app = lock_unpoisoned(&self.app);
        self.sync.begin_session(app.store_mut(), user_id);
    }

    pub fn end_session(&self) {
        let mut app = lock_unpoisoned(&self.app);
        self.sync.end_session(app.store_mut());
    }

    /// True when no request is in flight and nothing is queued behind one.
    ///
    /// Lock order matches the submission path: app first, then the active
    /// request slot.
    pub fn idle(&self) -> bool {
        let app_idle = {
            let app = lock_unpoisoned(&self.app);
            app.mode == crate::app::Mode::Idle && app.queued_count() == 0
        };

        app_idle
            && lock_unpoisoned(&self.active_request).is_none()
            && lock_unpoisoned(&self.pending_events).is_empty()
    }

    fn start_completion_internal(
        self: &Arc<Self>,
        messages: Vec<ChatMessage>,
    ) -> Result<RequestId, String> {
        let mut active_request = lock_unpoisoned(&self.active_request);
        if active_request.is_some() {
            return Err("Request already active".to_string());
        }

        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        let cancel: CancelSignal = Arc::new(AtomicBool::new(false));
        let request = CompletionRequest {
            request_id,
            messages,
        };
        let join_handle = self.spawn_worker(request, Arc::clone(&cancel))?;

        *active_request = Some(ActiveRequest {
            request_id,
            cancel,
            join_handle: Some(join_handle),
        });

        tracing::debug!(request_id, "completion request started");
        Ok(request_id)
    }

    fn spawn_worker(
        self: &Arc<Self>,
        request: CompletionRequest,
        cancel: CancelSignal,
    ) -> Result<JoinHandle<()>, String> {
        let request_id = request.request_id;
        let controller = Arc::clone(self);
        thread::Builder::new()
            .name(format!("chat-request-{request_id}"))
            .spawn(move || controller.run_worker(request, cancel))
            .map_err(|error| format!("Failed to spawn request worker: {error}"))
    }

    fn run_worker(self: Arc<Self>, request: CompletionRequest, cancel: CancelSignal) {
        let request_id = request.request_id;
        let provider = Arc::clone(&self.provider);

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            provider.complete(request, Arc::clone(&cancel))
        }));

        let event = match outcome {
            Ok(Ok(text)) => {
                if cancel.load(Ordering::SeqCst) {
                    CompletionEvent::Cancelled { request_id }
                } else {
                    CompletionEvent::Finished { request_id, text }
                }
            }
            Ok(Err(CompletionError::Cancelled)) => CompletionEvent::Cancelled { request_id },
            Ok(Err(CompletionError::Failed(error))) => {
                CompletionEvent::Failed { request_id, error }
            }
            Err(_) => {
                tracing::warn!(request_id, "completion provider panicked");
                CompletionEvent::Failed {
                    request_id,
                    error: "Completion provider panicked".to_string(),
                }
            }
        };

        self.enqueue_event(event);
    }

    fn enqueue_event(&self, event: CompletionEvent) {
        lock_unpoisoned(&self.pending_events).push_back(event);
    }

    /// Applies queued completion events to the app on the calling thread
    /// and returns how many were applied.
    pub fn flush_pending_events(self: &Arc<Self>) -> usize {
        let mut applied = 0usize;

        loop {
            let event = lock_unpoisoned(&self.pending_events).pop_front();
            let Some(event) = event else {
                break;
            };

            self.apply_event(event);
            applied += 1;
        }

        applied
    }

    fn apply_event(self: &Arc<Self>, event: CompletionEvent) {
        // Release the active slot first so a queued submission dispatched
        // from inside the app callback can start its own worker.
        self.clear_active_request_if_matching(event.request_id());

        let mut host = Arc::clone(self);
        let mut app = lock_unpoisoned(&self.app);
        match event {
            CompletionEvent::Finished { request_id, text } => {
                app.on_completion_finished(request_id, &text, &mut host);
            }
            CompletionEvent::Failed { request_id, error } => {
                app.on_completion_failed(request_id, &error, &mut host);
            }
            CompletionEvent::Cancelled { request_id } => {
                app.on_completion_cancelled(request_id, &mut host);
            }
        }

        self.sync.queue_save(app.store());
    }

    fn clear_active_request_if_matching(&self, request_id: RequestId) {
        let mut active_request = lock_unpoisoned(&self.active_request);
        let matches = active_request
            .as_ref()
            .map(|active| active.request_id)
            == Some(request_id);
        if !matches {
            return;
        }

        let mut completed = match active_request.take() {
            Some(completed) => completed,
            None => return,
        };

        if let Some(join_handle) = completed.join_handle.take() {
            let is_current_thread = join_handle.thread().id() == thread::current().id();
            if !is_current_thread && join_handle.is_finished() {
                let _ = join_handle.join();
            }
        }
    }

    fn cancel_request_internal(&self, request_id: RequestId) {
        let active_request = lock_unpoisoned(&self.active_request);
        if let Some(active_request) = active_request.as_ref() {
            if active_request.request_id == request_id {
                active_request.cancel.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Drains transient notices accumulated since the last call.
    pub fn take_notices(&self) -> Vec<String> {
        std::mem::take(&mut *lock_unpoisoned(&self.pending_notices))
    }

    /// Clears and returns the pending render request flag.
    pub fn take_render_request(&self) -> bool {
        self.render_requested.swap(false, Ordering::SeqCst)
    }
}

impl HostOps for Arc<ChatController> {
    fn start_completion(&mut self, messages: Vec<ChatMessage>) -> Result<RequestId, String> {
        self.start_completion_internal(messages)
    }

    fn cancel_completion(&mut self, request_id: RequestId) {
        self.cancel_request_internal(request_id);
    }

    fn notify(&mut self, text: &str) {
        lock_unpoisoned(&self.pending_notices).push(text.to_string());
    }

    fn request_render(&mut self) {
        self.render_requested.store(true, Ordering::SeqCst);
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
