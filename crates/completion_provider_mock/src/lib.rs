//! Deterministic mock implementation of the shared `completion_provider`
//! contract.
//!
//! This crate contains no transport logic and is intended for local
//! development and contract-level integration testing.

use std::sync::atomic::Ordering;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use completion_provider::{
    CancelSignal, CompletionError, CompletionProvider, CompletionRequest, ProviderProfile,
};

/// Stable provider identifier used for explicit startup selection.
pub const MOCK_PROVIDER_ID: &str = "mock";

const CANCEL_POLL_MS: u64 = 5;

/// Scripted terminal outcome for the next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOutcome {
    /// Respond with the given text.
    Reply(String),
    /// Fail with the given message.
    Fail(String),
    /// Wait until the cancel signal fires, then report cancellation.
    BlockUntilCancelled,
}

/// Deterministic mock provider used by `chat_client` tests and local runs.
#[derive(Debug)]
pub struct MockProvider {
    script: Mutex<Vec<MockOutcome>>,
    response_delay: Duration,
    requests_seen: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    /// Creates a provider that serves outcomes front-to-back, then falls
    /// back to echoing the last user message.
    #[must_use]
    pub fn new(script: Vec<MockOutcome>) -> Self {
        Self {
            script: Mutex::new(script),
            response_delay: Duration::ZERO,
            requests_seen: Mutex::new(Vec::new()),
        }
    }

    /// Creates a provider whose first reply is `text`; later requests fall
    /// back to echoing.
    #[must_use]
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(vec![MockOutcome::Reply(text.into())])
    }

    /// Adds an artificial per-request delay, cancellation-aware.
    #[must_use]
    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = delay;
        self
    }

    /// Requests observed so far, in submission order.
    #[must_use]
    pub fn requests_seen(&self) -> Vec<CompletionRequest> {
        self.requests_seen.lock().expect("requests lock").clone()
    }

    fn next_outcome(&self, request: &CompletionRequest) -> MockOutcome {
        let mut script = self.script.lock().expect("script lock");
        if script.is_empty() {
            let echoed = request
                .messages
                .last()
                .map(|message| message.content.clone())
                .unwrap_or_default();
            return MockOutcome::Reply(format!("mock: {echoed}"));
        }

        script.remove(0)
    }

    fn wait_cancellable(&self, duration: Duration, cancel: &CancelSignal) -> bool {
        let mut waited = Duration::ZERO;
        while waited < duration {
            if cancel.load(Ordering::Acquire) {
                return false;
            }
            let step = Duration::from_millis(CANCEL_POLL_MS).min(duration - waited);
            thread::sleep(step);
            waited += step;
        }

        !cancel.load(Ordering::Acquire)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl CompletionProvider for MockProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MOCK_PROVIDER_ID.to_string(),
            model_id: "mock-model".to_string(),
        }
    }

    fn complete(
        &self,
        request: CompletionRequest,
        cancel: CancelSignal,
    ) -> Result<String, CompletionError> {
        let outcome = self.next_outcome(&request);
        self.requests_seen
            .lock()
            .expect("requests lock")
            .push(request);

        if !self.wait_cancellable(self.response_delay, &cancel) {
            return Err(CompletionError::Cancelled);
        }

        match outcome {
            MockOutcome::Reply(text) => Ok(text),
            MockOutcome::Fail(message) => Err(CompletionError::Failed(message)),
            MockOutcome::BlockUntilCancelled => {
                while !cancel.load(Ordering::Acquire) {
                    thread::sleep(Duration::from_millis(CANCEL_POLL_MS));
                }
                Err(CompletionError::Cancelled)
            }
        }
    }
}
