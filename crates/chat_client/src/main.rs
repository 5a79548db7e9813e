use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chat_client::app::ChatApp;
use chat_client::identity::{EnvIdentityProvider, IdentityProvider};
use chat_client::providers;
use chat_client::render::render_message;
use chat_client::runtime::ChatController;
use conversation_store::{DocumentStore, FileDocumentStore, MemoryDocumentStore, SyncController};
use document_store_http::{HttpDocumentStore, HttpDocumentStoreConfig};
use tracing_subscriber::EnvFilter;

const DOCUMENT_STORE_ENV_VAR: &str = "PLUME_DOCUMENT_STORE";
const DATA_DIR_ENV_VAR: &str = "PLUME_DATA_DIR";
const SYNC_URL_ENV_VAR: &str = "PLUME_SYNC_URL";
const SYNC_TOKEN_ENV_VAR: &str = "PLUME_SYNC_TOKEN";

const DEFAULT_DATA_DIR: &str = ".plume";
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(10);

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let provider = providers::provider_from_env().map_err(io::Error::other)?;
    let profile = provider.profile();

    let document_store = document_store_from_env().map_err(io::Error::other)?;
    let sync = Arc::new(SyncController::new(document_store));

    let app = Arc::new(Mutex::new(ChatApp::new()));
    let controller = ChatController::new(Arc::clone(&app), provider, sync);

    if let Some(identity) = EnvIdentityProvider.current_user() {
        controller.begin_session(&identity.user_id);
        println!("Signed in as {}", identity.display_label());
    }

    println!(
        "plume chat ({} / {}). Type /help for commands.",
        profile.provider_id, profile.model_id
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        print!("> ");
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let rendered_before = active_message_count(&app);
        controller.submit_line(&line);

        while !controller.idle() {
            controller.flush_pending_events();
            thread::sleep(EVENT_POLL_INTERVAL);
        }
        controller.flush_pending_events();

        for notice in controller.take_notices() {
            println!("* {notice}");
        }

        if controller.take_render_request() {
            print_new_assistant_messages(&app, rendered_before);
        }

        if lock_unpoisoned(&app).should_exit {
            break;
        }
    }

    Ok(())
}

fn document_store_from_env() -> Result<Arc<dyn DocumentStore>, String> {
    let selection = std::env::var(DOCUMENT_STORE_ENV_VAR)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "file".to_string());

    match selection.as_str() {
        "memory" => Ok(Arc::new(MemoryDocumentStore::new())),
        "file" => {
            let data_dir = std::env::var(DATA_DIR_ENV_VAR)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
            Ok(Arc::new(FileDocumentStore::new(data_dir)))
        }
        "http" => {
            let base_url = std::env::var(SYNC_URL_ENV_VAR)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| {
                    format!("{SYNC_URL_ENV_VAR} must be set when {DOCUMENT_STORE_ENV_VAR}=http")
                })?;

            let mut config = HttpDocumentStoreConfig::new(base_url);
            if let Ok(token) = std::env::var(SYNC_TOKEN_ENV_VAR) {
                if !token.trim().is_empty() {
                    config = config.with_bearer_token(token.trim());
                }
            }

            let store = HttpDocumentStore::new(config).map_err(|error| error.to_string())?;
            Ok(Arc::new(store))
        }
        unknown => Err(format!(
            "Unsupported document store '{unknown}'. Available stores: file, http, memory"
        )),
    }
}

fn active_message_count(app: &Arc<Mutex<ChatApp>>) -> usize {
    lock_unpoisoned(app)
        .store()
        .active_conversation()
        .map(|conversation| conversation.messages.len())
        .unwrap_or(0)
}

fn print_new_assistant_messages(app: &Arc<Mutex<ChatApp>>, rendered_before: usize) {
    let app = lock_unpoisoned(app);
    let Some(conversation) = app.store().active_conversation() else {
        return;
    };

    let start = rendered_before.min(conversation.messages.len());
    for message in &conversation.messages[start..] {
        if message.role == conversation_store::Role::Assistant {
            println!("\n{}\n", render_message(&message.content));
        }
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
