//! Terminal chat client runtime.
//!
//! ## Provider bootstrap
//!
//! `chat_client` requires explicit provider selection:
//!
//! - `PLUME_PROVIDER=mock` for deterministic local runs
//! - `PLUME_PROVIDER=gemini` for the Gemini generateContent transport
//!   (requires `GEMINI_API_KEY`; `PLUME_MODEL` overrides the default model)
//!
//! ## Conversation persistence
//!
//! Conversations live in memory and, when a user identity is configured
//! (`PLUME_USER_ID`, optionally `PLUME_USER_NAME` / `PLUME_USER_EMAIL`),
//! mirror to a per-user document store selected by `PLUME_DOCUMENT_STORE`:
//!
//! - `file` (default): JSON documents under `PLUME_DATA_DIR`
//! - `http`: `GET`/`PUT` against `PLUME_SYNC_URL` (+ `PLUME_SYNC_TOKEN`)
//! - `memory`: process-local, discarded on exit
//!
//! Writes replace the whole document; the latest write wins. Sync failures
//! degrade to local-only operation and never interrupt the session.
//!
//! ## Image attachments
//!
//! Attachments enter through [`app::OutboundMessage::with_images`] and reach
//! providers as inline data; loaded conversations that carry images replay
//! them on the next turn. The line-based REPL itself has no attach command,
//! so turns typed at the terminal are text-only.

pub mod app;
pub mod commands;
pub mod identity;
pub mod providers;
pub mod render;
pub mod runtime;
