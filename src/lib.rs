//! Ripple Gateway - Slack Events API gateway for LLM-backed thread replies
//!
//! Inbound deliveries flow through a fixed pipeline:
//!
//! ```text
//! POST /slack/events
//!   └─ SignatureVerifier ─ decode ─ classify
//!        ├─ handshake  → echo challenge inline
//!        ├─ ignorable  → ack inline
//!        └─ actionable → EventDedup → Dispatcher queue → ack
//!                                        │ (worker pool)
//!                                        ├─ HistoryAssembler (conversations.replies)
//!                                        ├─ CompletionClient (/v1/chat/completions)
//!                                        └─ SlackChannel (chat.postMessage, threaded)
//! ```
//!
//! The webhook path never performs outbound I/O; Slack's acknowledgment
//! deadline is honored by pushing all remote calls into background workers.

pub mod api;
pub mod channels;
pub mod completion;
pub mod config;
pub mod context;
pub mod dedup;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod signature;

pub use config::Config;
pub use error::{AuthError, CompletionError, Error, Result};
