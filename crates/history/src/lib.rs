//! Conversation history for the medrag answer pipeline.
//!
//! An indexed append-only log of conversation turns keyed by
//! (user, channel), plus the bounded window composer that turns stored
//! history into prompt context. Store failures are always best-effort at
//! the call sites: a failed append or read never blocks an answer.

pub mod store;
pub mod types;
pub mod window;

// Re-export commonly used types
pub use store::{HistoryStore, StoreStats};
pub use types::{ConversationTurn, Role};
pub use window::{compose_window, render_window, WindowBudget};
