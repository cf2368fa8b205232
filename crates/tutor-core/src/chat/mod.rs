//! Free-form "virtual consultant" chat.
//!
//! Unlike question answering, chat calls are made once with no retry; a
//! failure becomes an apology in the transcript.

mod backend;
mod session;

pub use backend::{ChatBackend, GeminiBackend};
pub use session::{ChatMessage, ChatSession, Sender, CHAT_ERROR_REPLY};
