//! Consultant chat transcript.

use super::backend::ChatBackend;
use serde::Serialize;
use std::sync::Arc;

/// Reply recorded when the backend fails.
pub const CHAT_ERROR_REPLY: &str =
    "I'm sorry, I'm having trouble responding right now. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One entry in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

/// A conversation with the consultant. Each message is sent on its own; the
/// transcript is kept for display only.
pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            messages: Vec::new(),
            next_id: 1,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Send a message and return the bot's reply.
    ///
    /// Blank messages are ignored and return `None`. A backend failure is
    /// recorded as an error reply rather than surfaced as an error.
    pub async fn send(&mut self, message: &str) -> Option<&ChatMessage> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }

        self.push(Sender::User, message.to_string(), false);

        let (text, is_error) = match self.backend.generate(message).await {
            Ok(reply) => (reply, false),
            Err(e) => {
                tracing::warn!("{} chat failed: {e}", self.backend.name());
                (CHAT_ERROR_REPLY.to_string(), true)
            }
        };
        self.push(Sender::Bot, text, is_error);
        self.messages.last()
    }

    fn push(&mut self, sender: Sender, text: String, is_error: bool) {
        self.messages.push(ChatMessage {
            id: self.next_id,
            sender,
            text,
            is_error,
        });
        self.next_id += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct EchoBackend {
        fail: bool,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ChatBackend for EchoBackend {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ServiceError::with_status("HTTP 429", 429))
            } else {
                Ok(format!("echo: {prompt}"))
            }
        }
    }

    fn session(fail: bool) -> (ChatSession, Arc<EchoBackend>) {
        let backend = Arc::new(EchoBackend {
            fail,
            calls: AtomicU32::new(0),
        });
        (ChatSession::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn test_reply_appended_after_user_message() {
        let (mut chat, _) = session(false);
        let reply = chat.send("  hello ").await.cloned().unwrap();
        assert_eq!(reply.text, "echo: hello");
        assert_eq!(reply.sender, Sender::Bot);

        let transcript = chat.messages();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].sender, Sender::User);
        assert_eq!(transcript[0].text, "hello");
        assert!(transcript[0].id < transcript[1].id);
    }

    #[tokio::test]
    async fn test_blank_message_ignored() {
        let (mut chat, backend) = session(false);
        assert!(chat.send("   ").await.is_none());
        assert!(chat.messages().is_empty());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_recorded_as_error_reply_without_retry() {
        let (mut chat, backend) = session(true);
        let reply = chat.send("hi").await.cloned().unwrap();
        assert!(reply.is_error);
        assert_eq!(reply.text, CHAT_ERROR_REPLY);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ids_keep_increasing() {
        let (mut chat, _) = session(false);
        chat.send("one").await;
        chat.send("two").await;
        let ids: Vec<u64> = chat.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
