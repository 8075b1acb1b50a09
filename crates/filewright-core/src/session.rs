use crate::types::Message;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Transcript of one assistant session: user inputs, tool traffic, and
/// assistant answers, in arrival order. Shared across turns in interactive
/// mode; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct Session {
    transcript: Arc<RwLock<Vec<Message>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, message: Message) {
        let mut transcript = self.transcript.write().await;
        transcript.push(message);
    }

    pub async fn transcript(&self) -> Vec<Message> {
        let transcript = self.transcript.read().await;
        transcript.clone()
    }

    pub async fn clear(&self) {
        let mut transcript = self.transcript.write().await;
        transcript.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageSender;

    #[tokio::test]
    async fn push_and_clear() {
        let session = Session::new();
        session.push(Message::new_user("hello".to_string())).await;
        session
            .push(Message::new_assistant(
                "hi".to_string(),
                "gemini-2.5-flash".to_string(),
            ))
            .await;

        let transcript = session.transcript().await;
        assert_eq!(transcript.len(), 2);
        assert!(matches!(transcript[0].sender, MessageSender::User));

        session.clear().await;
        assert!(session.transcript().await.is_empty());
    }
}
