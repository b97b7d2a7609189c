//! Client-side chat session state with a persist-on-change hook.
//!
//! [`ChatSession`] owns the message list of one conversation. Every
//! mutation hands a [`SessionSnapshot`] to the injected [`SessionSink`],
//! which decides where (if anywhere) the snapshot goes.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Message, Sender};

/// Number of messages kept in a persisted snapshot.
pub const SNAPSHOT_MESSAGES: usize = 50;

/// Serializable view of a session, as written by a [`SessionSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    /// Most recent messages, oldest first, at most [`SNAPSHOT_MESSAGES`].
    pub conversation_history: Vec<Message>,
}

/// Receives a snapshot after every session mutation.
pub trait SessionSink: Send {
    fn persist(&mut self, snapshot: &SessionSnapshot) -> Result<()>;
}

/// Sink that drops every snapshot.
#[derive(Debug, Default)]
pub struct NoopSink;

impl SessionSink for NoopSink {
    fn persist(&mut self, _snapshot: &SessionSnapshot) -> Result<()> {
        Ok(())
    }
}

pub struct ChatSession {
    id: String,
    started_at: DateTime<Utc>,
    messages: Vec<Message>,
    sink: Box<dyn SessionSink>,
}

impl ChatSession {
    pub fn new(sink: Box<dyn SessionSink>) -> Self {
        Self {
            id: format!("session_{}", Uuid::new_v4()),
            started_at: Utc::now(),
            messages: Vec::new(),
            sink,
        }
    }

    /// Resume from a previously persisted snapshot.
    pub fn restore(snapshot: SessionSnapshot, sink: Box<dyn SessionSink>) -> Self {
        Self {
            id: snapshot.session_id,
            started_at: snapshot.started_at,
            messages: snapshot.conversation_history,
            sink,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push_user(&mut self, text: &str) -> Result<&Message> {
        self.push(Sender::User, text)
    }

    pub fn push_bot(&mut self, text: &str) -> Result<&Message> {
        self.push(Sender::Bot, text)
    }

    fn push(&mut self, sender: Sender, text: &str) -> Result<&Message> {
        self.messages.push(Message::new(sender, text));
        self.persist()?;
        let last = self.messages.len() - 1;
        Ok(&self.messages[last])
    }

    /// Drop all messages, keeping the session identity.
    pub fn clear(&mut self) -> Result<()> {
        self.messages.clear();
        self.persist()
    }

    /// Render the last `limit` exchanges as `"{sender}: {text}"` lines.
    pub fn conversation_context(&self, limit: usize) -> String {
        let start = self.messages.len().saturating_sub(limit * 2);
        self.messages[start..]
            .iter()
            .map(|m| format!("{}: {}", m.sender, m.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let start = self.messages.len().saturating_sub(SNAPSHOT_MESSAGES);
        SessionSnapshot {
            session_id: self.id.clone(),
            started_at: self.started_at,
            conversation_history: self.messages[start..].to_vec(),
        }
    }

    fn persist(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        self.sink.persist(&snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSink {
        seen: Arc<Mutex<Vec<SessionSnapshot>>>,
    }

    impl SessionSink for RecordingSink {
        fn persist(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
            self.seen.lock().unwrap().push(snapshot.clone());
            Ok(())
        }
    }

    #[test]
    fn test_every_mutation_persists() {
        let sink = RecordingSink::default();
        let mut session = ChatSession::new(Box::new(sink.clone()));
        session.push_user("hi").unwrap();
        session.push_bot("hello").unwrap();
        session.clear().unwrap();

        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[1].conversation_history.len(), 2);
        assert!(seen[2].conversation_history.is_empty());
        assert_eq!(seen[2].session_id, session.id());
    }

    #[test]
    fn test_snapshot_keeps_last_fifty() {
        let mut session = ChatSession::new(Box::new(NoopSink));
        for i in 0..60 {
            session.push_user(&format!("message {}", i)).unwrap();
        }
        let snap = session.snapshot();
        assert_eq!(snap.conversation_history.len(), SNAPSHOT_MESSAGES);
        assert_eq!(snap.conversation_history[0].text, "message 10");
        assert_eq!(session.messages().len(), 60);
    }

    #[test]
    fn test_conversation_context() {
        let mut session = ChatSession::new(Box::new(NoopSink));
        session.push_user("q1").unwrap();
        session.push_bot("a1").unwrap();
        session.push_user("q2").unwrap();
        session.push_bot("a2").unwrap();

        assert_eq!(session.conversation_context(1), "user: q2\nbot: a2");
        assert_eq!(session.conversation_context(5).lines().count(), 4);
        assert_eq!(session.conversation_context(0), "");
    }

    #[test]
    fn test_restore_round_trip() {
        let mut session = ChatSession::new(Box::new(NoopSink));
        session.push_user("remember me").unwrap();
        let snap = session.snapshot();

        let restored = ChatSession::restore(snap, Box::new(NoopSink));
        assert_eq!(restored.id(), session.id());
        assert_eq!(restored.messages()[0].text, "remember me");
    }
}
