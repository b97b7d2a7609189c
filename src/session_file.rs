//! JSON file persistence for `admitbot chat` sessions.
//!
//! The snapshot is rewritten in full after every message, so an interrupted
//! chat can be resumed with the same `--session` path.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use admitbot_core::session::{SessionSink, SessionSnapshot};

/// Writes each snapshot to a single JSON file.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionSink for JsonFileSink {
    fn persist(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write session file: {}", self.path.display()))
    }
}

/// Read a previously written snapshot. Returns `None` if the file does not exist.
pub fn load(path: &Path) -> Result<Option<SessionSnapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file: {}", path.display()))?;
    let snapshot = serde_json::from_str(&content)
        .with_context(|| format!("Invalid session file: {}", path.display()))?;
    Ok(Some(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use admitbot_core::session::ChatSession;
    use tempfile::TempDir;

    #[test]
    fn test_persist_and_restore() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sessions").join("chat.json");

        let mut session = ChatSession::new(Box::new(JsonFileSink::new(&path)));
        session.push_user("What is the hostel fee?").unwrap();
        session.push_bot("$1200 per semester").unwrap();

        let snapshot = load(&path).unwrap().unwrap();
        assert_eq!(snapshot.session_id, session.id());
        assert_eq!(snapshot.conversation_history.len(), 2);

        let restored = ChatSession::restore(snapshot, Box::new(JsonFileSink::new(&path)));
        assert_eq!(restored.id(), session.id());
        assert_eq!(restored.messages()[1].text, "$1200 per semester");
    }

    #[test]
    fn test_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        assert!(load(&tmp.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load(&path).is_err());
    }
}
