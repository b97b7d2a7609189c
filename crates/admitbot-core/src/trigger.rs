//! Conditions that surface the lead-capture form during a chat.

use std::time::Duration;

use serde::Deserialize;

/// Thresholds that decide when to ask a visitor for contact details.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeadTriggers {
    /// Case-insensitive substrings that signal purchase intent.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    /// Prompt once the conversation reaches this many messages.
    #[serde(default = "default_message_count")]
    pub message_count: usize,
    /// Prompt once the visitor has spent this many seconds in the chat.
    #[serde(default = "default_time_spent_secs")]
    pub time_spent_secs: u64,
}

fn default_keywords() -> Vec<String> {
    [
        "admission",
        "apply",
        "course",
        "fee",
        "interested",
        "contact",
        "brochure",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_message_count() -> usize {
    3
}

fn default_time_spent_secs() -> u64 {
    30
}

impl Default for LeadTriggers {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            message_count: default_message_count(),
            time_spent_secs: default_time_spent_secs(),
        }
    }
}

impl LeadTriggers {
    pub fn time_spent(&self) -> Duration {
        Duration::from_secs(self.time_spent_secs)
    }

    /// Whether the lead form should be shown after `message`.
    ///
    /// Never fires while the form is already open.
    pub fn should_prompt(
        &self,
        message: &str,
        message_count: usize,
        elapsed: Duration,
        form_open: bool,
    ) -> bool {
        if form_open {
            return false;
        }
        let message_lower = message.to_lowercase();
        let has_keyword = self
            .keywords
            .iter()
            .any(|k| message_lower.contains(&k.to_lowercase()));

        has_keyword || message_count >= self.message_count || elapsed >= self.time_spent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_trigger() {
        let t = LeadTriggers::default();
        assert!(t.should_prompt("I want to APPLY", 1, Duration::ZERO, false));
        assert!(!t.should_prompt("hello there", 1, Duration::ZERO, false));
    }

    #[test]
    fn test_message_count_trigger() {
        let t = LeadTriggers::default();
        assert!(!t.should_prompt("hi", 2, Duration::ZERO, false));
        assert!(t.should_prompt("hi", 3, Duration::ZERO, false));
    }

    #[test]
    fn test_time_trigger() {
        let t = LeadTriggers::default();
        assert!(!t.should_prompt("hi", 0, Duration::from_secs(29), false));
        assert!(t.should_prompt("hi", 0, Duration::from_secs(30), false));
    }

    #[test]
    fn test_never_fires_while_form_open() {
        let t = LeadTriggers::default();
        assert!(!t.should_prompt("admission", 10, Duration::from_secs(600), true));
    }

    #[test]
    fn test_custom_keywords_from_toml_shape() {
        let t: LeadTriggers =
            serde_json::from_str(r#"{"keywords": ["Brochure"], "message_count": 10}"#).unwrap();
        assert!(t.should_prompt("send me a brochure", 0, Duration::ZERO, false));
        assert!(!t.should_prompt("what about fees", 0, Duration::ZERO, false));
        assert_eq!(t.time_spent_secs, 30);
    }
}
