//! Question answering.
//!
//! Loads the knowledge documents, selects the keyword context for the
//! question and picks the canned answer from the rule table. The answer
//! comes from the rules alone; the selected context is reported in the
//! [`Resolution`] for logging and the CLI, and never changes the answer.

use anyhow::{Context as _, Result};
use serde::Serialize;

use admitbot_core::context::select_context;
use admitbot_core::rules::match_rule;
use admitbot_core::rules::FALLBACK_ANSWER;

use crate::config::DocumentsConfig;
use crate::documents::load_documents;

/// Outcome of resolving one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub answer: String,
    /// Name of the matched rule, `None` for the fallback answer.
    pub rule: Option<String>,
    /// Documents selected as context.
    pub context_sources: Vec<String>,
    /// `true` when no document matched and the whole corpus was used.
    pub context_fallback: bool,
}

pub struct Resolver {
    documents: DocumentsConfig,
}

impl Resolver {
    pub fn new(documents: DocumentsConfig) -> Self {
        Self { documents }
    }

    /// Answer `question`.
    ///
    /// Fails when the documents cannot be loaded (missing or empty directory).
    pub fn resolve(&self, question: &str) -> Result<Resolution> {
        let documents =
            load_documents(&self.documents).context("Failed to generate answer")?;
        let context = select_context(&documents, question);
        let rule = match_rule(question);

        tracing::debug!(
            rule = rule.map(|r| r.name).unwrap_or("fallback"),
            context = ?context.sources(),
            fallback_context = context.fallback,
            "resolved question"
        );

        Ok(Resolution {
            answer: rule.map_or(FALLBACK_ANSWER, |r| r.answer).to_string(),
            rule: rule.map(|r| r.name.to_string()),
            context_sources: context.sources(),
            context_fallback: context.fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn resolver_with(files: &[(&str, &str)]) -> (TempDir, Resolver) {
        let tmp = TempDir::new().unwrap();
        for (name, body) in files {
            fs::write(tmp.path().join(name), body).unwrap();
        }
        let resolver = Resolver::new(DocumentsConfig {
            dir: tmp.path().to_path_buf(),
            ..Default::default()
        });
        (tmp, resolver)
    }

    #[test]
    fn test_hostel_fee_scenario() {
        let (_tmp, resolver) = resolver_with(&[
            ("hostel.txt", "Hostel fee: $1200 per semester"),
            ("library.txt", "Library opens at 8"),
        ]);
        let r = resolver.resolve("What is the hostel fee?").unwrap();
        assert!(r
            .answer
            .starts_with("The hostel fee for the academic year 2024 is $1200 per semester"));
        assert_eq!(r.rule.as_deref(), Some("hostel_fee"));
        assert_eq!(r.context_sources, vec!["hostel.txt".to_string()]);
        assert!(!r.context_fallback);
    }

    #[test]
    fn test_answer_independent_of_context() {
        let (_tmp, resolver) = resolver_with(&[("misc.txt", "nothing relevant")]);
        let r = resolver.resolve("scholarship").unwrap();
        assert!(r.context_fallback);
        assert!(r.answer.starts_with("Scholarships available"));
    }

    #[test]
    fn test_fallback_answer() {
        let (_tmp, resolver) = resolver_with(&[("misc.txt", "abc")]);
        let r = resolver.resolve("tell me a joke").unwrap();
        assert_eq!(r.answer, FALLBACK_ANSWER);
        assert!(r.rule.is_none());
    }

    #[test]
    fn test_empty_documents_dir_errors() {
        let (_tmp, resolver) = resolver_with(&[]);
        let err = resolver.resolve("hostel").unwrap_err();
        assert!(format!("{:#}", err).contains("No documents"));
    }
}
