//! Keyword context selection over the loaded documents.
//!
//! A document is relevant when its lower-cased content contains at least
//! one whitespace-separated token of the lower-cased question (plain
//! substring match, no word boundaries). When nothing matches, the whole
//! corpus is the context.

use crate::models::Document;

/// Documents selected as context for a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context<'a> {
    pub documents: Vec<&'a Document>,
    /// `true` when no document matched and the whole corpus was used.
    pub fallback: bool,
}

impl Context<'_> {
    /// Source names of the selected documents, in corpus order.
    pub fn sources(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.source.clone()).collect()
    }
}

pub fn select_context<'a>(documents: &'a [Document], question: &str) -> Context<'a> {
    let question_lower = question.to_lowercase();
    let tokens: Vec<&str> = question_lower.split_whitespace().collect();

    let relevant: Vec<&Document> = documents
        .iter()
        .filter(|doc| {
            let content_lower = doc.content.to_lowercase();
            tokens.iter().any(|t| content_lower.contains(t))
        })
        .collect();

    if relevant.is_empty() {
        Context {
            documents: documents.iter().collect(),
            fallback: true,
        }
    } else {
        Context {
            documents: relevant,
            fallback: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Document> {
        vec![
            Document {
                content: "Hostel fee is $1200 per semester.".into(),
                source: "hostel.txt".into(),
            },
            Document {
                content: "The Central Library opens at 8 AM.".into(),
                source: "facilities.txt".into(),
            },
        ]
    }

    #[test]
    fn test_matches_any_token_case_insensitive() {
        let docs = corpus();
        let ctx = select_context(&docs, "When does the LIBRARY open");
        // "the" appears in facilities.txt only
        assert!(!ctx.fallback);
        assert_eq!(ctx.sources(), vec!["facilities.txt".to_string()]);
    }

    #[test]
    fn test_substring_match() {
        let docs = corpus();
        let ctx = select_context(&docs, "semest");
        assert_eq!(ctx.sources(), vec!["hostel.txt".to_string()]);
    }

    #[test]
    fn test_no_match_falls_back_to_corpus() {
        let docs = corpus();
        let ctx = select_context(&docs, "quantum xylophone");
        assert!(ctx.fallback);
        assert_eq!(ctx.documents.len(), 2);
    }
}
