//! Knowledge document loader.
//!
//! Reads every file under `[documents].dir` that matches the include globs
//! (`*.txt` by default). Documents are read fresh on every call; nothing is
//! cached, so edits to the directory are visible to the next question.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use admitbot_core::models::Document;

use crate::config::DocumentsConfig;

/// Load all matching documents, sorted by source name.
///
/// Fails if the directory is missing or unreadable, or if no file matches.
pub fn load_documents(config: &DocumentsConfig) -> Result<Vec<Document>> {
    let root = &config.dir;
    if !root.is_dir() {
        bail!("Documents directory does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.include_globs)?;
    let max_depth = if config.recursive { usize::MAX } else { 1 };

    let mut documents = Vec::new();
    for entry in WalkDir::new(root).max_depth(max_depth) {
        let entry = entry.with_context(|| format!("Failed to read {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();
        if !include_set.is_match(&rel_str) {
            continue;
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;
        documents.push(Document {
            content,
            source: rel_str,
        });
    }

    if documents.is_empty() {
        bail!(
            "No documents matching {:?} found in {}",
            config.include_globs,
            root.display()
        );
    }

    documents.sort_by(|a, b| a.source.cmp(&b.source));
    tracing::debug!(count = documents.len(), dir = %root.display(), "loaded documents");
    Ok(documents)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid glob: {}", pattern))?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir) -> DocumentsConfig {
        DocumentsConfig {
            dir: dir.path().to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_loads_txt_files_sorted() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b_hostel.txt"), "Hostel fee $1200").unwrap();
        fs::write(tmp.path().join("a_courses.txt"), "CSE, ME, EE").unwrap();
        fs::write(tmp.path().join("notes.md"), "ignored").unwrap();

        let docs = load_documents(&config_for(&tmp)).unwrap();
        let sources: Vec<&str> = docs.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(sources, vec!["a_courses.txt", "b_hostel.txt"]);
        assert_eq!(docs[1].content, "Hostel fee $1200");
    }

    #[test]
    fn test_not_recursive_by_default() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("top.txt"), "top").unwrap();
        fs::create_dir_all(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("nested").join("deep.txt"), "deep").unwrap();

        let docs = load_documents(&config_for(&tmp)).unwrap();
        assert_eq!(docs.len(), 1);

        let mut config = config_for(&tmp);
        config.recursive = true;
        config.include_globs = vec!["**/*.txt".to_string()];
        assert_eq!(load_documents(&config).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_documents(&config_for(&tmp)).unwrap_err();
        assert!(err.to_string().contains("No documents"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let config = DocumentsConfig {
            dir: "/definitely/not/here".into(),
            ..Default::default()
        };
        assert!(load_documents(&config).is_err());
    }
}
