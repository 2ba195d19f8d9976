//! Dataset boundary: conflict examples loaded from disk.
//!
//! The core treats a dataset as an opaque, pre-loaded slice of examples.
//! Loading is a thin JSONL reader; building and partitioning datasets happens
//! outside this crate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::language::Language;

/// One benchmark example: a prompt embedding the conflicted snippet, and the
/// ground-truth resolved code. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictExample {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid example on line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
}

/// Load a dataset from a JSONL file, one example per line. Blank lines are
/// skipped.
pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Vec<ConflictExample>, DatasetError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut examples = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let example =
            serde_json::from_str(line).map_err(|source| DatasetError::Parse {
                line: idx + 1,
                source,
            })?;
        examples.push(example);
    }
    Ok(examples)
}

/// Conventional on-disk location of a language's dataset split under the
/// merges root: `merges/<dataset_dir>/dataset/<split>.jsonl`.
pub fn default_dataset_path(language: Language, split: &str) -> Option<PathBuf> {
    let dir = language.dataset_dir()?;
    Some(
        PathBuf::from("merges")
            .join(dir)
            .join("dataset")
            .join(format!("{split}.jsonl")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_examples_and_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.jsonl");
        std::fs::write(
            &path,
            "{\"question\":\"q1\",\"answer\":\"a1\"}\n\n{\"question\":\"q2\",\"answer\":\"a2\"}\n",
        )
        .unwrap();

        let examples = load_jsonl(&path).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].question, "q1");
        assert_eq!(examples[1].answer, "a2");
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        std::fs::write(&path, "{\"question\":\"q\",\"answer\":\"a\"}\nnot json\n").unwrap();

        match load_jsonl(&path) {
            Err(DatasetError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn default_paths_follow_language_layout() {
        let path = default_dataset_path(Language::Rust, "test").unwrap();
        assert_eq!(
            path,
            PathBuf::from("merges/repos_github_rust/dataset/test.jsonl")
        );
        assert!(default_dataset_path(Language::Generic, "test").is_none());
    }
}
