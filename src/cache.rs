//! Content-addressed on-disk cache of model completions.
//!
//! Layout: one directory per model name, one JSON file per cache key, where
//! the key is a blake3 digest of the prompt text. Entries are never mutated
//! after a successful write; re-querying the same `(model, prompt)` pair is a
//! pure disk lookup.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A single cached model response.
///
/// `result` is always present once cached; `reasoning` is absent for models
/// that do not expose a reasoning trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub prompt: String,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Handle to a cache root directory. Cheap to clone; holds no open files.
///
/// The root is injected rather than read from ambient global state so that
/// every test can construct its own temporary cache.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    root: PathBuf,
}

impl ResponseCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `MERGE_BENCH_CACHE_DIR` when set, otherwise `query_cache` in the
    /// working directory.
    pub fn default_root() -> PathBuf {
        if let Ok(path) = std::env::var("MERGE_BENCH_CACHE_DIR") {
            return PathBuf::from(path);
        }
        PathBuf::from("query_cache")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic content hash of the prompt text. Collision resistance is
    /// the requirement here, not cryptographic secrecy.
    pub fn cache_key(prompt: &str) -> String {
        blake3::hash(prompt.as_bytes()).to_hex().to_string()
    }

    fn entry_path(&self, model_name: &str, key: &str) -> PathBuf {
        self.root.join(model_name).join(format!("{key}.json"))
    }

    /// Look up a prior response. No network access; `Ok(None)` means the pair
    /// has not been queried yet (or previously failed without being cached).
    pub fn get(
        &self,
        model_name: &str,
        prompt: &str,
    ) -> Result<Option<CompletionRecord>, CacheError> {
        let path = self.entry_path(model_name, &Self::cache_key(prompt));
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist a record, overwriting any existing entry for the same key.
    ///
    /// The record is written to a temporary file in the target directory and
    /// renamed into place, so a concurrent `get` sees either the old or the
    /// fully-written new value, never a partial write. Same-key races are
    /// harmless: the content is a deterministic function of the prompt, so
    /// last-writer-wins.
    pub fn put(
        &self,
        model_name: &str,
        prompt: &str,
        record: &CompletionRecord,
    ) -> Result<(), CacheError> {
        let key = Self::cache_key(prompt);
        let path = self.entry_path(model_name, &key);
        let dir = path.parent().unwrap_or(&self.root);
        std::fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(record)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!(model = model_name, key = %key, "cached response");
        Ok(())
    }
}

// =============================================================================
// Cache maintenance
// =============================================================================

/// Per-model tallies from a cache scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelCacheStats {
    pub total: usize,
    pub valid: usize,
    pub empty_results: usize,
    pub malformed_json: usize,
    pub unreadable: usize,
}

/// Result of walking the whole cache tree.
#[derive(Debug, Default, Serialize)]
pub struct CacheScanReport {
    pub models: BTreeMap<String, ModelCacheStats>,
    pub total_entries: usize,
    /// Entries with an empty result or unparseable JSON, slated for cleanup.
    #[serde(skip)]
    pub problematic: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheCleanStats {
    pub examined: usize,
    pub deleted: usize,
}

impl ResponseCache {
    /// Walk every entry and classify it. Entries whose `result` is empty,
    /// whose JSON does not parse, or that cannot be read at all correspond to
    /// interrupted runs or providers that returned blank content; deleting
    /// them lets the next run re-query.
    pub fn scan(&self) -> Result<CacheScanReport, CacheError> {
        let mut report = CacheScanReport::default();
        if !self.root.exists() {
            warn!(root = %self.root.display(), "cache root does not exist");
            return Ok(report);
        }

        let mut files = Vec::new();
        collect_json_files(&self.root, &mut files)?;

        for path in files {
            let model_name = path
                .parent()
                .and_then(|dir| dir.strip_prefix(&self.root).ok())
                .map(|rel| rel.to_string_lossy().into_owned())
                .unwrap_or_default();
            let stats = report.models.entry(model_name).or_default();
            stats.total += 1;
            report.total_entries += 1;

            // One unreadable entry must not abort the walk; classify it and
            // move on to the rest.
            let raw = match std::fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unreadable cache entry");
                    stats.unreadable += 1;
                    report.problematic.push(path);
                    continue;
                }
            };
            match serde_json::from_str::<CompletionRecord>(&raw) {
                Ok(record) if record.result.trim().is_empty() => {
                    stats.empty_results += 1;
                    report.problematic.push(path);
                }
                Ok(_) => stats.valid += 1,
                Err(_) => {
                    stats.malformed_json += 1;
                    report.problematic.push(path);
                }
            }
        }
        Ok(report)
    }

    /// Delete problematic entries found by [`scan`](Self::scan). With
    /// `dry_run` the entries are only counted. Valid entries are never
    /// touched.
    pub fn clean(&self, dry_run: bool) -> Result<CacheCleanStats, CacheError> {
        let report = self.scan()?;
        let mut deleted = 0;
        for path in &report.problematic {
            if !dry_run {
                std::fs::remove_file(path)?;
            }
            deleted += 1;
        }
        Ok(CacheCleanStats {
            examined: report.total_entries,
            deleted,
        })
    }
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}
