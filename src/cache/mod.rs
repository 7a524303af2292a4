use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

pub const ARTIFACT_EXTENSION: &str = "bundle";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedArtifact {
    pub key: String,
    pub path: PathBuf,
    pub cached: bool,
}

/// Content-addressed store of downloaded provider artifacts.
///
/// Artifacts are never evicted here. Callers that may download must go through
/// [`ContentCache::with_artifact_lock`] so only one fetch per name runs at a time.
#[derive(Debug)]
pub struct ContentCache {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ContentCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve_path(&self, artifact_name: &str) -> CachedArtifact {
        let key = artifact_key(artifact_name);
        let path = self.root.join(format!("{key}.{ARTIFACT_EXTENSION}"));
        let cached = is_populated(&path);
        CachedArtifact { key, path, cached }
    }

    /// Runs `f` while holding the lock for `artifact_name`. The lock entry is
    /// dropped again once no other caller holds or waits on it.
    pub fn with_artifact_lock<T>(&self, artifact_name: &str, f: impl FnOnce() -> T) -> T {
        let key = artifact_key(artifact_name);
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let result = {
            let _held = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&key);
        }
        drop(lock);
        result
    }

    pub fn list_cached(&self) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut out: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension().and_then(|v| v.to_str()) == Some(ARTIFACT_EXTENSION)
                    && is_populated(path)
            })
            .collect();
        out.sort();
        out
    }
}

pub fn artifact_key(artifact_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(artifact_name.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

fn is_populated(path: &Path) -> bool {
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}
