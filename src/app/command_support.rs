use crate::config::{load_settings, Settings};
use crate::executor::{ProviderExecutor, StderrReporter};
use crate::fetch::ProgressObserver;
use crate::loader::FactoryRegistry;
use crate::runtime::{bootstrap_state_root, default_state_root_path, StatePaths};
use std::sync::Arc;

pub fn ensure_runtime_root() -> Result<StatePaths, String> {
    let root = default_state_root_path().map_err(|e| e.to_string())?;
    let paths = StatePaths::new(root);
    bootstrap_state_root(&paths).map_err(|e| e.to_string())?;
    Ok(paths)
}

pub fn load_runtime() -> Result<(StatePaths, Settings), String> {
    let paths = ensure_runtime_root()?;
    let settings = load_settings(&paths).map_err(|e| e.to_string())?;
    Ok((paths, settings))
}

pub fn build_executor(paths: StatePaths, settings: &Settings) -> ProviderExecutor {
    ProviderExecutor::new(
        paths,
        settings,
        Arc::new(FactoryRegistry::default()),
        Arc::new(StderrReporter),
    )
}

pub fn require_provider_arg<'a>(args: &'a [String], usage: &str) -> Result<&'a str, String> {
    args.iter()
        .find(|arg| !arg.starts_with("--"))
        .map(String::as_str)
        .filter(|arg| !arg.trim().is_empty())
        .ok_or_else(|| format!("usage: {usage}"))
}

/// Prints download progress to stderr, one line per whole percent (or per MiB
/// when the size is unknown).
#[derive(Debug, Default)]
pub struct StderrProgress {
    last_mark: std::sync::atomic::AtomicU64,
}

impl ProgressObserver for StderrProgress {
    fn on_progress(&self, bytes_so_far: u64, total_bytes: Option<u64>) {
        use std::sync::atomic::Ordering;
        let mark = match total_bytes {
            Some(total) if total > 0 => bytes_so_far.saturating_mul(100) / total,
            _ => bytes_so_far / (1024 * 1024),
        };
        if self.last_mark.swap(mark, Ordering::Relaxed) == mark && bytes_so_far > 0 {
            return;
        }
        match total_bytes {
            Some(total) => eprintln!("downloading provider... {mark}% ({bytes_so_far}/{total} bytes)"),
            None => eprintln!("downloading provider... {bytes_so_far} bytes"),
        }
    }
}
