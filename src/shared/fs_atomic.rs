use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Hidden sibling of `path` that never collides with another writer's temp file.
pub fn temp_sibling_path(path: &Path) -> std::io::Result<PathBuf> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("path has no parent"))?;
    let mut nonce = [0u8; 6];
    getrandom::getrandom(&mut nonce).map_err(|err| std::io::Error::other(err.to_string()))?;
    let nonce = nonce
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<String>();
    let tmp_name = format!(
        ".{}.tmp-{}-{}-{}",
        path.file_name().and_then(|v| v.to_str()).unwrap_or("artifact"),
        std::process::id(),
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0),
        nonce,
    );
    Ok(parent.join(tmp_name))
}

pub fn atomic_write_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let tmp_path = temp_sibling_path(path)?;
    let written = (|| {
        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()
    })();
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    publish_file(&tmp_path, path)
}

/// Renames a fully written temp file over `path`. The temp file must live in the
/// same directory so the rename stays atomic.
pub fn publish_file(tmp_path: &Path, path: &Path) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("path has no parent"))?;
    if let Err(err) = fs::rename(tmp_path, path) {
        let _ = fs::remove_file(tmp_path);
        return Err(err);
    }
    sync_parent_dir(parent)?;
    Ok(())
}

#[cfg(unix)]
fn sync_parent_dir(parent: &Path) -> std::io::Result<()> {
    fs::File::open(parent)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent_dir(_parent: &Path) -> std::io::Result<()> {
    Ok(())
}
