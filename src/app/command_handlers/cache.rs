use crate::app::command_support::{load_runtime, require_provider_arg};
use crate::cache::ContentCache;

pub fn cmd_cache(args: &[String]) -> Result<String, String> {
    let (paths, settings) = load_runtime()?;
    let cache = ContentCache::new(settings.resolve_cache_dir(&paths.cache_dir()));

    match args.first().map(String::as_str) {
        Some("path") => {
            let provider = require_provider_arg(&args[1..], "cache path <provider>")?;
            let entry = cache.resolve_path(provider);
            Ok(format!(
                "provider={provider}\nkey={}\npath={}\ncached={}",
                entry.key,
                entry.path.display(),
                entry.cached
            ))
        }
        Some("list") => {
            let entries = cache.list_cached();
            let mut lines = vec![
                format!("cache_dir={}", cache.root().display()),
                format!("artifacts={}", entries.len()),
            ];
            lines.extend(entries.iter().map(|path| path.display().to_string()));
            Ok(lines.join("\n"))
        }
        _ => Err("usage: cache path <provider> | cache list".to_string()),
    }
}
