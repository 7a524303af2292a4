use crate::app::command_support::{
    build_executor, load_runtime, require_provider_arg, StderrProgress,
};
use crate::config::ReleaseChannel;
use std::sync::Arc;

pub fn cmd_fetch(args: &[String]) -> Result<String, String> {
    let provider = require_provider_arg(args, "fetch <provider> [--nightly]")?;
    let (paths, settings) = load_runtime()?;

    let mut channel = settings.release_channel;
    for flag in args.iter().filter(|arg| arg.starts_with("--")) {
        channel = match flag.as_str() {
            "--nightly" => ReleaseChannel::Nightly,
            "--stable" => ReleaseChannel::Stable,
            other => return Err(format!("unknown flag `{other}` for fetch")),
        };
    }

    let executor = build_executor(paths, &settings)
        .with_release_channel(channel)
        .with_progress_observer(Arc::new(StderrProgress::default()));
    let entry = executor
        .ensure_artifact(provider)
        .map_err(|err| err.user_message())?;

    Ok(format!(
        "provider={provider}\nchannel={channel}\nkey={}\npath={}\ncached={}",
        entry.key,
        entry.path.display(),
        entry.cached
    ))
}
