use crate::app::command_support::{build_executor, load_runtime, require_provider_arg};
use crate::provider::resolve_provider;

pub fn cmd_inspect(args: &[String]) -> Result<String, String> {
    let provider = require_provider_arg(args, "inspect <provider>")?;
    let (paths, settings) = load_runtime()?;
    let executor = build_executor(paths, &settings);

    let entry = executor.cache().resolve_path(provider);
    if !entry.cached {
        return Err(format!(
            "provider `{provider}` is not cached. remediation: run `bothost fetch {provider}`"
        ));
    }
    let loader = executor
        .loader()
        .build_single(&entry.path)
        .map_err(|err| err.to_string())?;
    let namespace = loader.namespace();
    let candidates = loader.list_candidate_classes();

    let mut lines = vec![
        format!("provider={provider}"),
        format!("path={}", entry.path.display()),
        format!("classes={}", namespace.class_names().join(",")),
        format!("candidates={}", candidates.join(",")),
    ];
    match resolve_provider(&candidates) {
        Ok(class_name) => lines.push(format!("resolved={class_name}")),
        Err(err) => lines.push(format!("resolve_error={err}")),
    }
    Ok(lines.join("\n"))
}
