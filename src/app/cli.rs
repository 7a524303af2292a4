#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Cache,
    Fetch,
    Inspect,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "cache" => CliVerb::Cache,
        "fetch" => CliVerb::Fetch,
        "inspect" => CliVerb::Inspect,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  cache path <provider>                Show the cache file for a provider".to_string(),
        "  cache list                           List cached provider artifacts".to_string(),
        "  fetch <provider> [--nightly]         Download a provider artifact into the cache"
            .to_string(),
        "  inspect <provider>                   List provider classes in a cached artifact"
            .to_string(),
        "  help                                 Show this help".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}
