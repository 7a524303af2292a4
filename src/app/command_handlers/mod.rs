use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod cache;
pub mod fetch;
pub mod inspect;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Cache => cache::cmd_cache(&args[1..]),
        CliVerb::Fetch => fetch::cmd_fetch(&args[1..]),
        CliVerb::Inspect => inspect::cmd_inspect(&args[1..]),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
