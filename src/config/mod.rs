pub mod error;
pub mod load;
pub mod settings;

pub use error::ConfigError;
pub use load::{load_settings, PROVIDER_ENDPOINT_ENV};
pub use settings::{ReleaseChannel, Settings, DEFAULT_PROVIDER_ENDPOINT};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::StatePaths;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn missing_settings_file_yields_defaults() {
        let dir = tempdir().expect("tempdir");
        let settings = Settings::from_path(&dir.path().join("config.yaml")).expect("defaults");
        assert_eq!(settings.release_channel, ReleaseChannel::Stable);
        assert_eq!(settings.provider_endpoint, DEFAULT_PROVIDER_ENDPOINT);
        assert_eq!(settings.connect_timeout_secs, 10);
        assert_eq!(settings.read_timeout_secs, 30);
        assert!(settings.cache_dir.is_none());
    }

    #[test]
    fn partial_yaml_keeps_defaults_for_missing_fields() {
        let settings: Settings = serde_yaml::from_str(
            r#"
release_channel: nightly
cache_dir: /tmp/bothost-cache
"#,
        )
        .expect("parse settings");
        assert!(settings.release_channel.is_nightly());
        assert_eq!(
            settings.resolve_cache_dir(Path::new("/unused")),
            Path::new("/tmp/bothost-cache")
        );
        assert_eq!(settings.provider_endpoint, DEFAULT_PROVIDER_ENDPOINT);
    }

    #[test]
    fn invalid_yaml_reports_parse_error_with_path() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        fs::write(&path, "release_channel: [unterminated").expect("write");
        let err = Settings::from_path(&path).expect_err("parse must fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.yaml"));
    }

    #[test]
    fn validation_rejects_zero_timeouts_and_empty_endpoint() {
        let mut settings = Settings {
            read_timeout_secs: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        settings.read_timeout_secs = 5;
        settings.provider_endpoint = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn release_channel_parse_is_case_insensitive() {
        assert_eq!(
            ReleaseChannel::parse(" Nightly ").expect("parse"),
            ReleaseChannel::Nightly
        );
        assert_eq!(
            ReleaseChannel::parse("STABLE").expect("parse"),
            ReleaseChannel::Stable
        );
        assert!(ReleaseChannel::parse("beta").is_err());
    }

    #[test]
    fn endpoint_env_override_wins_over_file() {
        let _guard = ENV_LOCK.lock().expect("env lock");
        let dir = tempdir().expect("tempdir");
        let paths = StatePaths::new(dir.path());
        fs::write(
            paths.settings_file(),
            "provider_endpoint: http://file.example/provider?nightly={nightly}\n",
        )
        .expect("write settings");

        std::env::set_var(PROVIDER_ENDPOINT_ENV, "http://env.example/{provider}");
        let settings = load_settings(&paths);
        std::env::remove_var(PROVIDER_ENDPOINT_ENV);

        let settings = settings.expect("load settings");
        assert_eq!(settings.provider_endpoint, "http://env.example/{provider}");
    }
}
