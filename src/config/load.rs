use super::{ConfigError, Settings};
use crate::runtime::StatePaths;

pub const PROVIDER_ENDPOINT_ENV: &str = "BOTHOST_PROVIDER_ENDPOINT";

pub fn load_settings(paths: &StatePaths) -> Result<Settings, ConfigError> {
    let mut settings = Settings::from_path(&paths.settings_file())?;
    if let Ok(endpoint) = std::env::var(PROVIDER_ENDPOINT_ENV) {
        if !endpoint.trim().is_empty() {
            settings.provider_endpoint = endpoint.trim().to_string();
        }
    }
    settings.validate()?;
    Ok(settings)
}
