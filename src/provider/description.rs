use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PROVIDER_DETAIL: &str = "provider";

/// Immutable key/value record naming the provider a request wants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerDescription {
    details: BTreeMap<String, String>,
}

impl ServerDescription {
    pub fn new(provider: impl Into<String>) -> Self {
        Self::default().with_detail(PROVIDER_DETAIL, provider)
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }

    pub fn provider(&self) -> Option<&str> {
        self.detail(PROVIDER_DETAIL)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn details(&self) -> &BTreeMap<String, String> {
        &self.details
    }
}

impl std::fmt::Display for ServerDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.detail("name"), self.provider()) {
            (Some(name), Some(provider)) => write!(f, "{name} ({provider})"),
            (Some(name), None) => write!(f, "{name}"),
            (None, Some(provider)) => write!(f, "{provider}"),
            (None, None) => write!(f, "<unnamed server>"),
        }
    }
}
