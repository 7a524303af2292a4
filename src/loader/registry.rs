use crate::provider::ServerProvider;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct FactoryContext<'a> {
    pub class_name: &'a str,
    pub namespace_id: u64,
    pub properties: &'a Map<String, Value>,
}

pub type ProviderFactory =
    Arc<dyn Fn(&FactoryContext<'_>) -> Result<Box<dyn ServerProvider>, String> + Send + Sync>;

/// Host-side table of provider constructors, keyed by the `entry` a bundle class names.
#[derive(Clone, Default)]
pub struct FactoryRegistry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl FactoryRegistry {
    pub fn register<F>(&mut self, entry: impl Into<String>, factory: F)
    where
        F: Fn(&FactoryContext<'_>) -> Result<Box<dyn ServerProvider>, String>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(entry.into(), Arc::new(factory));
    }

    pub fn get(&self, entry: &str) -> Option<ProviderFactory> {
        self.factories.get(entry).cloned()
    }

    pub fn entries(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("entries", &self.entries())
            .finish()
    }
}
