use crate::execution::Workload;
use std::sync::Arc;

pub mod description;
pub mod instance;
pub mod resolver;

pub use description::{ServerDescription, PROVIDER_DETAIL};
pub use instance::ProviderInstance;
pub use resolver::{resolve_provider, ResolveError};

/// Capability every provider class in an artifact implements: produce the one
/// executable unit the controller drives.
pub trait ServerProvider: Send + Sync {
    fn workload(&self) -> Arc<dyn Workload>;
}
