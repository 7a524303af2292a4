use crate::provider::ServerProvider;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub mod error;
pub mod manifest;
pub mod registry;

pub use error::LoadError;
pub use manifest::{read_manifest, ArtifactManifest, ClassDecl, BUNDLE_FORMAT, PROVIDER_CAPABILITY};
pub use registry::{FactoryContext, FactoryRegistry, ProviderFactory};

pub const HOST_API_VERSION: u32 = 2;

static NEXT_NAMESPACE_ID: AtomicU64 = AtomicU64::new(1);

/// Classes visible to one load attempt. Names resolve only against the
/// artifacts this namespace was built from.
#[derive(Debug)]
pub struct IsolatedNamespace {
    id: u64,
    sources: Vec<PathBuf>,
    classes: Vec<ClassDecl>,
}

impl IsolatedNamespace {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.iter().find(|class| class.name == name)
    }

    pub fn class_names(&self) -> Vec<&str> {
        self.classes.iter().map(|class| class.name.as_str()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct IsolatedLoader {
    registry: Arc<FactoryRegistry>,
}

impl IsolatedLoader {
    pub fn new(registry: Arc<FactoryRegistry>) -> Self {
        Self { registry }
    }

    /// Builds a fresh namespace over `files`. On duplicate class names the
    /// declaration from the earlier file wins.
    pub fn build(&self, files: &[PathBuf]) -> Result<Loader, LoadError> {
        if files.is_empty() {
            return Err(LoadError::NoArtifacts);
        }
        let mut classes: Vec<ClassDecl> = Vec::new();
        for file in files {
            for class in read_manifest(file)?.classes {
                if classes.iter().all(|existing| existing.name != class.name) {
                    classes.push(class);
                }
            }
        }
        let namespace = IsolatedNamespace {
            id: NEXT_NAMESPACE_ID.fetch_add(1, Ordering::Relaxed),
            sources: files.to_vec(),
            classes,
        };
        Ok(Loader {
            namespace: Arc::new(namespace),
            registry: self.registry.clone(),
        })
    }

    pub fn build_single(&self, file: &Path) -> Result<Loader, LoadError> {
        self.build(&[file.to_path_buf()])
    }
}

#[derive(Debug)]
pub struct Loader {
    namespace: Arc<IsolatedNamespace>,
    registry: Arc<FactoryRegistry>,
}

impl Loader {
    pub fn namespace(&self) -> Arc<IsolatedNamespace> {
        self.namespace.clone()
    }

    pub fn list_candidate_classes(&self) -> Vec<String> {
        self.namespace
            .classes
            .iter()
            .filter(|class| class.implements_provider())
            .map(|class| class.name.clone())
            .collect()
    }

    pub fn instantiate(&self, class_name: &str) -> Result<Box<dyn ServerProvider>, LoadError> {
        let class = self
            .namespace
            .class(class_name)
            .ok_or_else(|| LoadError::ClassNotFound {
                name: class_name.to_string(),
                reason: format!("not declared in namespace {}", self.namespace.id),
            })?;
        if !class.implements_provider() {
            return Err(LoadError::InstantiationFailure {
                name: class_name.to_string(),
                detail: format!("class does not implement `{PROVIDER_CAPABILITY}`"),
            });
        }
        if let Some(required) = class.requires_api {
            if required != HOST_API_VERSION {
                return Err(LoadError::IncompatibleVersion {
                    name: class_name.to_string(),
                    required,
                    host: HOST_API_VERSION,
                });
            }
        }
        let entry = class.entry.as_deref().unwrap_or(class.name.as_str());
        let factory = self
            .registry
            .get(entry)
            .ok_or_else(|| LoadError::ClassNotFound {
                name: class_name.to_string(),
                reason: format!("entry `{entry}` is not provided by this host"),
            })?;

        let context = FactoryContext {
            class_name,
            namespace_id: self.namespace.id,
            properties: &class.properties,
        };
        guard_construction(class_name, || factory(&context))?.map_err(|detail| {
            LoadError::InstantiationFailure {
                name: class_name.to_string(),
                detail,
            }
        })
    }
}

/// Runs provider construction code, turning a panic into `InstantiationFailure`.
pub fn guard_construction<T>(class_name: &str, f: impl FnOnce() -> T) -> Result<T, LoadError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        LoadError::InstantiationFailure {
            name: class_name.to_string(),
            detail: format!("constructor panicked: {}", panic_message(payload.as_ref())),
        }
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "non-string panic payload".to_string()
}
