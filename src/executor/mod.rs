use crate::cache::{CachedArtifact, ContentCache};
use crate::config::{ReleaseChannel, Settings};
use crate::execution::ExecutionController;
use crate::fetch::{render_endpoint, ArtifactFetcher, FetchError, HttpFetcher, ProgressObserver};
use crate::loader::{guard_construction, FactoryRegistry, IsolatedLoader};
use crate::provider::{resolve_provider, ProviderInstance, ServerDescription};
use crate::runtime::{append_runtime_log, StatePaths};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub mod error;
pub mod report;

pub use error::{ErrorCategory, ExecutorError};
pub use report::{ErrorReporter, StderrReporter, ERROR_TITLE};

/// Receives the provider a successful request produced.
pub trait WorkloadOwner: Send + Sync {
    fn finalize(&self, instance: Arc<ProviderInstance>);
}

impl WorkloadOwner for ExecutionController {
    fn finalize(&self, instance: Arc<ProviderInstance>) {
        self.attach(instance);
    }
}

/// Fetches, loads and instantiates the provider named by a [`ServerDescription`].
pub struct ProviderExecutor {
    endpoint_template: String,
    release_channel: ReleaseChannel,
    paths: StatePaths,
    cache: Arc<ContentCache>,
    fetcher: Arc<dyn ArtifactFetcher>,
    loader: IsolatedLoader,
    reporter: Arc<dyn ErrorReporter>,
    progress: Option<Arc<dyn ProgressObserver>>,
    shutdown: Arc<AtomicBool>,
}

impl ProviderExecutor {
    pub fn new(
        paths: StatePaths,
        settings: &Settings,
        registry: Arc<FactoryRegistry>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let fetcher = HttpFetcher::from_settings(settings).with_cancel_flag(shutdown.clone());
        let cache = ContentCache::new(settings.resolve_cache_dir(&paths.cache_dir()));
        Self {
            endpoint_template: settings.provider_endpoint.clone(),
            release_channel: settings.release_channel,
            paths,
            cache: Arc::new(cache),
            fetcher: Arc::new(fetcher),
            loader: IsolatedLoader::new(registry),
            reporter,
            progress: None,
            shutdown,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn ArtifactFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_cache(mut self, cache: Arc<ContentCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_progress_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.progress = Some(observer);
        self
    }

    pub fn with_release_channel(mut self, channel: ReleaseChannel) -> Self {
        self.release_channel = channel;
        self
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    pub fn loader(&self) -> &IsolatedLoader {
        &self.loader
    }

    /// Flag observed by the built-in fetcher between chunks.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn artifact_url(&self, provider: &str) -> String {
        render_endpoint(&self.endpoint_template, self.release_channel, provider)
    }

    fn log(&self, level: &str, event: &str, message: &str) {
        append_runtime_log(&self.paths, level, event, message);
    }

    /// Returns the cached artifact for `provider`, downloading it first if needed.
    /// Concurrent callers for the same provider wait for a single download.
    pub fn ensure_artifact(&self, provider: &str) -> Result<CachedArtifact, ExecutorError> {
        let resolve_or_fetch = || -> Result<CachedArtifact, ExecutorError> {
            let entry = self.cache.resolve_path(provider);
            if entry.cached {
                self.log(
                    "info",
                    "provider.cache.hit",
                    &format!("provider={provider} key={}", entry.key),
                );
                return Ok(entry);
            }

            let url = self.artifact_url(provider);
            self.log(
                "info",
                "provider.download.start",
                &format!("provider={provider} url={url}"),
            );
            match self.fetcher.fetch(&url, &entry.path, self.progress.as_deref()) {
                Ok(bytes) => self.log(
                    "info",
                    "provider.download.complete",
                    &format!("provider={provider} key={} bytes={bytes}", entry.key),
                ),
                Err(err) => {
                    self.log(
                        "error",
                        "provider.download.failed",
                        &format!("provider={provider} error={err}"),
                    );
                    return Err(err.into());
                }
            }

            let entry = self.cache.resolve_path(provider);
            if !entry.cached {
                return Err(FetchError::EmptyBody { url }.into());
            }
            Ok(entry)
        };
        self.cache.with_artifact_lock(provider, resolve_or_fetch)
    }

    /// Runs the whole request in order and returns the instance without
    /// publishing it or reporting errors.
    pub fn load(&self, description: &ServerDescription) -> Result<ProviderInstance, ExecutorError> {
        let provider = description
            .provider()
            .ok_or(ExecutorError::MissingProvider)?;
        let artifact = self.ensure_artifact(provider)?;

        let loader = self.loader.build_single(&artifact.path)?;
        let candidates = loader.list_candidate_classes();
        let class_name = resolve_provider(&candidates).inspect_err(|err| {
            self.log(
                "error",
                "provider.resolve.failed",
                &format!("provider={provider} error={err}"),
            );
        })?;

        let provider = loader.instantiate(&class_name)?;
        let namespace = loader.namespace();
        let instance = guard_construction(&class_name, || {
            ProviderInstance::new(description.clone(), class_name.clone(), provider, namespace)
        })?;
        Ok(instance)
    }

    /// Loads the provider and hands it to `owner`. Failures are reported once
    /// through the [`ErrorReporter`] and never propagate.
    pub fn execute(
        &self,
        description: &ServerDescription,
        owner: &dyn WorkloadOwner,
    ) -> Option<Arc<ProviderInstance>> {
        match self.load(description) {
            Ok(instance) => {
                let instance = Arc::new(instance);
                self.log(
                    "info",
                    "provider.loaded",
                    &format!(
                        "server={description} class={} namespace={}",
                        instance.class_name(),
                        instance.namespace().id()
                    ),
                );
                owner.finalize(instance.clone());
                Some(instance)
            }
            Err(err) => {
                let category = err.category();
                if category.needs_support_diagnostic() {
                    self.log(
                        "error",
                        "provider.instantiate.failed",
                        &format!(
                            "server={description} category={} diagnostic={}",
                            category.as_str(),
                            err.diagnostic()
                        ),
                    );
                }
                self.reporter.report_error(ERROR_TITLE, &err.user_message());
                None
            }
        }
    }

    /// Runs [`ProviderExecutor::execute`] off the calling thread.
    pub fn spawn(
        self: &Arc<Self>,
        description: ServerDescription,
        owner: Arc<dyn WorkloadOwner>,
    ) -> JoinHandle<Option<Arc<ProviderInstance>>> {
        let executor = self.clone();
        thread::spawn(move || executor.execute(&description, owner.as_ref()))
    }
}

impl std::fmt::Debug for ProviderExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderExecutor")
            .field("endpoint_template", &self.endpoint_template)
            .field("release_channel", &self.release_channel)
            .field("cache_root", &self.cache.root())
            .finish()
    }
}
