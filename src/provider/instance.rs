use super::{ServerDescription, ServerProvider};
use crate::execution::{FinishHook, Workload, WorkloadState};
use crate::loader::IsolatedNamespace;
use std::sync::Arc;

/// A provider built from a downloaded artifact. Holding it keeps the
/// namespace it was loaded from alive.
pub struct ProviderInstance {
    description: ServerDescription,
    class_name: String,
    provider: Box<dyn ServerProvider>,
    workload: Arc<dyn Workload>,
    namespace: Arc<IsolatedNamespace>,
}

impl ProviderInstance {
    pub fn new(
        description: ServerDescription,
        class_name: impl Into<String>,
        provider: Box<dyn ServerProvider>,
        namespace: Arc<IsolatedNamespace>,
    ) -> Self {
        let workload = provider.workload();
        Self {
            description,
            class_name: class_name.into(),
            provider,
            workload,
            namespace,
        }
    }

    pub fn description(&self) -> &ServerDescription {
        &self.description
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn provider(&self) -> &dyn ServerProvider {
        self.provider.as_ref()
    }

    pub fn namespace(&self) -> &Arc<IsolatedNamespace> {
        &self.namespace
    }
}

impl Workload for ProviderInstance {
    fn state(&self) -> WorkloadState {
        self.workload.state()
    }

    fn set_state(&self, state: WorkloadState) {
        self.workload.set_state(state);
    }

    fn set_finish_hook(&self, hook: Option<FinishHook>) {
        self.workload.set_finish_hook(hook);
    }
}

impl std::fmt::Debug for ProviderInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderInstance")
            .field("description", &self.description)
            .field("class_name", &self.class_name)
            .field("namespace", &self.namespace.id())
            .field("state", &self.workload.state())
            .finish()
    }
}
