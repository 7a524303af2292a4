use super::{transition, CommandAvailability, ControlCommand, Transition, Workload, WorkloadState};
use crate::runtime::{append_runtime_log, StatePaths};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Notified synchronously, under the controller lock, after every state change,
/// including a workload stopping by itself. Implementations must not call back
/// into the controller.
pub trait WorkloadObserver: Send + Sync {
    fn on_workload_state_changed(&self, state: WorkloadState, availability: CommandAvailability);
}

/// Invoked when `start` arrives with nothing attached, e.g. to show a script picker.
pub trait SelectionFlow: Send + Sync {
    fn open_selection(&self);
}

struct Attached {
    id: u64,
    workload: Arc<dyn Workload>,
}

#[derive(Default)]
struct Slot {
    attached: Option<Attached>,
    next_id: u64,
    last_notified: Option<WorkloadState>,
}

impl Slot {
    fn state(&self) -> WorkloadState {
        self.attached
            .as_ref()
            .map(|current| current.workload.state())
            .unwrap_or(WorkloadState::Stopped)
    }
}

#[derive(Default)]
struct Shared {
    slot: Mutex<Slot>,
    observers: Mutex<Vec<Arc<dyn WorkloadObserver>>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, slot: &mut Slot, state: WorkloadState) {
        slot.last_notified = Some(state);
        let availability = CommandAvailability::for_state(state);
        let observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in observers {
            observer.on_workload_state_changed(state, availability);
        }
    }

    /// Called from a workload's own thread once it has stopped by itself.
    fn workload_finished(&self, id: u64) {
        let mut slot = self.lock();
        if slot.attached.as_ref().map(|current| current.id) != Some(id) {
            return;
        }
        let state = slot.state();
        if slot.last_notified != Some(state) {
            self.notify(&mut slot, state);
        }
    }
}

#[derive(Default)]
pub struct ExecutionController {
    shared: Arc<Shared>,
    selection: Option<Arc<dyn SelectionFlow>>,
}

impl ExecutionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection_flow(mut self, flow: Arc<dyn SelectionFlow>) -> Self {
        self.selection = Some(flow);
        self
    }

    pub fn add_observer(&self, observer: Arc<dyn WorkloadObserver>) {
        self.shared
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    pub fn state(&self) -> WorkloadState {
        self.shared.lock().state()
    }

    pub fn has_workload(&self) -> bool {
        self.shared.lock().attached.is_some()
    }

    pub fn current(&self) -> Option<Arc<dyn Workload>> {
        self.shared
            .lock()
            .attached
            .as_ref()
            .map(|current| current.workload.clone())
    }

    /// Makes `workload` current. A previously attached workload is stopped first.
    pub fn attach(&self, workload: Arc<dyn Workload>) {
        let mut slot = self.shared.lock();
        if let Some(previous) = slot.attached.take() {
            release(&previous.workload);
        }
        slot.next_id += 1;
        let id = slot.next_id;
        let shared = Arc::downgrade(&self.shared);
        workload.set_finish_hook(Some(Arc::new(move || {
            if let Some(shared) = shared.upgrade() {
                shared.workload_finished(id);
            }
        })));
        let state = workload.state();
        slot.attached = Some(Attached { id, workload });
        self.shared.notify(&mut slot, state);
    }

    pub fn detach(&self) -> Option<Arc<dyn Workload>> {
        let mut slot = self.shared.lock();
        let previous = slot.attached.take()?;
        release(&previous.workload);
        self.shared.notify(&mut slot, WorkloadState::Stopped);
        Some(previous.workload)
    }

    /// Applies `command` to the attached workload. Illegal commands are no-ops.
    pub fn apply(&self, command: ControlCommand) -> WorkloadState {
        {
            let mut slot = self.shared.lock();
            let current = slot.state();
            match transition(current, command, slot.attached.is_some()) {
                Transition::Apply(next) => {
                    if let Some(attached) = slot.attached.as_ref() {
                        attached.workload.set_state(next);
                    }
                    self.shared.notify(&mut slot, next);
                    return next;
                }
                Transition::Ignore => return current,
                Transition::OpenSelection => {}
            }
        }
        // The selection flow may attach a workload, so it runs outside the lock.
        if let Some(flow) = &self.selection {
            flow.open_selection();
        }
        self.state()
    }

    pub fn start(&self) -> WorkloadState {
        self.apply(ControlCommand::Start)
    }

    pub fn pause(&self) -> WorkloadState {
        self.apply(ControlCommand::Pause)
    }

    pub fn resume(&self) -> WorkloadState {
        self.apply(ControlCommand::Resume)
    }

    pub fn stop(&self) -> WorkloadState {
        self.apply(ControlCommand::Stop)
    }
}

fn release(workload: &Arc<dyn Workload>) {
    workload.set_finish_hook(None);
    if workload.state() != WorkloadState::Stopped {
        workload.set_state(WorkloadState::Stopped);
    }
}

impl std::fmt::Debug for ExecutionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionController")
            .field("attached", &self.has_workload())
            .field("state", &self.state())
            .finish()
    }
}

/// Delivers commands to `controller` from a channel until every sender is dropped.
pub fn spawn_command_loop(
    controller: Arc<ExecutionController>,
) -> (Sender<ControlCommand>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel::<ControlCommand>();
    let handle = thread::spawn(move || {
        for command in rx {
            controller.apply(command);
        }
    });
    (tx, handle)
}

/// Records every transition in the runtime log.
#[derive(Debug, Clone)]
pub struct LoggingObserver {
    paths: StatePaths,
}

impl LoggingObserver {
    pub fn new(paths: StatePaths) -> Self {
        Self { paths }
    }
}

impl WorkloadObserver for LoggingObserver {
    fn on_workload_state_changed(&self, state: WorkloadState, availability: CommandAvailability) {
        append_runtime_log(
            &self.paths,
            "info",
            "workload.state",
            &format!(
                "state={state} run={} pause={} stop={}",
                availability.run, availability.pause, availability.stop
            ),
        );
    }
}
