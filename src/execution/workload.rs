use super::WorkloadState;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// A controllable unit of execution. The controller only ever forwards a target
/// state; the workload is expected to observe it and exit at a safe point.
pub trait Workload: Send + Sync {
    fn state(&self) -> WorkloadState;
    fn set_state(&self, state: WorkloadState);

    /// Installs the callback run after the workload stops on its own. Workloads
    /// that only ever stop on request can ignore it.
    fn set_finish_hook(&self, _hook: Option<FinishHook>) {}
}

pub type FinishHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Default)]
struct FlagInner {
    state: WorkloadState,
    generation: u64,
}

/// Shared state flag a workload thread polls cooperatively.
#[derive(Debug, Default)]
pub struct RunFlag {
    inner: Mutex<FlagInner>,
    changed: Condvar,
}

impl RunFlag {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FlagInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self) -> WorkloadState {
        self.lock().state
    }

    /// Sets the state and returns the run generation it belongs to. Every
    /// `Stopped -> Running` edge starts a new generation.
    pub fn set(&self, state: WorkloadState) -> u64 {
        self.replace(state).1
    }

    /// Like [`RunFlag::set`], also returning the state it replaced, read under the same lock.
    pub fn replace(&self, state: WorkloadState) -> (WorkloadState, u64) {
        let mut inner = self.lock();
        let previous = inner.state;
        if previous == WorkloadState::Stopped && state == WorkloadState::Running {
            inner.generation += 1;
        }
        inner.state = state;
        let generation = inner.generation;
        drop(inner);
        self.changed.notify_all();
        (previous, generation)
    }

    /// Stops the flag only while `generation` is still the current run.
    pub fn stop_if_generation(&self, generation: u64) -> bool {
        let mut inner = self.lock();
        if inner.generation != generation || inner.state == WorkloadState::Stopped {
            return false;
        }
        inner.state = WorkloadState::Stopped;
        drop(inner);
        self.changed.notify_all();
        true
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn is_stopped(&self) -> bool {
        self.get() == WorkloadState::Stopped
    }

    /// Blocks while paused. Returns `false` once the run `generation` has been
    /// stopped or superseded.
    pub fn wait_until_runnable(&self, generation: u64) -> bool {
        let mut inner = self.lock();
        loop {
            if inner.generation != generation || inner.state == WorkloadState::Stopped {
                return false;
            }
            if inner.state == WorkloadState::Running {
                return true;
            }
            inner = self
                .changed
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Sleeps up to `total`, waking early on any state change. Returns `true`
    /// if the full duration elapsed.
    pub fn sleep(&self, total: Duration) -> bool {
        let deadline = Instant::now() + total;
        let mut inner = self.lock();
        let start_state = inner.state;
        let start_generation = inner.generation;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            let (next, _) = self
                .changed
                .wait_timeout(inner, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            inner = next;
            if inner.state != start_state || inner.generation != start_generation {
                return false;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Continue(Duration),
    Done,
}

pub type ScriptBody = Box<dyn FnMut() -> ScriptStep + Send>;

/// Runs a looping script body on its own thread while in `Running`.
pub struct ScriptWorkload {
    name: String,
    flag: Arc<RunFlag>,
    body: Arc<Mutex<ScriptBody>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    finish_hook: Arc<Mutex<Option<FinishHook>>>,
}

impl ScriptWorkload {
    pub fn new(name: impl Into<String>, body: impl FnMut() -> ScriptStep + Send + 'static) -> Self {
        Self {
            name: name.into(),
            flag: Arc::new(RunFlag::new()),
            body: Arc::new(Mutex::new(Box::new(body))),
            worker: Mutex::new(None),
            finish_hook: Arc::new(Mutex::new(None)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flag(&self) -> Arc<RunFlag> {
        self.flag.clone()
    }

    /// Waits for the current script thread to exit. Only meaningful after a stop.
    pub fn join(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    fn spawn_run(&self, generation: u64) {
        let flag = self.flag.clone();
        let body = self.body.clone();
        let finish_hook = self.finish_hook.clone();
        let handle = thread::spawn(move || {
            while flag.wait_until_runnable(generation) {
                let step = {
                    let mut body = body.lock().unwrap_or_else(PoisonError::into_inner);
                    (*body)()
                };
                match step {
                    ScriptStep::Continue(pause) => {
                        if !pause.is_zero() {
                            flag.sleep(pause);
                        }
                    }
                    ScriptStep::Done => {
                        if flag.stop_if_generation(generation) {
                            let hook = finish_hook
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .clone();
                            if let Some(hook) = hook {
                                hook();
                            }
                        }
                        break;
                    }
                }
            }
        });
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        *worker = Some(handle);
    }
}

impl Workload for ScriptWorkload {
    fn state(&self) -> WorkloadState {
        self.flag.get()
    }

    fn set_state(&self, state: WorkloadState) {
        let (previous, generation) = self.flag.replace(state);
        if previous == WorkloadState::Stopped && state == WorkloadState::Running {
            self.spawn_run(generation);
        }
    }

    fn set_finish_hook(&self, hook: Option<FinishHook>) {
        *self
            .finish_hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = hook;
    }
}

impl std::fmt::Debug for ScriptWorkload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptWorkload")
            .field("name", &self.name)
            .field("state", &self.flag.get())
            .finish()
    }
}
