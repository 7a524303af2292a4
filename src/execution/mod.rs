pub mod controller;
pub mod state;
pub mod workload;

pub use controller::{
    spawn_command_loop, ExecutionController, LoggingObserver, SelectionFlow, WorkloadObserver,
};
pub use state::{transition, CommandAvailability, ControlCommand, Transition, WorkloadState};
pub use workload::{FinishHook, RunFlag, ScriptBody, ScriptStep, ScriptWorkload, Workload};
