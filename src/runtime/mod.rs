pub mod logging;
pub mod state_paths;

pub use crate::shared::errors::RuntimeError;
pub(crate) use crate::shared::time::now_secs;
pub use logging::append_runtime_log;
pub use state_paths::{
    bootstrap_state_root, default_state_root_path, StatePaths, DEFAULT_STATE_ROOT_DIR,
    STATE_ROOT_ENV,
};
