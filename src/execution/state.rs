use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl WorkloadState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Paused => "paused",
        }
    }
}

impl std::fmt::Display for WorkloadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Start,
    Pause,
    Resume,
    Stop,
}

impl ControlCommand {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "start" | "run" => Ok(Self::Start),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "stop" => Ok(Self::Stop),
            _ => Err("command must be one of: start, pause, resume, stop".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Apply(WorkloadState),
    OpenSelection,
    Ignore,
}

/// Decides what `command` does given the current state and whether a workload is attached.
pub fn transition(current: WorkloadState, command: ControlCommand, attached: bool) -> Transition {
    use ControlCommand as C;
    use WorkloadState as S;

    if !attached {
        return match command {
            C::Start => Transition::OpenSelection,
            C::Pause | C::Resume | C::Stop => Transition::Ignore,
        };
    }
    match (current, command) {
        (S::Stopped, C::Start) | (S::Paused, C::Start) | (S::Paused, C::Resume) => {
            Transition::Apply(S::Running)
        }
        (S::Running, C::Pause) => Transition::Apply(S::Paused),
        (S::Running, C::Stop) | (S::Paused, C::Stop) => Transition::Apply(S::Stopped),
        _ => Transition::Ignore,
    }
}

/// Which commands a status display should offer in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandAvailability {
    pub run: bool,
    pub pause: bool,
    pub stop: bool,
}

impl CommandAvailability {
    pub fn for_state(state: WorkloadState) -> Self {
        match state {
            WorkloadState::Stopped => Self {
                run: true,
                pause: false,
                stop: false,
            },
            WorkloadState::Running => Self {
                run: false,
                pause: true,
                stop: true,
            },
            WorkloadState::Paused => Self {
                run: true,
                pause: false,
                stop: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_controller_only_opens_selection_on_start() {
        for state in [WorkloadState::Stopped, WorkloadState::Running] {
            assert_eq!(
                transition(state, ControlCommand::Start, false),
                Transition::OpenSelection
            );
            assert_eq!(
                transition(state, ControlCommand::Pause, false),
                Transition::Ignore
            );
            assert_eq!(
                transition(state, ControlCommand::Stop, false),
                Transition::Ignore
            );
        }
    }

    #[test]
    fn attached_transitions_follow_run_pause_stop_cycle() {
        use ControlCommand as C;
        use WorkloadState as S;
        let cases = [
            (S::Stopped, C::Start, Transition::Apply(S::Running)),
            (S::Stopped, C::Pause, Transition::Ignore),
            (S::Stopped, C::Resume, Transition::Ignore),
            (S::Stopped, C::Stop, Transition::Ignore),
            (S::Running, C::Start, Transition::Ignore),
            (S::Running, C::Pause, Transition::Apply(S::Paused)),
            (S::Running, C::Resume, Transition::Ignore),
            (S::Running, C::Stop, Transition::Apply(S::Stopped)),
            (S::Paused, C::Start, Transition::Apply(S::Running)),
            (S::Paused, C::Resume, Transition::Apply(S::Running)),
            (S::Paused, C::Pause, Transition::Ignore),
            (S::Paused, C::Stop, Transition::Apply(S::Stopped)),
        ];
        for (state, command, expected) in cases {
            assert_eq!(
                transition(state, command, true),
                expected,
                "{state:?} + {command:?}"
            );
        }
    }

    #[test]
    fn availability_mirrors_menu_enablement() {
        let stopped = CommandAvailability::for_state(WorkloadState::Stopped);
        assert!(stopped.run && !stopped.pause && !stopped.stop);
        let running = CommandAvailability::for_state(WorkloadState::Running);
        assert!(!running.run && running.pause && running.stop);
        let paused = CommandAvailability::for_state(WorkloadState::Paused);
        assert!(paused.run && !paused.pause && paused.stop);
    }

    #[test]
    fn command_parse_accepts_run_alias() {
        assert_eq!(ControlCommand::parse("Run").expect("parse"), ControlCommand::Start);
        assert!(ControlCommand::parse("restart").is_err());
    }
}
