use std::fmt;

use tracing::{info, warn};

/// Everything the scheduling core reports while a run is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    ResourceAcquired {
        process: String,
        resource: String,
        available: Vec<String>,
    },
    ResourceWaiting {
        process: String,
        resource: String,
    },
    ResourceReleased {
        process: String,
        resource: String,
        available: Vec<String>,
    },
    ReleaseError {
        process: String,
        resource: String,
    },
    UnknownResource {
        process: String,
        resource: String,
    },
    UnknownInstruction {
        process: String,
        instruction: String,
    },
    ProcessReady {
        process: String,
        ready: Vec<String>,
    },
    ProcessWaiting {
        process: String,
        waiting: Vec<String>,
    },
    ProcessTerminated {
        process: String,
    },
    DeadlockDetected {
        cycle: Vec<String>,
        victim: String,
    },
    /// Every remaining process is blocked and no cycle explains it.
    Stalled {
        waiting: Vec<String>,
    },
}

impl fmt::Display for SchedulerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerEvent::ResourceAcquired { process, resource, available } => {
                write!(f, "{process} req {resource}: acquired; Available: {}", available.join(" "))
            }
            SchedulerEvent::ResourceWaiting { process, resource } => {
                write!(f, "{process} req {resource}: waiting")
            }
            SchedulerEvent::ResourceReleased { process, resource, available } => {
                write!(f, "{process} rel {resource}: released; Available: {}", available.join(" "))
            }
            SchedulerEvent::ReleaseError { process, resource } => {
                write!(f, "{process} rel {resource}: Error: Nothing to release")
            }
            SchedulerEvent::UnknownResource { process, resource } => {
                write!(f, "{process} {resource}: Error: no such resource")
            }
            SchedulerEvent::UnknownInstruction { process, instruction } => {
                write!(f, "{process} {instruction}: skipped unknown instruction")
            }
            SchedulerEvent::ProcessReady { process, ready } => {
                write!(f, "{process} ready; Ready: {}", ready.join(" "))
            }
            SchedulerEvent::ProcessWaiting { process, waiting } => {
                write!(f, "{process} waiting; Waiting: {}", waiting.join(" "))
            }
            SchedulerEvent::ProcessTerminated { process } => write!(f, "{process} terminated"),
            SchedulerEvent::DeadlockDetected { cycle, victim } => {
                write!(f, "deadlock detected: {}; victim {victim}", cycle.join(" -> "))
            }
            SchedulerEvent::Stalled { waiting } => {
                write!(f, "stalled with no deadlock cycle; Waiting: {}", waiting.join(" "))
            }
        }
    }
}

/// Receives scheduling events as they happen.
pub trait EventSink {
    fn emit(&mut self, event: SchedulerEvent);
}

impl EventSink for Vec<SchedulerEvent> {
    fn emit(&mut self, event: SchedulerEvent) {
        self.push(event);
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: SchedulerEvent) {
        match &event {
            SchedulerEvent::ReleaseError { process, resource }
            | SchedulerEvent::UnknownResource { process, resource } => {
                warn!(process = %process, resource = %resource, "{event}");
            }
            SchedulerEvent::UnknownInstruction { process, .. } => {
                warn!(process = %process, "{event}");
            }
            SchedulerEvent::DeadlockDetected { victim, .. } => {
                warn!(victim = %victim, "{event}");
            }
            SchedulerEvent::Stalled { .. } => warn!("{event}"),
            SchedulerEvent::ResourceAcquired { process, resource, .. }
            | SchedulerEvent::ResourceWaiting { process, resource }
            | SchedulerEvent::ResourceReleased { process, resource, .. } => {
                info!(process = %process, resource = %resource, "{event}");
            }
            SchedulerEvent::ProcessReady { process, .. }
            | SchedulerEvent::ProcessWaiting { process, .. }
            | SchedulerEvent::ProcessTerminated { process } => {
                info!(process = %process, "{event}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display() {
        let event = SchedulerEvent::ResourceAcquired {
            process: "P1".into(),
            resource: "R1".into(),
            available: vec!["R2".into(), "R3".into()],
        };
        assert_eq!(event.to_string(), "P1 req R1: acquired; Available: R2 R3");

        let event = SchedulerEvent::ReleaseError {
            process: "P2".into(),
            resource: "X".into(),
        };
        assert_eq!(event.to_string(), "P2 rel X: Error: Nothing to release");

        let event = SchedulerEvent::DeadlockDetected {
            cycle: vec!["P1".into(), "P2".into()],
            victim: "P1".into(),
        };
        assert_eq!(event.to_string(), "deadlock detected: P1 -> P2; victim P1");
    }

    #[test]
    fn test_vec_sink_records_in_order() {
        let mut sink: Vec<SchedulerEvent> = Vec::new();
        sink.emit(SchedulerEvent::ProcessTerminated { process: "P1".into() });
        sink.emit(SchedulerEvent::ProcessTerminated { process: "P2".into() });

        assert_eq!(
            sink,
            vec![
                SchedulerEvent::ProcessTerminated { process: "P1".into() },
                SchedulerEvent::ProcessTerminated { process: "P2".into() },
            ]
        );
    }
}
