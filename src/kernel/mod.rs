mod deadlock;
mod events;
mod interpreter;
mod process_control_block;
mod queues;
mod resource_registry;
mod short_term_scheduler;
mod simulation;

pub use deadlock::{Deadlock, DeadlockDetector, VictimPolicy, WaitForGraph};
pub use events::{EventSink, SchedulerEvent, TracingSink};
pub use interpreter::StepOutcome;
pub use process_control_block::{ProcessControlBlock, ProcessId, ProcessState, ProcessTable};
pub use queues::{QueueKind, Queues};
pub use resource_registry::{Released, Resource, ResourceRegistry};
pub use short_term_scheduler::{RunReport, SchedulingAlgorithm, ShortTermScheduler};
pub use simulation::Simulation;

pub mod driver;

pub use driver::Driver;
