use super::{EventSink, ProcessId, ProcessState, SchedulerEvent, Simulation};

use crate::error::ResourceError;
use crate::io::Instruction;

/// What happened to the process after one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Still runnable and has instructions left.
    Continue,
    /// Moved to the Waiting queue; the cursor did not advance.
    Blocked,
    /// No instructions left. The caller moves it to Terminated.
    Finished,
}

impl<S: EventSink> Simulation<S> {
    /// Executes the next instruction of `id`, which must be the running process.
    pub fn execute_instruction(&mut self, id: ProcessId) -> StepOutcome {
        let Some(instruction) = self.processes[id].next_instruction().cloned() else {
            return StepOutcome::Finished;
        };

        let outcome = match instruction {
            Instruction::Request(resource) => self.process_request(id, resource),
            Instruction::Release(resource) => self.process_release(id, &resource),
            Instruction::Unknown(text) => {
                let pcb = &mut self.processes[id];
                pcb.advance();
                self.events.emit(SchedulerEvent::UnknownInstruction {
                    process: pcb.get_name().to_string(),
                    instruction: text,
                });
                StepOutcome::Continue
            }
        };

        match outcome {
            StepOutcome::Continue if self.processes[id].is_finished() => StepOutcome::Finished,
            outcome => outcome,
        }
    }

    fn process_request(&mut self, id: ProcessId, resource: String) -> StepOutcome {
        let pcb = &mut self.processes[id];
        let process = pcb.get_name().to_string();

        match self.registry.acquire(pcb, &resource) {
            Ok(true) => {
                pcb.advance();
                pcb.state = ProcessState::Running;
                self.events.emit(SchedulerEvent::ResourceAcquired {
                    process,
                    resource,
                    available: self.registry.available_names(),
                });
                StepOutcome::Continue
            }
            Ok(false) => {
                pcb.wait_resource = Some(resource.clone());
                self.events
                    .emit(SchedulerEvent::ResourceWaiting { process, resource });
                self.queues
                    .to_waiting(&mut self.processes, id, &mut self.events);
                StepOutcome::Blocked
            }
            Err(_) => {
                pcb.advance();
                self.events
                    .emit(SchedulerEvent::UnknownResource { process, resource });
                StepOutcome::Continue
            }
        }
    }

    fn process_release(&mut self, id: ProcessId, resource: &str) -> StepOutcome {
        let result = self.release_resource(id, resource);

        let pcb = &mut self.processes[id];
        pcb.advance();

        match result {
            Ok(_) => {}
            Err(ResourceError::NotHeld { process, resource }) => {
                self.events
                    .emit(SchedulerEvent::ReleaseError { process, resource });
            }
            Err(ResourceError::NotFound { resource }) => {
                self.events.emit(SchedulerEvent::UnknownResource {
                    process: pcb.get_name().to_string(),
                    resource,
                });
            }
        }

        StepOutcome::Continue
    }
}
