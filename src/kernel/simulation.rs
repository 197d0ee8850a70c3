use super::{
    EventSink, ProcessId, ProcessTable, QueueKind, Queues, Released, ResourceRegistry,
    SchedulerEvent, TracingSink,
};

use crate::error::ResourceError;
use crate::io::Program;

/// All mutable state of one simulation run.
///
/// Every process starts in the Ready queue in load order. The context is
/// consumed by a single run; build a fresh one for the next.
pub struct Simulation<S: EventSink = TracingSink> {
    pub(crate) registry: ResourceRegistry,
    pub(crate) processes: ProcessTable,
    pub(crate) queues: Queues,
    pub(crate) events: S,
}

impl<S: EventSink> Simulation<S> {
    pub fn new(program: Program, events: S) -> Simulation<S> {
        let registry = ResourceRegistry::new(program.resources);
        let processes = ProcessTable::new(program.processes);

        let mut queues = Queues::new();
        for id in processes.ids() {
            queues.enqueue(QueueKind::Ready, id);
        }

        Simulation {
            registry,
            processes,
            queues,
            events,
        }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn processes(&self) -> &ProcessTable {
        &self.processes
    }

    pub fn queues(&self) -> &Queues {
        &self.queues
    }

    pub fn events(&self) -> &S {
        &self.events
    }

    pub fn queue_names(&self, kind: QueueKind) -> Vec<String> {
        self.processes.names(self.queues.get(kind).iter().copied())
    }

    /// Releases `resource` held by `id`, then moves every process blocked on
    /// it back to Ready.
    pub fn release_resource(
        &mut self,
        id: ProcessId,
        resource: &str,
    ) -> Result<Released, ResourceError> {
        let pcb = &mut self.processes[id];
        let released = self.registry.release(pcb, resource)?;

        self.events.emit(SchedulerEvent::ResourceReleased {
            process: pcb.get_name().to_string(),
            resource: resource.to_string(),
            available: self.registry.available_names(),
        });

        self.wake_waiters(resource);

        Ok(released)
    }

    fn wake_waiters(&mut self, resource: &str) {
        let woken: Vec<ProcessId> = self
            .queues
            .get(QueueKind::Waiting)
            .iter()
            .copied()
            .filter(|&id| self.processes[id].wait_resource.as_deref() == Some(resource))
            .collect();

        for id in woken {
            self.processes[id].wait_resource = None;
            self.queues.to_ready(&mut self.processes, id, &mut self.events);
        }
    }

    /// Checks queue partitioning and resource ownership. `running` is the
    /// process currently off-queue, if any.
    #[cfg(test)]
    pub fn check_invariants(&self, running: Option<ProcessId>) -> Result<(), String> {
        for id in self.processes.ids() {
            let memberships = [QueueKind::Ready, QueueKind::Waiting, QueueKind::Terminated]
                .into_iter()
                .map(|kind| self.queues.get(kind).iter().filter(|&&q| q == id).count())
                .sum::<usize>();
            let expected = usize::from(Some(id) != running);
            if memberships != expected {
                return Err(format!("{id:?} is in {memberships} queues"));
            }
        }

        for resource in self.registry.iter() {
            let holders: Vec<ProcessId> = self
                .processes
                .iter()
                .filter(|pcb| pcb.holds(&resource.name))
                .map(|pcb| pcb.get_id())
                .collect();

            match resource.holder {
                Some(holder) if holders != [holder] => {
                    return Err(format!("{} held by {holders:?}, registry says {holder:?}", resource.name))
                }
                Some(_) if resource.available => {
                    return Err(format!("{} is held but marked available", resource.name))
                }
                None if !holders.is_empty() => {
                    return Err(format!("{} has untracked holders {holders:?}", resource.name))
                }
                _ => {}
            }
        }

        Ok(())
    }
}
