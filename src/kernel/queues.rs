use std::collections::VecDeque;

use super::{EventSink, ProcessId, ProcessState, ProcessTable, SchedulerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    Ready,
    Waiting,
    Terminated,
}

/// The three disjoint process queues. Insertion order is scheduling order.
#[derive(Debug, Default)]
pub struct Queues {
    ready: VecDeque<ProcessId>,
    waiting: VecDeque<ProcessId>,
    terminated: VecDeque<ProcessId>,
}

impl Queues {
    pub fn new() -> Queues {
        Queues::default()
    }

    pub fn get(&self, kind: QueueKind) -> &VecDeque<ProcessId> {
        match kind {
            QueueKind::Ready => &self.ready,
            QueueKind::Waiting => &self.waiting,
            QueueKind::Terminated => &self.terminated,
        }
    }

    fn get_mut(&mut self, kind: QueueKind) -> &mut VecDeque<ProcessId> {
        match kind {
            QueueKind::Ready => &mut self.ready,
            QueueKind::Waiting => &mut self.waiting,
            QueueKind::Terminated => &mut self.terminated,
        }
    }

    /// Appends to the tail of `kind`.
    pub fn enqueue(&mut self, kind: QueueKind, id: ProcessId) {
        debug_assert!(
            self.location(id).is_none(),
            "process {id:?} enqueued while still in {:?}",
            self.location(id)
        );
        self.get_mut(kind).push_back(id);
    }

    /// Removes `id` from `kind`. Returns false if it was not there.
    pub fn dequeue_by_identity(&mut self, kind: QueueKind, id: ProcessId) -> bool {
        let queue = self.get_mut(kind);
        match queue.iter().position(|&queued| queued == id) {
            Some(pos) => {
                queue.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn pop_ready(&mut self) -> Option<ProcessId> {
        self.ready.pop_front()
    }

    /// Queue currently holding `id`, or `None` while it runs.
    pub fn location(&self, id: ProcessId) -> Option<QueueKind> {
        [QueueKind::Ready, QueueKind::Waiting, QueueKind::Terminated]
            .into_iter()
            .find(|&kind| self.get(kind).contains(&id))
    }

    pub fn to_ready(&mut self, table: &mut ProcessTable, id: ProcessId, sink: &mut impl EventSink) {
        self.transition(table, id, QueueKind::Ready, sink);
    }

    pub fn to_waiting(&mut self, table: &mut ProcessTable, id: ProcessId, sink: &mut impl EventSink) {
        self.transition(table, id, QueueKind::Waiting, sink);
    }

    pub fn to_terminated(
        &mut self,
        table: &mut ProcessTable,
        id: ProcessId,
        sink: &mut impl EventSink,
    ) {
        self.transition(table, id, QueueKind::Terminated, sink);
    }

    fn transition(
        &mut self,
        table: &mut ProcessTable,
        id: ProcessId,
        to: QueueKind,
        sink: &mut impl EventSink,
    ) {
        let from = self.location(id);
        debug_assert_ne!(
            from,
            Some(QueueKind::Terminated),
            "terminated process {id:?} moved to {to:?}"
        );

        match from {
            // Terminated is absorbing.
            Some(QueueKind::Terminated) => return,
            Some(from) => {
                self.dequeue_by_identity(from, id);
            }
            None => {}
        }

        let pcb = &mut table[id];
        pcb.state = match to {
            QueueKind::Ready => ProcessState::Ready,
            QueueKind::Waiting => ProcessState::Waiting,
            QueueKind::Terminated => ProcessState::Terminated,
        };
        self.enqueue(to, id);

        let process = pcb.get_name().to_string();
        let event = match to {
            QueueKind::Ready => SchedulerEvent::ProcessReady {
                process,
                ready: table.names(self.ready.iter().copied()),
            },
            QueueKind::Waiting => SchedulerEvent::ProcessWaiting {
                process,
                waiting: table.names(self.waiting.iter().copied()),
            },
            QueueKind::Terminated => SchedulerEvent::ProcessTerminated { process },
        };
        sink.emit(event);
    }
}
