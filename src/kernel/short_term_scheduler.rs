use serde::Deserialize;
use tracing::debug;

use super::{
    DeadlockDetector, EventSink, ProcessId, ProcessState, QueueKind, SchedulerEvent, Simulation,
    StepOutcome,
};

use crate::config::SimulationConfig;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchedulingAlgorithm {
    #[default]
    Priority,
    RoundRobin,
}

impl TryFrom<u8> for SchedulingAlgorithm {
    type Error = ConfigError;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        match selector {
            0 => Ok(SchedulingAlgorithm::Priority),
            1 => Ok(SchedulingAlgorithm::RoundRobin),
            other => Err(ConfigError::InvalidAlgorithm(other)),
        }
    }
}

/// Outcome of a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Terminated processes in completion order.
    pub terminated: Vec<String>,
    /// Processes left blocked when the run stalled.
    pub waiting: Vec<String>,
    pub deadlocks_resolved: usize,
    pub instructions_executed: u64,
}

pub struct ShortTermScheduler {
    scheduling_alg: SchedulingAlgorithm,
    time_quantum: u32,
    max_deadlock_resolutions: usize,
    detector: DeadlockDetector,
}

impl ShortTermScheduler {
    pub fn new(config: &SimulationConfig) -> ShortTermScheduler {
        ShortTermScheduler {
            scheduling_alg: config.algorithm,
            time_quantum: config.time_quantum,
            max_deadlock_resolutions: config.max_deadlock_resolutions,
            detector: DeadlockDetector::new(config.victim_policy),
        }
    }

    /// Schedules until the Ready queue drains and no deadlock is left to break.
    pub fn run<S: EventSink>(&self, sim: &mut Simulation<S>) -> RunReport {
        let mut report = RunReport::default();
        while self.step(sim, &mut report) {}

        report.terminated = sim.queue_names(QueueKind::Terminated);
        report.waiting = sim.queue_names(QueueKind::Waiting);
        report
    }

    /// Makes one scheduling decision. Returns false once the run is over.
    pub fn step<S: EventSink>(&self, sim: &mut Simulation<S>, report: &mut RunReport) -> bool {
        if sim.queues.get(QueueKind::Ready).is_empty() {
            return self.recover(sim, report);
        }

        let Some(id) = self.schedule_next(sim) else {
            return false;
        };
        sim.processes[id].state = ProcessState::Running;

        let budget = match self.scheduling_alg {
            SchedulingAlgorithm::Priority => None,
            SchedulingAlgorithm::RoundRobin => Some(self.time_quantum),
        };
        self.run_turn(sim, id, budget, report);

        true
    }

    /// Removes and returns the process to run next.
    fn schedule_next<S: EventSink>(&self, sim: &mut Simulation<S>) -> Option<ProcessId> {
        match self.scheduling_alg {
            SchedulingAlgorithm::RoundRobin => sim.queues.pop_ready(),
            SchedulingAlgorithm::Priority => {
                // min_by_key keeps the first of equal keys, so ties go to queue order.
                let id = sim
                    .queues
                    .get(QueueKind::Ready)
                    .iter()
                    .copied()
                    .min_by_key(|&id| sim.processes[id].get_priority())?;
                sim.queues.dequeue_by_identity(QueueKind::Ready, id);
                Some(id)
            }
        }
    }

    /// Runs `id` until it blocks, finishes, or uses up `budget` instructions.
    fn run_turn<S: EventSink>(
        &self,
        sim: &mut Simulation<S>,
        id: ProcessId,
        budget: Option<u32>,
        report: &mut RunReport,
    ) {
        let mut executed = 0;

        loop {
            if sim.processes[id].is_finished() {
                sim.queues.to_terminated(&mut sim.processes, id, &mut sim.events);
                return;
            }
            if budget.is_some_and(|quantum| executed >= quantum) {
                sim.queues.to_ready(&mut sim.processes, id, &mut sim.events);
                return;
            }

            let outcome = sim.execute_instruction(id);
            executed += 1;
            report.instructions_executed += 1;

            match outcome {
                StepOutcome::Continue => {}
                StepOutcome::Blocked => return,
                StepOutcome::Finished => {
                    sim.queues.to_terminated(&mut sim.processes, id, &mut sim.events);
                    return;
                }
            }
        }
    }

    /// Ready is empty. Breaks a deadlock if every remaining process is stuck in one.
    fn recover<S: EventSink>(&self, sim: &mut Simulation<S>, report: &mut RunReport) -> bool {
        if sim.queues.get(QueueKind::Waiting).is_empty() {
            return false;
        }

        if report.deadlocks_resolved < self.max_deadlock_resolutions {
            if let Some(deadlock) = self.detector.detect_and_resolve(sim) {
                report.deadlocks_resolved += 1;
                debug!(
                    victim = sim.processes[deadlock.victim].get_name(),
                    cycle_len = deadlock.cycle.len(),
                    "deadlock resolved"
                );
                return true;
            }
        }

        let waiting = sim.queue_names(QueueKind::Waiting);
        sim.events.emit(SchedulerEvent::Stalled { waiting });
        false
    }
}
