use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use super::{EventSink, ProcessId, QueueKind, SchedulerEvent, Simulation};

/// Which cycle member gets restarted to break a deadlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VictimPolicy {
    /// Numerically smallest priority value. Under static priority the restarted
    /// victim is also the next one scheduled, so the same deadlock can recur.
    SmallestPriorityValue,
    /// Numerically largest priority value, i.e. the process the
    /// static-priority policy would schedule last. Every member it unblocks
    /// runs ahead of it.
    #[default]
    LargestPriorityValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deadlock {
    /// Cycle members in wait-for order, starting with the member that entered
    /// the Waiting queue first.
    pub cycle: Vec<ProcessId>,
    pub victim: ProcessId,
}

/// Edges from each blocked process to the holder of the resource it awaits.
///
/// Resources are single-unit, so every process has at most one out-edge.
#[derive(Debug, Default)]
pub struct WaitForGraph {
    order: Vec<ProcessId>,
    edges: HashMap<ProcessId, ProcessId>,
}

impl WaitForGraph {
    pub fn build<S: EventSink>(sim: &Simulation<S>) -> WaitForGraph {
        let mut graph = WaitForGraph::default();

        for &id in sim.queues.get(QueueKind::Waiting) {
            graph.order.push(id);

            let holder = sim.processes[id]
                .wait_resource
                .as_deref()
                .and_then(|resource| sim.registry.holder_of(resource));
            if let Some(holder) = holder {
                graph.edges.insert(id, holder);
            }
        }

        graph
    }

    pub fn holder_awaited_by(&self, id: ProcessId) -> Option<ProcessId> {
        self.edges.get(&id).copied()
    }

    /// First cycle reachable from the Waiting queue, walked in queue order.
    pub fn find_cycle(&self) -> Option<Vec<ProcessId>> {
        let mut explored = HashSet::new();

        for &start in &self.order {
            let mut path = Vec::new();
            let mut on_path = HashMap::new();
            let mut current = start;

            loop {
                if explored.contains(&current) {
                    break;
                }
                if let Some(&pos) = on_path.get(&current) {
                    return Some(self.rotate_to_earliest(path.split_off(pos)));
                }

                on_path.insert(current, path.len());
                path.push(current);

                match self.edges.get(&current) {
                    Some(&next) => current = next,
                    None => break,
                }
            }

            explored.extend(path);
        }

        None
    }

    fn rotate_to_earliest(&self, mut cycle: Vec<ProcessId>) -> Vec<ProcessId> {
        let rank = |id: &ProcessId| {
            self.order
                .iter()
                .position(|queued| queued == id)
                .unwrap_or(usize::MAX)
        };
        if let Some(first) = (0..cycle.len()).min_by_key(|&i| rank(&cycle[i])) {
            cycle.rotate_left(first);
        }
        cycle
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeadlockDetector {
    victim_policy: VictimPolicy,
}

impl DeadlockDetector {
    pub fn new(victim_policy: VictimPolicy) -> DeadlockDetector {
        DeadlockDetector { victim_policy }
    }

    /// Looks for a circular wait and picks the process to sacrifice.
    pub fn detect<S: EventSink>(&self, sim: &Simulation<S>) -> Option<Deadlock> {
        let cycle = WaitForGraph::build(sim).find_cycle()?;

        let priority = |id: &&ProcessId| sim.processes[**id].get_priority();
        let victim = match self.victim_policy {
            VictimPolicy::SmallestPriorityValue => cycle.iter().min_by_key(priority),
            VictimPolicy::LargestPriorityValue => {
                cycle.iter().min_by_key(|id| Reverse(priority(id)))
            }
        };

        victim.copied().map(|victim| Deadlock { cycle, victim })
    }

    /// Forces `victim` to give up everything it holds and restart from its
    /// first instruction. Processes waiting on the freed resources become
    /// Ready ahead of the victim.
    pub fn resolve<S: EventSink>(&self, sim: &mut Simulation<S>, victim: ProcessId) {
        let held: Vec<String> = sim.processes[victim]
            .held_resources()
            .map(str::to_string)
            .collect();

        for resource in held {
            let result = sim.release_resource(victim, &resource);
            debug_assert!(result.is_ok(), "victim failed to release {resource}: {result:?}");
        }

        sim.processes[victim].restart();
        sim.queues.to_ready(&mut sim.processes, victim, &mut sim.events);
    }

    /// Detects, reports and resolves a deadlock if there is one.
    pub fn detect_and_resolve<S: EventSink>(&self, sim: &mut Simulation<S>) -> Option<Deadlock> {
        let deadlock = self.detect(sim)?;

        sim.events.emit(SchedulerEvent::DeadlockDetected {
            cycle: sim.processes.names(deadlock.cycle.iter().copied()),
            victim: sim.processes[deadlock.victim].get_name().to_string(),
        });
        self.resolve(sim, deadlock.victim);

        Some(deadlock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::io::{Instruction, ProcessInfo, Program, ResourceInfo};

    fn req(name: &str) -> Instruction {
        Instruction::Request(name.to_string())
    }

    fn rel(name: &str) -> Instruction {
        Instruction::Release(name.to_string())
    }

    fn simulation(processes: Vec<(u32, Vec<Instruction>)>) -> Simulation<Vec<SchedulerEvent>> {
        let program = Program {
            processes: processes
                .into_iter()
                .enumerate()
                .map(|(i, (priority, instructions))| ProcessInfo {
                    name: format!("P{}", i + 1),
                    priority,
                    instructions,
                })
                .collect(),
            resources: ["A", "B", "C"]
                .iter()
                .map(|name| ResourceInfo { name: name.to_string(), available: true })
                .collect(),
        };
        Simulation::new(program, Vec::new())
    }

    /// Runs one instruction of `id` as if the scheduler had dispatched it,
    /// putting it back on Ready unless it blocked.
    fn step(sim: &mut Simulation<Vec<SchedulerEvent>>, id: ProcessId) {
        sim.queues.dequeue_by_identity(QueueKind::Ready, id);
        if sim.execute_instruction(id) != crate::kernel::StepOutcome::Blocked {
            sim.queues.to_ready(&mut sim.processes, id, &mut sim.events);
        }
    }

    /// P1 holds A and wants B; P2 holds B and wants A.
    fn two_way_deadlock(p1_priority: u32, p2_priority: u32) -> Simulation<Vec<SchedulerEvent>> {
        let mut sim = simulation(vec![
            (p1_priority, vec![req("A"), req("B"), rel("B"), rel("A")]),
            (p2_priority, vec![req("B"), req("A"), rel("A"), rel("B")]),
        ]);
        let (p1, p2) = (ProcessId(0), ProcessId(1));
        step(&mut sim, p1);
        step(&mut sim, p2);
        step(&mut sim, p1);
        step(&mut sim, p2);
        sim
    }

    #[test]
    fn test_wait_for_graph_edges() {
        let sim = two_way_deadlock(1, 2);
        let graph = WaitForGraph::build(&sim);

        assert_eq!(graph.holder_awaited_by(ProcessId(0)), Some(ProcessId(1)));
        assert_eq!(graph.holder_awaited_by(ProcessId(1)), Some(ProcessId(0)));
        assert_eq!(graph.find_cycle(), Some(vec![ProcessId(0), ProcessId(1)]));
    }

    #[test]
    fn test_no_cycle_when_holder_is_not_waiting() {
        let mut sim = simulation(vec![(1, vec![req("A")]), (1, vec![req("A")])]);
        step(&mut sim, ProcessId(0));
        step(&mut sim, ProcessId(1));

        assert_eq!(sim.queue_names(QueueKind::Waiting), vec!["P2"]);
        assert_eq!(WaitForGraph::build(&sim).find_cycle(), None);
        assert_eq!(DeadlockDetector::default().detect(&sim), None);
    }

    #[test]
    fn test_three_way_cycle_behind_a_chain() {
        // P4 waits on the cycle without being part of it.
        let mut sim = simulation(vec![
            (5, vec![req("A"), req("B")]),
            (4, vec![req("B"), req("C")]),
            (3, vec![req("C"), req("A")]),
            (1, vec![req("A")]),
        ]);
        let ids: Vec<ProcessId> = (0..4).map(ProcessId).collect();
        for &id in &ids[..3] {
            step(&mut sim, id);
        }
        step(&mut sim, ids[3]);
        for &id in &ids[..3] {
            step(&mut sim, id);
        }

        assert_eq!(sim.queue_names(QueueKind::Waiting), vec!["P4", "P1", "P2", "P3"]);
        let deadlock = DeadlockDetector::default().detect(&sim).unwrap();
        assert_eq!(deadlock.cycle, vec![ProcessId(0), ProcessId(1), ProcessId(2)]);
        assert_eq!(deadlock.victim, ProcessId(0));
    }

    #[test]
    fn test_victim_policy() {
        let sim = two_way_deadlock(3, 7);

        let smallest = DeadlockDetector::new(VictimPolicy::SmallestPriorityValue);
        assert_eq!(smallest.detect(&sim).map(|d| d.victim), Some(ProcessId(0)));

        let largest = DeadlockDetector::new(VictimPolicy::LargestPriorityValue);
        assert_eq!(largest.detect(&sim).map(|d| d.victim), Some(ProcessId(1)));
    }

    #[test]
    fn test_victim_tie_goes_to_earliest_waiter() {
        let sim = two_way_deadlock(2, 2);

        for policy in [VictimPolicy::SmallestPriorityValue, VictimPolicy::LargestPriorityValue] {
            let deadlock = DeadlockDetector::new(policy).detect(&sim).unwrap();
            assert_eq!(deadlock.victim, ProcessId(0));
        }
    }

    #[test]
    fn test_resolve_releases_and_restarts_victim() {
        let mut sim = two_way_deadlock(2, 1);
        let (p1, p2) = (ProcessId(0), ProcessId(1));
        sim.events.clear();

        let deadlock = DeadlockDetector::default().detect_and_resolve(&mut sim).unwrap();
        assert_eq!(deadlock.victim, p1);

        let victim = &sim.processes[p1];
        assert_eq!(victim.program_counter, 0);
        assert_eq!(victim.wait_resource, None);
        assert_eq!(victim.held_resources().count(), 0);
        assert_eq!(sim.queue_names(QueueKind::Ready), vec!["P2", "P1"]);
        assert!(sim.queues.get(QueueKind::Waiting).is_empty());
        sim.check_invariants(None).unwrap();

        assert_eq!(
            sim.events[0],
            SchedulerEvent::DeadlockDetected {
                cycle: vec!["P1".into(), "P2".into()],
                victim: "P1".into(),
            }
        );

        // P2's blocked request now succeeds.
        sim.queues.dequeue_by_identity(QueueKind::Ready, p2);
        assert_eq!(sim.execute_instruction(p2), crate::kernel::StepOutcome::Continue);
        assert!(sim.processes[p2].holds("A"));
    }

    #[test]
    fn test_self_wait_is_a_cycle() {
        let mut sim = simulation(vec![(1, vec![req("A"), req("A")])]);
        step(&mut sim, ProcessId(0));
        step(&mut sim, ProcessId(0));

        let deadlock = DeadlockDetector::default().detect(&sim).unwrap();
        assert_eq!(deadlock.cycle, vec![ProcessId(0)]);
    }
}
