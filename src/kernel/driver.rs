use tracing::info;

use super::*;

use crate::config::SimulationConfig;
use crate::io::Program;

/// Sets up a simulation run from a loaded program and reports on it.
pub struct Driver {
    config: SimulationConfig,
    sts: ShortTermScheduler,
}

impl Driver {
    pub fn new(config: SimulationConfig) -> Driver {
        let sts = ShortTermScheduler::new(&config);
        Driver { config, sts }
    }

    pub fn start(&self, program: Program) -> RunReport {
        info!(
            processes = program.processes.len(),
            resources = program.resources.len(),
            algorithm = ?self.config.algorithm,
            "starting the driver"
        );

        let mut sim = Simulation::new(program, TracingSink);
        let report = self.sts.run(&mut sim);

        info!(
            terminated = report.terminated.len(),
            waiting = report.waiting.len(),
            deadlocks_resolved = report.deadlocks_resolved,
            "run finished"
        );

        self.print_report(&sim, &report);
        report
    }

    fn print_report(&self, sim: &Simulation, report: &RunReport) {
        print!("Completion order (");
        match self.config.algorithm {
            SchedulingAlgorithm::Priority => println!("Priority Scheduling):"),
            SchedulingAlgorithm::RoundRobin => {
                println!("Round Robin Scheduling, quantum {}):", self.config.time_quantum)
            }
        }
        println!("... #  | Process          | Priority");
        println!("...----|------------------|---------");
        for (order, name) in report.terminated.iter().enumerate() {
            let priority = sim
                .processes()
                .lookup_by_name(name)
                .map(ProcessControlBlock::get_priority)
                .unwrap_or_default();
            println!("... {:02} | {:<16} | {:02}", order + 1, name, priority);
        }

        if !report.waiting.is_empty() {
            println!("Still waiting: {}", report.waiting.join(" "));
        }
        println!(
            "Instructions executed: {}, deadlocks resolved: {}",
            report.instructions_executed, report.deadlocks_resolved
        );
    }
}
