use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::{Index, IndexMut};

use tracing::warn;

use crate::io::{Instruction, ProcessInfo};

/// Index of a process in the process table. Stable for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Ready,
    Running,
    Waiting,
    Terminated,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessState::Ready => "ready",
            ProcessState::Running => "running",
            ProcessState::Waiting => "waiting",
            ProcessState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

pub struct ProcessControlBlock {
    pub state: ProcessState,
    /// Index of the next instruction to execute.
    pub program_counter: usize,
    /// Resource this process is blocked on while `Waiting`.
    pub wait_resource: Option<String>,

    id: ProcessId,
    name: String,
    priority: u32,
    instructions: Vec<Instruction>,
    held: BTreeSet<String>,
}

impl ProcessControlBlock {
    pub fn new(id: ProcessId, info: ProcessInfo) -> ProcessControlBlock {
        ProcessControlBlock {
            id,
            name: info.name,
            priority: info.priority,
            instructions: info.instructions,
            held: BTreeSet::new(),
            program_counter: 0,
            wait_resource: None,
            state: ProcessState::Ready,
        }
    }

    pub fn get_id(&self) -> ProcessId {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_priority(&self) -> u32 {
        self.priority
    }

    pub fn next_instruction(&self) -> Option<&Instruction> {
        self.instructions.get(self.program_counter)
    }

    pub fn advance(&mut self) {
        self.program_counter += 1;
    }

    /// Rewinds the cursor to the first instruction.
    pub fn restart(&mut self) {
        self.program_counter = 0;
        self.wait_resource = None;
    }

    pub fn is_finished(&self) -> bool {
        self.program_counter >= self.instructions.len()
    }

    pub fn holds(&self, resource: &str) -> bool {
        self.held.contains(resource)
    }

    pub fn held_resources(&self) -> impl Iterator<Item = &str> {
        self.held.iter().map(String::as_str)
    }

    pub(crate) fn add_held(&mut self, resource: &str) {
        self.held.insert(resource.to_string());
    }

    pub(crate) fn remove_held(&mut self, resource: &str) -> bool {
        self.held.remove(resource)
    }
}

/// Owns every PCB for the lifetime of a run, with lookup by name.
#[derive(Default)]
pub struct ProcessTable {
    pcbs: Vec<ProcessControlBlock>,
    by_name: HashMap<String, ProcessId>,
}

impl ProcessTable {
    /// Builds a PCB per process in load order.
    ///
    /// Names are expected to be unique; the loader rejects duplicates. If a
    /// caller passes duplicates anyway, every one still gets its own PCB and
    /// `lookup_by_name` resolves to the first.
    pub fn new(processes: Vec<ProcessInfo>) -> ProcessTable {
        let mut table = ProcessTable::default();
        for info in processes {
            let id = ProcessId(table.pcbs.len());
            if table.by_name.contains_key(&info.name) {
                warn!(process = %info.name, "duplicate process name, lookup keeps the first");
            } else {
                table.by_name.insert(info.name.clone(), id);
            }
            table.pcbs.push(ProcessControlBlock::new(id, info));
        }
        table
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<&ProcessControlBlock> {
        self.by_name.get(name).map(|id| &self.pcbs[id.0])
    }

    pub fn ids(&self) -> impl Iterator<Item = ProcessId> {
        (0..self.pcbs.len()).map(ProcessId)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessControlBlock> {
        self.pcbs.iter()
    }

    pub fn len(&self) -> usize {
        self.pcbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pcbs.is_empty()
    }

    pub fn names(&self, ids: impl IntoIterator<Item = ProcessId>) -> Vec<String> {
        ids.into_iter()
            .map(|id| self.pcbs[id.0].name.clone())
            .collect()
    }
}

impl Index<ProcessId> for ProcessTable {
    type Output = ProcessControlBlock;

    fn index(&self, id: ProcessId) -> &ProcessControlBlock {
        &self.pcbs[id.0]
    }
}

impl IndexMut<ProcessId> for ProcessTable {
    fn index_mut(&mut self, id: ProcessId) -> &mut ProcessControlBlock {
        &mut self.pcbs[id.0]
    }
}
