use std::fmt;

/// A single step of a process program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Request(String),
    Release(String),
    /// Mnemonic the interpreter does not understand. Executes as a no-op.
    Unknown(String),
}

impl Instruction {
    pub fn resource(&self) -> Option<&str> {
        match self {
            Instruction::Request(name) | Instruction::Release(name) => Some(name),
            Instruction::Unknown(_) => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Request(name) => write!(f, "req {name}"),
            Instruction::Release(name) => write!(f, "rel {name}"),
            Instruction::Unknown(mnemonic) => write!(f, "{mnemonic}"),
        }
    }
}

/// A process as read from the program file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub name: String,
    pub priority: u32,
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    pub name: String,
    pub available: bool,
}

/// Everything a simulation run starts from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub processes: Vec<ProcessInfo>,
    pub resources: Vec<ResourceInfo>,
}
