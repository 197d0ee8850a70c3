pub mod loader;
pub mod program;

pub use program::{Instruction, ProcessInfo, Program, ResourceInfo};
