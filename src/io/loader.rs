use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::{Instruction, ProcessInfo, Program, ResourceInfo};
use crate::error::LoadError;

/// Reads the program file at `path` and parses it.
pub fn load_from_path(path: &Path) -> Result<Program, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_program_file(&text)
}

/// Parses a program file.
///
/// Resources are declared on `// RESOURCES` (initially available) and
/// `// RESERVED` (initially unavailable) cards. Each process is a
/// `// PROCESS <name> <priority>` card, one instruction per line, and a
/// closing `// END` card.
pub fn parse_program_file(text: &str) -> Result<Program, LoadError> {
    let mut program = Program::default();
    let mut resource_names = HashSet::new();
    let mut process_names = HashSet::new();
    let mut current: Option<ProcessInfo> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(card) = line.strip_prefix("//") {
            let mut fields = card.split_whitespace();
            let directive = fields.next().unwrap_or_default().to_ascii_uppercase();

            match directive.as_str() {
                "RESOURCES" | "RESERVED" => {
                    let available = directive == "RESOURCES";
                    for name in fields {
                        if !resource_names.insert(name.to_string()) {
                            return Err(LoadError::DuplicateResource {
                                line: line_num,
                                name: name.to_string(),
                            });
                        }
                        program.resources.push(ResourceInfo {
                            name: name.to_string(),
                            available,
                        });
                    }
                }
                "PROCESS" => {
                    if let Some(open) = current.take() {
                        return Err(LoadError::UnterminatedProcess { name: open.name });
                    }
                    let process = parse_process_card(line_num, &directive, &mut fields)?;
                    if !process_names.insert(process.name.clone()) {
                        return Err(LoadError::DuplicateProcess {
                            line: line_num,
                            name: process.name,
                        });
                    }
                    current = Some(process);
                }
                "END" => match current.take() {
                    Some(process) => {
                        debug!(
                            process = %process.name,
                            instructions = process.instructions.len(),
                            "loaded process"
                        );
                        program.processes.push(process);
                    }
                    None => return Err(LoadError::EndWithoutProcess { line: line_num }),
                },
                _ => {
                    return Err(LoadError::UnknownDirective {
                        line: line_num,
                        directive,
                    })
                }
            }
            continue;
        }

        let process = current
            .as_mut()
            .ok_or(LoadError::InstructionOutsideProcess { line: line_num })?;
        process.instructions.push(parse_instruction(line_num, line)?);
    }

    if let Some(open) = current {
        return Err(LoadError::UnterminatedProcess { name: open.name });
    }

    for process in &program.processes {
        for name in process.instructions.iter().filter_map(Instruction::resource) {
            if !resource_names.contains(name) {
                warn!(process = %process.name, resource = name, "instruction names an undeclared resource");
            }
        }
    }

    Ok(program)
}

/// Parses the value part of a PROCESS control card.
fn parse_process_card<'a>(
    line: usize,
    directive: &str,
    fields: &mut impl Iterator<Item = &'a str>,
) -> Result<ProcessInfo, LoadError> {
    let missing = || LoadError::MissingValue {
        line,
        directive: directive.to_string(),
    };

    let name = fields.next().ok_or_else(missing)?;
    let priority = fields.next().ok_or_else(missing)?;
    let priority = priority.parse::<u32>().map_err(|_| LoadError::InvalidValue {
        line,
        value: priority.to_string(),
    })?;

    Ok(ProcessInfo {
        name: name.to_string(),
        priority,
        instructions: Vec::new(),
    })
}

fn parse_instruction(line: usize, text: &str) -> Result<Instruction, LoadError> {
    let mut fields = text.split_whitespace();
    let mnemonic = fields.next().unwrap_or_default();

    let mut resource = || {
        fields
            .next()
            .map(str::to_string)
            .ok_or_else(|| LoadError::MissingValue {
                line,
                directive: mnemonic.to_string(),
            })
    };

    match mnemonic.to_ascii_lowercase().as_str() {
        "req" | "request" => Ok(Instruction::Request(resource()?)),
        "rel" | "release" => Ok(Instruction::Release(resource()?)),
        _ => Ok(Instruction::Unknown(text.to_string())),
    }
}
