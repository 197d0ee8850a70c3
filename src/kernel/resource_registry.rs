use std::collections::HashMap;

use super::{ProcessControlBlock, ProcessId};

use crate::error::ResourceError;
use crate::io::ResourceInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub available: bool,
    /// Process currently holding this resource. `None` for a free resource
    /// and for one reserved at load time.
    pub holder: Option<ProcessId>,
}

/// Successful release of `resource`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Released {
    pub resource: String,
}

/// Fixed set of named exclusive resources. Shape never changes after load.
pub struct ResourceRegistry {
    resources: Vec<Resource>,
    index: HashMap<String, usize>,
}

impl ResourceRegistry {
    pub fn new(resources: Vec<ResourceInfo>) -> ResourceRegistry {
        let mut index = HashMap::new();
        let resources = resources
            .into_iter()
            .enumerate()
            .map(|(idx, info)| {
                index.insert(info.name.clone(), idx);
                Resource {
                    name: info.name,
                    available: info.available,
                    holder: None,
                }
            })
            .collect();

        ResourceRegistry { resources, index }
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<&Resource> {
        self.index.get(name).map(|&idx| &self.resources[idx])
    }

    /// Grants `name` to `pcb` if it is free. `Ok(false)` leaves every piece of
    /// state untouched; the caller decides the queue transition.
    pub fn acquire(
        &mut self,
        pcb: &mut ProcessControlBlock,
        name: &str,
    ) -> Result<bool, ResourceError> {
        let resource = self.get_mut(name)?;
        if !resource.available {
            return Ok(false);
        }

        resource.available = false;
        resource.holder = Some(pcb.get_id());
        pcb.add_held(name);

        Ok(true)
    }

    /// Takes `name` back from `pcb`. Waking processes blocked on it is left to
    /// the caller, which owns the queues.
    pub fn release(
        &mut self,
        pcb: &mut ProcessControlBlock,
        name: &str,
    ) -> Result<Released, ResourceError> {
        let resource = self.get_mut(name)?;
        if !pcb.holds(name) {
            return Err(ResourceError::NotHeld {
                process: pcb.get_name().to_string(),
                resource: name.to_string(),
            });
        }

        pcb.remove_held(name);
        resource.available = true;
        resource.holder = None;

        Ok(Released {
            resource: name.to_string(),
        })
    }

    pub fn holder_of(&self, name: &str) -> Option<ProcessId> {
        self.lookup_by_name(name).and_then(|resource| resource.holder)
    }

    pub fn available_names(&self) -> Vec<String> {
        self.resources
            .iter()
            .filter(|resource| resource.available)
            .map(|resource| resource.name.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Resource, ResourceError> {
        match self.index.get(name) {
            Some(&idx) => Ok(&mut self.resources[idx]),
            None => Err(ResourceError::NotFound {
                resource: name.to_string(),
            }),
        }
    }
}
