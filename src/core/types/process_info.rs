//! Process and module records handed to the host

use super::RemoteAddress;
use serde::{Deserialize, Serialize};

/// One process reported by the target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub id: RemoteAddress,
    pub name: String,
    pub path: String,
}

impl ProcessRecord {
    /// Creates a new process record
    pub fn new(id: impl Into<RemoteAddress>, name: impl Into<String>, path: impl Into<String>) -> Self {
        ProcessRecord {
            id: id.into(),
            name: name.into(),
            path: path.into(),
        }
    }

    /// Case-insensitive name comparison
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// One loaded module reported by the target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub base_address: RemoteAddress,
    pub name: String,
    pub size: u32,
}

impl ModuleRecord {
    /// Creates a new module record
    pub fn new(base_address: impl Into<RemoteAddress>, name: impl Into<String>, size: u32) -> Self {
        ModuleRecord {
            base_address: base_address.into(),
            name: name.into(),
            size,
        }
    }

    /// First address past the module, saturating at the top of the space
    pub fn end_address(&self) -> RemoteAddress {
        RemoteAddress::new(self.base_address.as_u32().saturating_add(self.size))
    }

    /// Checks if an address falls inside this module
    pub fn contains_address(&self, address: RemoteAddress) -> bool {
        address >= self.base_address && address < self.end_address()
    }
}
