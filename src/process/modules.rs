//! Module lookup for a process handle

use crate::core::types::{BridgeResult, ModuleId, ModuleRecord, RemoteAddress};
use crate::transport::{Transport, TransportResult};
use tracing::debug;

/// Enumerates modules known to the target and filters them by base address
pub struct ModuleEnumerator<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
}

impl<'a, T: Transport + ?Sized> ModuleEnumerator<'a, T> {
    /// Create a new module enumerator
    pub fn new(transport: &'a mut T) -> Self {
        ModuleEnumerator { transport }
    }

    /// Every module the target reports
    pub fn enumerate(&mut self) -> BridgeResult<Vec<ModuleRecord>> {
        let ids = self.transport.list_modules()?;
        let mut modules = Vec::with_capacity(ids.len());
        for id in ids {
            modules.push(self.get_module_info(id)?);
        }
        Ok(modules)
    }

    /// Deliver modules whose base equals `process` to `callback`.
    ///
    /// Returns the number of matches.
    pub fn for_process<F>(&mut self, process: RemoteAddress, mut callback: F) -> BridgeResult<usize>
    where
        F: FnMut(ModuleRecord),
    {
        let mut matches = 0;
        for id in self.transport.list_modules()? {
            if self.transport.module_base(id)? != process {
                continue;
            }
            let module = self.get_module_info(id)?;
            debug!(base = %module.base_address, name = %module.name, size = module.size, "module");
            callback(module);
            matches += 1;
        }
        Ok(matches)
    }

    fn get_module_info(&mut self, id: ModuleId) -> TransportResult<ModuleRecord> {
        Ok(ModuleRecord {
            base_address: self.transport.module_base(id)?,
            name: self.transport.module_name(id)?,
            size: self.transport.module_size(id)?,
        })
    }
}
