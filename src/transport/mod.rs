//! Debugging transport interface
//!
//! The transport is the vendor link to the target device. It is treated as
//! an opaque remote service with no concurrency guarantees, so every method
//! takes `&mut self` and callers must hold exclusive access for the whole
//! call. [`crate::accessor::SynchronizedAccessor`] provides that.

#[doc(hidden)]
pub mod mock;

pub use crate::core::types::{TransportError, TransportResult};
pub use mock::{MockProbe, MockTransport, MockTransportBuilder, ReadFault, RunState};

use crate::core::types::{ModuleId, ProcessId, RemoteAddress};

/// Primitives exposed by the debugging link
pub trait Transport: Send {
    /// Opens the link to the target
    fn connect(&mut self) -> TransportResult<()>;

    /// Closes the link to the target
    fn disconnect(&mut self) -> TransportResult<()>;

    /// Attaches to the running process on the target
    fn attach_process(&mut self) -> TransportResult<()>;

    /// Reads `size` bytes at `address`
    fn read_bytes(&mut self, address: RemoteAddress, size: usize) -> TransportResult<Vec<u8>>;

    /// Writes `data` at `address`
    fn set_memory(&mut self, address: RemoteAddress, data: &[u8]) -> TransportResult<()>;

    /// Lists the ids of all processes on the target
    fn list_process_ids(&mut self) -> TransportResult<Vec<ProcessId>>;

    fn process_name(&mut self, id: ProcessId) -> TransportResult<String>;

    fn process_path(&mut self, id: ProcessId) -> TransportResult<String>;

    /// Lists the ids of all modules known to the target
    fn list_modules(&mut self) -> TransportResult<Vec<ModuleId>>;

    fn module_base(&mut self, module: ModuleId) -> TransportResult<RemoteAddress>;

    fn module_name(&mut self, module: ModuleId) -> TransportResult<String>;

    fn module_size(&mut self, module: ModuleId) -> TransportResult<u32>;

    fn process_stop(&mut self) -> TransportResult<()>;

    fn process_continue(&mut self) -> TransportResult<()>;

    fn process_kill(&mut self) -> TransportResult<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn connect(&mut self) -> TransportResult<()> {
        (**self).connect()
    }

    fn disconnect(&mut self) -> TransportResult<()> {
        (**self).disconnect()
    }

    fn attach_process(&mut self) -> TransportResult<()> {
        (**self).attach_process()
    }

    fn read_bytes(&mut self, address: RemoteAddress, size: usize) -> TransportResult<Vec<u8>> {
        (**self).read_bytes(address, size)
    }

    fn set_memory(&mut self, address: RemoteAddress, data: &[u8]) -> TransportResult<()> {
        (**self).set_memory(address, data)
    }

    fn list_process_ids(&mut self) -> TransportResult<Vec<ProcessId>> {
        (**self).list_process_ids()
    }

    fn process_name(&mut self, id: ProcessId) -> TransportResult<String> {
        (**self).process_name(id)
    }

    fn process_path(&mut self, id: ProcessId) -> TransportResult<String> {
        (**self).process_path(id)
    }

    fn list_modules(&mut self) -> TransportResult<Vec<ModuleId>> {
        (**self).list_modules()
    }

    fn module_base(&mut self, module: ModuleId) -> TransportResult<RemoteAddress> {
        (**self).module_base(module)
    }

    fn module_name(&mut self, module: ModuleId) -> TransportResult<String> {
        (**self).module_name(module)
    }

    fn module_size(&mut self, module: ModuleId) -> TransportResult<u32> {
        (**self).module_size(module)
    }

    fn process_stop(&mut self) -> TransportResult<()> {
        (**self).process_stop()
    }

    fn process_continue(&mut self) -> TransportResult<()> {
        (**self).process_continue()
    }

    fn process_kill(&mut self) -> TransportResult<()> {
        (**self).process_kill()
    }
}
