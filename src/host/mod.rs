//! Host-facing boundary
//!
//! The inspection host talks to a target through a fixed set of core
//! functions with boolean or no-op failure reporting. [`CoreFunctions`]
//! mirrors that contract; [`TargetBridge`] implements it on top of a
//! [`crate::accessor::SynchronizedAccessor`].

mod bridge;
mod notify;

pub use bridge::{BridgeOptions, TargetBridge};
pub use notify::{ConnectionNotifier, LogNotifier};

use crate::core::types::{ByteOrder, ModuleRecord, ProcessRecord, RemoteAddress};
use crate::process::ControlAction;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Opaque host-native process handle (pointer width on the host)
pub type ProcessHandle = u64;

/// Section descriptor in the host's section callback shape.
///
/// The target does not expose section metadata, so the bridge never
/// produces one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub base_address: RemoteAddress,
    pub size: u32,
    pub name: String,
    pub module_path: String,
}

/// Debug event as handed over by the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugEvent {
    pub process: ProcessHandle,
    pub thread: u64,
    pub exception_address: u64,
}

/// What a hardware breakpoint triggers on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointTrigger {
    Execute,
    Access,
    Write,
}

/// Hardware breakpoint request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareBreakpoint {
    pub register: u8,
    pub trigger: BreakpointTrigger,
    pub size: u8,
}

/// Core functions the host calls on a target plugin
pub trait CoreFunctions: Send + Sync {
    /// Whether the handle still refers to a live process
    fn is_process_valid(&self, process: ProcessHandle) -> bool;

    /// Open a process by id; the returned handle is passed to later calls
    fn open_remote_process(&self, id: ProcessHandle) -> ProcessHandle;

    fn close_remote_process(&self, process: ProcessHandle);

    /// Fill `buffer[..size]` from `address`
    fn read_remote_memory(
        &self,
        process: ProcessHandle,
        address: u64,
        buffer: &mut [u8],
        size: usize,
    ) -> bool;

    /// Write `buffer[..size]` to `address`
    fn write_remote_memory(
        &self,
        process: ProcessHandle,
        address: u64,
        buffer: &[u8],
        size: usize,
    ) -> bool;

    fn enumerate_processes(&self, callback: &mut dyn FnMut(ProcessRecord));

    fn enumerate_remote_sections_and_modules(
        &self,
        process: ProcessHandle,
        section_callback: &mut dyn FnMut(SectionRecord),
        module_callback: &mut dyn FnMut(ModuleRecord),
    );

    fn control_remote_process(&self, process: ProcessHandle, action: ControlAction);

    fn attach_debugger_to_process(&self, id: ProcessHandle) -> bool;

    fn detach_debugger_from_process(&self, id: ProcessHandle);

    fn await_debug_event(&self, event: &mut DebugEvent, timeout: Duration) -> bool;

    fn handle_debug_event(&self, event: &mut DebugEvent);

    fn set_hardware_breakpoint(
        &self,
        id: ProcessHandle,
        address: u64,
        breakpoint: HardwareBreakpoint,
        set: bool,
    ) -> bool;

    /// Byte order the host must use to interpret target memory
    fn byte_order(&self) -> ByteOrder;
}
