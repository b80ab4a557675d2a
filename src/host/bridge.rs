//! Host contract implemented over the synchronized accessor

use super::{
    CoreFunctions, ConnectionNotifier, DebugEvent, HardwareBreakpoint, LogNotifier, ProcessHandle,
    SectionRecord,
};
use crate::accessor::{AccessorOptions, SynchronizedAccessor};
use crate::config::Config;
use crate::core::types::{BridgeError, ByteOrder, ModuleRecord, ProcessRecord, RemoteAddress, TARGET_BYTE_ORDER};
use crate::process::ControlAction;
use crate::transport::Transport;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const CONNECTION_ERROR_TITLE: &str = "Connection Error";

/// Options for a [`TargetBridge`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgeOptions {
    /// Connect and attach when the host opens a process
    pub connect_on_open: bool,
    pub accessor: AccessorOptions,
}

impl From<&Config> for BridgeOptions {
    fn from(config: &Config) -> Self {
        BridgeOptions {
            connect_on_open: config.target.connect_on_open,
            accessor: AccessorOptions {
                fallback_enabled: config.cache.fallback_enabled,
            },
        }
    }
}

/// Target plugin handed to the host
pub struct TargetBridge<T: Transport> {
    accessor: Arc<SynchronizedAccessor<T>>,
    notifier: Arc<dyn ConnectionNotifier>,
    target_name: String,
    options: BridgeOptions,
}

impl<T: Transport> TargetBridge<T> {
    /// Create a bridge with default options and a log-only notifier
    pub fn new(transport: T) -> Self {
        Self::with_options(transport, BridgeOptions::default())
    }

    pub fn with_options(transport: T, options: BridgeOptions) -> Self {
        TargetBridge {
            accessor: Arc::new(SynchronizedAccessor::with_options(transport, options.accessor)),
            notifier: Arc::new(LogNotifier),
            target_name: "target".to_string(),
            options,
        }
    }

    /// Create a bridge configured from a loaded [`Config`]
    pub fn from_config(transport: T, config: &Config) -> Self {
        Self::with_options(transport, BridgeOptions::from(config))
            .with_target_name(config.target.name.clone())
    }

    /// Replace the connection error notifier
    pub fn with_notifier(mut self, notifier: Arc<dyn ConnectionNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Name used in user-visible messages
    pub fn with_target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = name.into();
        self
    }

    /// Shared handle to the underlying accessor
    pub fn accessor(&self) -> Arc<SynchronizedAccessor<T>> {
        Arc::clone(&self.accessor)
    }

    pub fn options(&self) -> BridgeOptions {
        self.options
    }

    fn report_connection_error(&self, err: &dyn std::fmt::Display) {
        debug!(error = %err, "connection failed");
        self.notifier.connection_error(
            CONNECTION_ERROR_TITLE,
            &format!("Could not connect to {}.", self.target_name),
        );
    }
}

impl<T: Transport> CoreFunctions for TargetBridge<T> {
    fn is_process_valid(&self, _process: ProcessHandle) -> bool {
        true
    }

    fn open_remote_process(&self, id: ProcessHandle) -> ProcessHandle {
        debug!(process = %RemoteAddress::normalize(id), "open process");
        if self.options.connect_on_open {
            if let Err(err) = self.accessor.ensure_attached() {
                self.report_connection_error(&err);
            }
        }
        id
    }

    fn close_remote_process(&self, process: ProcessHandle) {
        debug!(process = %RemoteAddress::normalize(process), "close process");
        self.accessor.close();
    }

    fn read_remote_memory(
        &self,
        _process: ProcessHandle,
        address: u64,
        buffer: &mut [u8],
        size: usize,
    ) -> bool {
        let Some(target) = buffer.get_mut(..size) else {
            debug!(error = %BridgeError::buffer_too_small(size, buffer.len()), "read rejected");
            return false;
        };

        match self.accessor.read(address, size) {
            Ok(bytes) => {
                target.copy_from_slice(&bytes);
                true
            }
            Err(err) if err.is_soft() => {
                debug!(error = %err, "read failed");
                false
            }
            Err(err) => {
                warn!(error = %err, "read failed");
                false
            }
        }
    }

    fn write_remote_memory(
        &self,
        _process: ProcessHandle,
        address: u64,
        buffer: &[u8],
        size: usize,
    ) -> bool {
        let Some(data) = buffer.get(..size) else {
            debug!(error = %BridgeError::buffer_too_small(size, buffer.len()), "write rejected");
            return false;
        };

        self.accessor.write(address, data).is_ok()
    }

    fn enumerate_processes(&self, callback: &mut dyn FnMut(ProcessRecord)) {
        if let Err(err) = self.accessor.enumerate_processes(callback) {
            self.report_connection_error(&err);
        }
    }

    fn enumerate_remote_sections_and_modules(
        &self,
        process: ProcessHandle,
        _section_callback: &mut dyn FnMut(SectionRecord),
        module_callback: &mut dyn FnMut(ModuleRecord),
    ) {
        if let Err(err) = self.accessor.enumerate_modules(process, module_callback) {
            warn!(error = %err, "module enumeration failed");
        }
    }

    fn control_remote_process(&self, process: ProcessHandle, action: ControlAction) {
        // failure already logged by the accessor
        let _ = self.accessor.control_process(process, action);
    }

    fn attach_debugger_to_process(&self, id: ProcessHandle) -> bool {
        debug!(process = %RemoteAddress::normalize(id), error = %BridgeError::unsupported("debugger attach"));
        false
    }

    fn detach_debugger_from_process(&self, id: ProcessHandle) {
        debug!(process = %RemoteAddress::normalize(id), error = %BridgeError::unsupported("debugger detach"));
    }

    fn await_debug_event(&self, _event: &mut DebugEvent, timeout: Duration) -> bool {
        debug!(?timeout, error = %BridgeError::unsupported("debug events"));
        false
    }

    fn handle_debug_event(&self, _event: &mut DebugEvent) {
        if let Err(err) = self.accessor.handle_debug_event() {
            warn!(error = %err, "continue after debug event failed");
        }
    }

    fn set_hardware_breakpoint(
        &self,
        _id: ProcessHandle,
        address: u64,
        breakpoint: HardwareBreakpoint,
        set: bool,
    ) -> bool {
        debug!(
            address = %RemoteAddress::normalize(address),
            ?breakpoint,
            set,
            error = %BridgeError::unsupported("hardware breakpoints")
        );
        false
    }

    fn byte_order(&self) -> ByteOrder {
        TARGET_BYTE_ORDER
    }
}
