//! Synchronized access to the shared transport
//!
//! The transport has no concurrency guarantees while the host calls in from
//! several threads (UI, refresh polling). Every operation here takes the
//! same lock, which guards the transport, the read cache and the link
//! state together. All calls are synchronous and block for the duration of
//! the transport call; there is no cancellation and no retry.
//!
//! Host handles are normalized to the 32-bit target space on entry.

use crate::core::types::{
    BridgeResult, MemoryValue, ModuleRecord, ProcessRecord, RemoteAddress, ValueType,
};
use crate::memory::{CachedRead, MemoryReader, MemoryWriter, RemoteMemoryCache};
use crate::process::{control_process, ControlAction, LinkState, ModuleEnumerator, ProcessEnumerator};
use crate::transport::Transport;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Tunables for the accessor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorOptions {
    /// Serve the last good snapshot when a read fails
    pub fallback_enabled: bool,
}

impl Default for AccessorOptions {
    fn default() -> Self {
        AccessorOptions {
            fallback_enabled: true,
        }
    }
}

struct AccessorState<T> {
    transport: T,
    cache: RemoteMemoryCache,
    link: LinkState,
}

/// Owns the transport handle and read cache behind one mutex
pub struct SynchronizedAccessor<T: Transport> {
    state: Mutex<AccessorState<T>>,
    options: AccessorOptions,
}

impl<T: Transport> SynchronizedAccessor<T> {
    /// Create an accessor with default options
    pub fn new(transport: T) -> Self {
        Self::with_options(transport, AccessorOptions::default())
    }

    /// Create an accessor with explicit options
    pub fn with_options(transport: T, options: AccessorOptions) -> Self {
        SynchronizedAccessor {
            state: Mutex::new(AccessorState {
                transport,
                cache: RemoteMemoryCache::new(),
                link: LinkState::Disconnected,
            }),
            options,
        }
    }

    pub fn options(&self) -> AccessorOptions {
        self.options
    }

    // A panic inside the transport poisons the lock; the state is still
    // consistent since the cache is only replaced whole.
    fn lock(&self) -> MutexGuard<'_, AccessorState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read `size` bytes at the normalized `address`
    pub fn read(&self, address: u64, size: usize) -> BridgeResult<Vec<u8>> {
        let address = RemoteAddress::normalize(address);
        let mut guard = self.lock();
        let state = &mut *guard;
        MemoryReader::new(&mut state.transport, &mut state.cache)
            .with_fallback(self.options.fallback_enabled)
            .read_bytes(address, size)
    }

    /// Read and decode a big-endian value
    pub fn read_value(&self, address: u64, value_type: ValueType) -> BridgeResult<MemoryValue> {
        let address = RemoteAddress::normalize(address);
        let mut guard = self.lock();
        let state = &mut *guard;
        MemoryReader::new(&mut state.transport, &mut state.cache)
            .with_fallback(self.options.fallback_enabled)
            .read_value(address, value_type)
    }

    /// Write `data` at the normalized `address`
    pub fn write(&self, address: u64, data: &[u8]) -> BridgeResult<()> {
        let address = RemoteAddress::normalize(address);
        let mut guard = self.lock();
        MemoryWriter::new(&mut guard.transport).write_bytes(address, data)
    }

    /// Encode a value big-endian and write it
    pub fn write_value(&self, address: u64, value: &MemoryValue) -> BridgeResult<()> {
        let address = RemoteAddress::normalize(address);
        let mut guard = self.lock();
        MemoryWriter::new(&mut guard.transport).write_value(address, value)
    }

    /// Connect, attach and report every process.
    ///
    /// Records are gathered under the lock and handed to `callback` after it
    /// is released, so the callback may call back into the accessor. On
    /// failure the records gathered so far are still delivered before the
    /// error is returned.
    pub fn enumerate_processes<F>(&self, mut callback: F) -> BridgeResult<usize>
    where
        F: FnMut(ProcessRecord),
    {
        let mut records = Vec::new();
        let result = {
            let mut guard = self.lock();
            let state = &mut *guard;
            ProcessEnumerator::new(&mut state.transport, &mut state.link)
                .enumerate(|record| records.push(record))
        };

        records.into_iter().for_each(&mut callback);
        result
    }

    /// Bring the link up to `Attached` without listing processes
    pub fn ensure_attached(&self) -> BridgeResult<()> {
        let mut guard = self.lock();
        let state = &mut *guard;
        ProcessEnumerator::new(&mut state.transport, &mut state.link).ensure_attached()
    }

    /// Report modules whose base address equals the normalized `process`
    pub fn enumerate_modules<F>(&self, process: u64, mut callback: F) -> BridgeResult<usize>
    where
        F: FnMut(ModuleRecord),
    {
        let process = RemoteAddress::normalize(process);
        let mut modules = Vec::new();
        let result = {
            let mut guard = self.lock();
            ModuleEnumerator::new(&mut guard.transport).for_process(process, |m| modules.push(m))
        };

        modules.into_iter().for_each(&mut callback);
        result
    }

    /// Suspend, resume or terminate the process
    pub fn control_process(&self, process: u64, action: ControlAction) -> BridgeResult<()> {
        debug!(process = %RemoteAddress::normalize(process), %action, "control process");
        let mut guard = self.lock();
        control_process(&mut guard.transport, action)
    }

    /// Single coarse continue issued for any debug event
    pub fn handle_debug_event(&self) -> BridgeResult<()> {
        let mut guard = self.lock();
        control_process(&mut guard.transport, ControlAction::Resume)
    }

    /// Best-effort disconnect; drops the cached snapshot and resets the link
    pub fn close(&self) {
        let mut guard = self.lock();
        if let Err(err) = guard.transport.disconnect() {
            warn!(error = %err, "disconnect failed");
        }
        guard.cache.clear();
        guard.link = LinkState::Disconnected;
    }

    /// Current link state
    pub fn link_state(&self) -> LinkState {
        self.lock().link
    }

    /// Address of the cached snapshot, if any
    pub fn cached_address(&self) -> Option<RemoteAddress> {
        self.lock().cache.cached_address()
    }

    /// Copy of the cached snapshot
    pub fn cached_read(&self) -> Option<CachedRead> {
        self.lock().cache.entry().cloned()
    }

    /// Consume the accessor and return the transport
    pub fn into_transport(self) -> T {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .transport
    }
}
