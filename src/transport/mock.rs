//! In-memory transport used by tests, benches and the demo binary
//!
//! The mock keeps a handful of memory regions, processes and modules, can
//! be scripted to glitch on reads, and records every primitive call in a
//! shared [`MockProbe`]. The probe also detects overlapping calls, which
//! must never happen when the transport sits behind the accessor lock.

use super::{Transport, TransportError, TransportResult};
use crate::core::types::{ModuleId, ProcessId, RemoteAddress};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

/// Scripted misbehaviour for the next read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFault {
    /// The read call errors
    Error,
    /// The read returns a zero-filled buffer of the requested size
    Zeroed,
    /// The read returns an empty buffer
    Empty,
    /// The read returns half of the requested bytes
    Short,
}

/// Execution state of the mocked process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped,
    Killed,
}

/// Call counters and fault script shared between the mock and a test
#[derive(Debug)]
pub struct MockProbe {
    in_call: AtomicBool,
    overlaps: AtomicUsize,
    total_calls: AtomicUsize,
    reads: AtomicUsize,
    writes: AtomicUsize,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
    attaches: AtomicUsize,
    stops: AtomicUsize,
    continues: AtomicUsize,
    kills: AtomicUsize,
    queries: AtomicUsize,
    reachable: AtomicBool,
    faults: Mutex<VecDeque<ReadFault>>,
    run_state: Mutex<RunState>,
}

impl Default for MockProbe {
    fn default() -> Self {
        MockProbe {
            in_call: AtomicBool::new(false),
            overlaps: AtomicUsize::new(0),
            total_calls: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
            attaches: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            continues: AtomicUsize::new(0),
            kills: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
            reachable: AtomicBool::new(true),
            faults: Mutex::new(VecDeque::new()),
            run_state: Mutex::new(RunState::Running),
        }
    }
}

impl MockProbe {
    /// Queues faults consumed by the next reads, in order
    pub fn inject(&self, faults: impl IntoIterator<Item = ReadFault>) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(faults);
    }

    /// Makes the target answer (or stop answering) connection attempts
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Number of times two transport calls overlapped
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    /// Total number of transport primitive calls
    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn attaches(&self) -> usize {
        self.attaches.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn continues(&self) -> usize {
        self.continues.load(Ordering::SeqCst)
    }

    pub fn kills(&self) -> usize {
        self.kills.load(Ordering::SeqCst)
    }

    /// Process and module listing calls
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Current execution state of the mocked process
    pub fn run_state(&self) -> RunState {
        *self.run_state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_run_state(&self, state: RunState) {
        *self.run_state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn next_fault(&self) -> Option<ReadFault> {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    fn enter(&self, counter: &AtomicUsize) -> CallGuard<'_> {
        if self.in_call.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        counter.fetch_add(1, Ordering::SeqCst);
        CallGuard { probe: self }
    }
}

/// Marks a transport call as in flight until dropped
struct CallGuard<'a> {
    probe: &'a MockProbe,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.probe.in_call.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
struct MockRegion {
    base: RemoteAddress,
    data: Vec<u8>,
}

impl MockRegion {
    fn range(&self, address: RemoteAddress, size: usize) -> Option<std::ops::Range<usize>> {
        let start = address.as_u32().checked_sub(self.base.as_u32())? as usize;
        let end = start.checked_add(size)?;
        (end <= self.data.len()).then_some(start..end)
    }
}

#[derive(Debug, Clone)]
struct MockProcess {
    id: ProcessId,
    name: String,
    path: String,
}

#[derive(Debug, Clone)]
struct MockModule {
    id: ModuleId,
    base: RemoteAddress,
    name: String,
    size: u32,
}

/// In-memory stand-in for the vendor debugging link
#[derive(Debug)]
pub struct MockTransport {
    name: String,
    regions: Vec<MockRegion>,
    processes: Vec<MockProcess>,
    listed_ids: Vec<ProcessId>,
    modules: Vec<MockModule>,
    reject_writes: bool,
    call_delay: Option<Duration>,
    connected: bool,
    attached: bool,
    probe: Arc<MockProbe>,
}

impl MockTransport {
    /// Starts building a mock target
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder::default()
    }

    /// A small console-like target with one game process and two modules
    pub fn demo() -> Self {
        let mut header = vec![0u8; 0x100];
        header[..4].copy_from_slice(&0x7F45_4C46u32.to_be_bytes());
        header[0x10..0x14].copy_from_slice(&0x0001_0200u32.to_be_bytes());

        let mut heap = vec![0u8; 0x1000];
        heap[..8].copy_from_slice(b"PLAYER01");
        heap[0x10..0x14].copy_from_slice(&100u32.to_be_bytes());

        MockTransport::builder()
            .name("demo-target")
            .region(0x0001_0000u32, header)
            .region(0x3000_0000u32, heap)
            .process(0x0100_0300, "EBOOT.BIN", "/dev_hdd0/game/DEMO00000/USRDIR/EBOOT.BIN")
            .process(0x0100_0400, "vsh.self", "/dev_flash/vsh/module/vsh.self")
            .module(1, 0x0100_0300u32, "EBOOT.BIN", 0x0080_0000)
            .module(2, 0x0100_0400u32, "liblv2.sprx", 0x0001_0000)
            .build()
    }

    /// Shared handle to the call counters and fault script
    pub fn probe(&self) -> Arc<MockProbe> {
        Arc::clone(&self.probe)
    }

    fn pause(&self) {
        if let Some(delay) = self.call_delay {
            thread::sleep(delay);
        }
    }

    fn require_connected(&self) -> TransportResult<()> {
        if self.connected {
            Ok(())
        } else {
            Err(TransportError::Unreachable(format!("{} is not connected", self.name)))
        }
    }

    fn require_attached(&self) -> TransportResult<()> {
        self.require_connected()?;
        if self.attached {
            Ok(())
        } else {
            Err(TransportError::NotAttached)
        }
    }

    fn module(&self, module: ModuleId) -> TransportResult<&MockModule> {
        self.modules
            .iter()
            .find(|m| m.id == module)
            .ok_or(TransportError::UnknownModule(module))
    }

    fn process(&self, id: ProcessId) -> TransportResult<&MockProcess> {
        self.processes
            .iter()
            .find(|p| p.id == id)
            .ok_or(TransportError::UnknownProcess(id))
    }
}

impl Transport for MockTransport {
    fn connect(&mut self) -> TransportResult<()> {
        let probe = Arc::clone(&self.probe);
        let _guard = probe.enter(&probe.connects);
        self.pause();
        if !probe.reachable.load(Ordering::SeqCst) {
            return Err(TransportError::Unreachable(format!(
                "no response from {}",
                self.name
            )));
        }
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> TransportResult<()> {
        let probe = Arc::clone(&self.probe);
        let _guard = probe.enter(&probe.disconnects);
        self.require_connected()?;
        self.connected = false;
        self.attached = false;
        Ok(())
    }

    fn attach_process(&mut self) -> TransportResult<()> {
        let probe = Arc::clone(&self.probe);
        let _guard = probe.enter(&probe.attaches);
        self.require_connected()?;
        self.attached = true;
        Ok(())
    }

    fn read_bytes(&mut self, address: RemoteAddress, size: usize) -> TransportResult<Vec<u8>> {
        let probe = Arc::clone(&self.probe);
        let _guard = probe.enter(&probe.reads);
        self.pause();
        self.require_attached()?;

        let fault = probe.next_fault();
        match fault {
            Some(ReadFault::Error) => {
                return Err(TransportError::rejected("read_bytes", "transient link error"))
            }
            Some(ReadFault::Zeroed) => return Ok(vec![0; size]),
            Some(ReadFault::Empty) => return Ok(Vec::new()),
            Some(ReadFault::Short) | None => {}
        }

        if probe.run_state() == RunState::Killed {
            return Err(TransportError::rejected("read_bytes", "process terminated"));
        }

        let mut bytes = self
            .regions
            .iter()
            .find_map(|r| r.range(address, size).map(|range| r.data[range].to_vec()))
            .ok_or_else(|| {
                TransportError::rejected("read_bytes", format!("{} is unmapped", address))
            })?;

        if fault == Some(ReadFault::Short) {
            bytes.truncate(size / 2);
        }
        Ok(bytes)
    }

    fn set_memory(&mut self, address: RemoteAddress, data: &[u8]) -> TransportResult<()> {
        let probe = Arc::clone(&self.probe);
        let _guard = probe.enter(&probe.writes);
        self.pause();
        self.require_attached()?;

        if self.reject_writes {
            return Err(TransportError::rejected("set_memory", "memory is write protected"));
        }

        let target = self
            .regions
            .iter_mut()
            .find_map(|r| r.range(address, data.len()).map(|range| &mut r.data[range]))
            .ok_or_else(|| {
                TransportError::rejected("set_memory", format!("{} is unmapped", address))
            })?;
        target.copy_from_slice(data);
        Ok(())
    }

    fn list_process_ids(&mut self) -> TransportResult<Vec<ProcessId>> {
        let probe = Arc::clone(&self.probe);
        let _guard = probe.enter(&probe.queries);
        self.require_attached()?;
        Ok(self.listed_ids.clone())
    }

    fn process_name(&mut self, id: ProcessId) -> TransportResult<String> {
        let probe = Arc::clone(&self.probe);
        let _guard = probe.enter(&probe.queries);
        Ok(self.process(id)?.name.clone())
    }

    fn process_path(&mut self, id: ProcessId) -> TransportResult<String> {
        let probe = Arc::clone(&self.probe);
        let _guard = probe.enter(&probe.queries);
        Ok(self.process(id)?.path.clone())
    }

    fn list_modules(&mut self) -> TransportResult<Vec<ModuleId>> {
        let probe = Arc::clone(&self.probe);
        let _guard = probe.enter(&probe.queries);
        self.require_attached()?;
        Ok(self.modules.iter().map(|m| m.id).collect())
    }

    fn module_base(&mut self, module: ModuleId) -> TransportResult<RemoteAddress> {
        let probe = Arc::clone(&self.probe);
        let _guard = probe.enter(&probe.queries);
        Ok(self.module(module)?.base)
    }

    fn module_name(&mut self, module: ModuleId) -> TransportResult<String> {
        let probe = Arc::clone(&self.probe);
        let _guard = probe.enter(&probe.queries);
        Ok(self.module(module)?.name.clone())
    }

    fn module_size(&mut self, module: ModuleId) -> TransportResult<u32> {
        let probe = Arc::clone(&self.probe);
        let _guard = probe.enter(&probe.queries);
        Ok(self.module(module)?.size)
    }

    fn process_stop(&mut self) -> TransportResult<()> {
        let probe = Arc::clone(&self.probe);
        let _guard = probe.enter(&probe.stops);
        self.require_attached()?;
        probe.set_run_state(RunState::Stopped);
        Ok(())
    }

    fn process_continue(&mut self) -> TransportResult<()> {
        let probe = Arc::clone(&self.probe);
        let _guard = probe.enter(&probe.continues);
        self.require_attached()?;
        probe.set_run_state(RunState::Running);
        Ok(())
    }

    fn process_kill(&mut self) -> TransportResult<()> {
        let probe = Arc::clone(&self.probe);
        let _guard = probe.enter(&probe.kills);
        self.require_attached()?;
        probe.set_run_state(RunState::Killed);
        Ok(())
    }
}

/// Builder for [`MockTransport`]
#[derive(Debug, Default)]
pub struct MockTransportBuilder {
    name: Option<String>,
    regions: Vec<MockRegion>,
    processes: Vec<MockProcess>,
    listed_ids: Vec<ProcessId>,
    modules: Vec<MockModule>,
    reject_writes: bool,
    unreachable: bool,
    attached: bool,
    call_delay: Option<Duration>,
}

impl MockTransportBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Maps `data` at `base`
    pub fn region(mut self, base: impl Into<RemoteAddress>, data: Vec<u8>) -> Self {
        self.regions.push(MockRegion {
            base: base.into(),
            data,
        });
        self
    }

    pub fn process(mut self, id: ProcessId, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.processes.push(MockProcess {
            id,
            name: name.into(),
            path: path.into(),
        });
        self.listed_ids.push(id);
        self
    }

    /// Lists `id` without backing it, so name lookups for it fail
    pub fn phantom_process(mut self, id: ProcessId) -> Self {
        self.listed_ids.push(id);
        self
    }

    pub fn module(
        mut self,
        id: ModuleId,
        base: impl Into<RemoteAddress>,
        name: impl Into<String>,
        size: u32,
    ) -> Self {
        self.modules.push(MockModule {
            id,
            base: base.into(),
            name: name.into(),
            size,
        });
        self
    }

    /// Every `set_memory` call fails
    pub fn reject_writes(mut self) -> Self {
        self.reject_writes = true;
        self
    }

    /// Connection attempts fail until the probe flips reachability back
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Starts already connected and attached
    pub fn attached(mut self) -> Self {
        self.attached = true;
        self
    }

    /// Sleeps inside every connect, read and write to widen race windows
    pub fn call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = Some(delay);
        self
    }

    pub fn build(self) -> MockTransport {
        let probe = MockProbe::default();
        probe.set_reachable(!self.unreachable);
        MockTransport {
            name: self.name.unwrap_or_else(|| "mock-target".to_string()),
            regions: self.regions,
            processes: self.processes,
            listed_ids: self.listed_ids,
            modules: self.modules,
            reject_writes: self.reject_writes,
            call_delay: self.call_delay,
            connected: self.attached,
            attached: self.attached,
            probe: Arc::new(probe),
        }
    }
}
