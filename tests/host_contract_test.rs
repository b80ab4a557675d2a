//! Host-facing contract: boolean failures, handles, control and debug surface

use remote_memory_bridge::config::Config;
use remote_memory_bridge::host::{ConnectionNotifier, CoreFunctions, DebugEvent, TargetBridge};
use remote_memory_bridge::transport::{MockTransport, ReadFault, RunState};
use remote_memory_bridge::{ControlAction, LinkState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct CountingNotifier {
    calls: AtomicUsize,
}

impl ConnectionNotifier for CountingNotifier {
    fn connection_error(&self, _title: &str, _message: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn opened_bridge() -> (TargetBridge<MockTransport>, Arc<remote_memory_bridge::transport::MockProbe>, u64) {
    let transport = MockTransport::demo();
    let probe = transport.probe();
    let bridge = TargetBridge::new(transport);
    let mut ids = Vec::new();
    bridge.enumerate_processes(&mut |p| ids.push(p.id.as_u64()));
    let handle = bridge.open_remote_process(ids[0]);
    (bridge, probe, handle)
}

#[test]
fn test_read_failure_is_false_not_panic() {
    let (bridge, _, handle) = opened_bridge();
    let mut buffer = [0u8; 4];
    assert!(!bridge.read_remote_memory(handle, 0x7000_0000, &mut buffer, 4));
    assert_eq!(buffer, [0u8; 4]);
}

#[test]
fn test_glitch_masked_through_host_contract() {
    let (bridge, probe, handle) = opened_bridge();
    let mut first = [0u8; 8];
    assert!(bridge.read_remote_memory(handle, 0x3000_0000, &mut first, 8));

    probe.inject([ReadFault::Zeroed]);
    let mut second = [0u8; 8];
    assert!(bridge.read_remote_memory(handle, 0x1_3000_0000, &mut second, 8));
    assert_eq!(first, second);
}

#[test]
fn test_write_uses_exactly_size_bytes() {
    let (bridge, _, handle) = opened_bridge();
    assert!(bridge.write_remote_memory(handle, 0x3000_0200, &[9, 9, 9, 9, 9, 9], 2));

    let mut buffer = [0u8; 4];
    // bytes 2..4 remain zero, so only a non-zero prefix makes the read valid
    assert!(bridge.read_remote_memory(handle, 0x3000_0200, &mut buffer, 4));
    assert_eq!(buffer, [9, 9, 0, 0]);

    assert!(!bridge.write_remote_memory(handle, 0x3000_0200, &[1], 2));
}

#[test]
fn test_control_maps_actions() {
    let (bridge, probe, handle) = opened_bridge();

    bridge.control_remote_process(handle, ControlAction::Suspend);
    assert_eq!(probe.run_state(), RunState::Stopped);
    bridge.control_remote_process(handle, ControlAction::Resume);
    assert_eq!(probe.run_state(), RunState::Running);
    bridge.control_remote_process(handle, ControlAction::Terminate);
    assert_eq!(probe.run_state(), RunState::Killed);
}

#[test]
fn test_unknown_control_action_makes_no_call() {
    let (bridge, probe, handle) = opened_bridge();
    let before = probe.total_calls();
    bridge.control_remote_process(handle, ControlAction::from_raw(99));
    assert_eq!(probe.total_calls(), before);
}

#[test]
fn test_close_disconnects_and_forgets_snapshot() {
    let (bridge, probe, handle) = opened_bridge();
    let mut buffer = [0u8; 8];
    assert!(bridge.read_remote_memory(handle, 0x3000_0000, &mut buffer, 8));

    bridge.close_remote_process(handle);
    assert_eq!(probe.disconnects(), 1);
    assert_eq!(bridge.accessor().link_state(), LinkState::Disconnected);
    assert!(bridge.accessor().cached_read().is_none());

    // Closing twice swallows the transport error
    bridge.close_remote_process(handle);
    assert_eq!(probe.disconnects(), 2);
}

#[test]
fn test_connection_error_notifies_once_per_enumeration() {
    let notifier = Arc::new(CountingNotifier::default());
    let bridge = TargetBridge::new(MockTransport::builder().unreachable().build())
        .with_notifier(notifier.clone());

    bridge.enumerate_processes(&mut |_| {});
    bridge.enumerate_processes(&mut |_| {});
    assert_eq!(notifier.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_debug_surface() {
    let (bridge, probe, handle) = opened_bridge();
    let mut event = DebugEvent::default();

    assert!(!bridge.attach_debugger_to_process(handle));
    assert!(!bridge.await_debug_event(&mut event, Duration::from_millis(1)));

    let before = probe.continues();
    bridge.handle_debug_event(&mut event);
    assert_eq!(probe.continues(), before + 1);
}

#[test]
fn test_bridge_from_config() {
    let mut config = Config::default();
    config.target.connect_on_open = true;
    config.cache.fallback_enabled = false;

    let transport = MockTransport::demo();
    let probe = transport.probe();
    let bridge = TargetBridge::from_config(transport, &config);
    assert!(!bridge.options().accessor.fallback_enabled);

    bridge.open_remote_process(0x0100_0300);
    assert_eq!(bridge.accessor().link_state(), LinkState::Attached);

    let mut buffer = [0u8; 4];
    assert!(bridge.read_remote_memory(0, 0x3000_0010, &mut buffer, 4));
    probe.inject([ReadFault::Error]);
    assert!(!bridge.read_remote_memory(0, 0x3000_0010, &mut buffer, 4));
}
