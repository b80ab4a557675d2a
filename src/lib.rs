//! Synchronized remote memory access for 32-bit big-endian console targets
//!
//! The bridge sits between an inspection host and a vendor debugging
//! transport. It normalizes host handles to the target's 32-bit address
//! space, serializes every transport call behind one lock, and masks
//! transient empty or zeroed reads with the last good snapshot.

pub mod accessor;
pub mod config;
pub mod core;
pub mod host;
pub mod memory;
pub mod process;
pub mod transport;

// Re-export main types from core module
pub use crate::core::types::{
    BridgeError, BridgeResult, ByteOrder, MemoryValue, ModuleRecord, ProcessRecord, RemoteAddress,
    TransportError, ValueType,
};

pub use accessor::{AccessorOptions, SynchronizedAccessor};
pub use host::{CoreFunctions, TargetBridge};
pub use process::{ControlAction, LinkState};
pub use transport::Transport;
