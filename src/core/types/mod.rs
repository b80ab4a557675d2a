//! Core type definitions for the bridge
//!
//! Remote addresses, records handed to the host, big-endian values and
//! the error types shared by every layer.

mod address;
mod error;
mod process_info;
mod value;

// Re-export all public types
pub use address::{RemoteAddress, ADDRESS_MASK};
pub use error::{BridgeError, BridgeResult, TransportError, TransportResult};
pub use process_info::{ModuleRecord, ProcessRecord};
pub use value::{ByteOrder, MemoryValue, ValueType, TARGET_BYTE_ORDER};

// Common type aliases
pub type ProcessId = u32;
pub type ModuleId = u32;
