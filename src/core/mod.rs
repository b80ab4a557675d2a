//! Core module containing fundamental types for the bridge
//!
//! This module provides the foundational building blocks used throughout
//! the crate: remote address normalization, process and module records,
//! big-endian values and error types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    BridgeError,
    BridgeResult,
    MemoryValue,
    ModuleRecord,
    ProcessRecord,
    RemoteAddress,
    TransportError,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
