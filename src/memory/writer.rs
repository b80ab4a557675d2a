//! Remote memory writes
//!
//! Writes go straight to the link: no retry, and they never touch the read
//! cache.

use crate::core::types::{BridgeError, BridgeResult, MemoryValue, RemoteAddress};
use crate::transport::Transport;
use tracing::{trace, warn};

/// Writer over a borrowed transport
pub struct MemoryWriter<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
}

impl<'a, T: Transport + ?Sized> MemoryWriter<'a, T> {
    /// Create a new writer
    pub fn new(transport: &'a mut T) -> Self {
        MemoryWriter { transport }
    }

    /// Write raw bytes at `address`
    pub fn write_bytes(&mut self, address: RemoteAddress, data: &[u8]) -> BridgeResult<()> {
        match self.transport.set_memory(address, data) {
            Ok(()) => {
                trace!(%address, size = data.len(), "write ok");
                Ok(())
            }
            Err(err) => {
                warn!(%address, size = data.len(), error = %err, "write failed");
                Err(BridgeError::write_failed(address, err.to_string()))
            }
        }
    }

    /// Encode a value big-endian and write it at `address`
    pub fn write_value(&mut self, address: RemoteAddress, value: &MemoryValue) -> BridgeResult<()> {
        self.write_bytes(address, &value.to_bytes())
    }
}
