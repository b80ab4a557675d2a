//! Last-good-read cache used to mask transient read glitches

use crate::core::types::RemoteAddress;

/// Snapshot of the most recent successful read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedRead {
    pub address: RemoteAddress,
    pub bytes: Vec<u8>,
}

/// Holds a single snapshot; the latest successful read replaces it.
#[derive(Debug, Default)]
pub struct RemoteMemoryCache {
    entry: Option<CachedRead>,
}

impl RemoteMemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        RemoteMemoryCache { entry: None }
    }

    /// Replace the snapshot with a fresh successful read
    pub fn record_success(&mut self, address: RemoteAddress, bytes: &[u8]) {
        self.entry = Some(CachedRead {
            address,
            bytes: bytes.to_vec(),
        });
    }

    /// Copy of the snapshot sized to `size`, if it was taken at `address`
    /// and holds enough bytes
    pub fn try_fallback(&self, address: RemoteAddress, size: usize) -> Option<Vec<u8>> {
        let entry = self.entry.as_ref()?;
        if entry.address != address {
            return None;
        }
        entry.bytes.get(..size).map(<[u8]>::to_vec)
    }

    /// Address of the current snapshot
    pub fn cached_address(&self) -> Option<RemoteAddress> {
        self.entry.as_ref().map(|e| e.address)
    }

    /// Current snapshot, if any
    pub fn entry(&self) -> Option<&CachedRead> {
        self.entry.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    /// Drop the snapshot
    pub fn clear(&mut self) {
        self.entry = None;
    }
}
