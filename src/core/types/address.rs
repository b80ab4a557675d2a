//! 32-bit remote address with normalization from wide host handles

use super::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mask applied to host handles to reach the target's address space
pub const ADDRESS_MASK: u64 = 0xFFFF_FFFF;

/// An address in the target's 32-bit address space
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteAddress(pub u32);

impl RemoteAddress {
    /// Creates a new address from a 32-bit value
    pub const fn new(value: u32) -> Self {
        RemoteAddress(value)
    }

    /// Normalizes a host-native handle by keeping its low 32 bits.
    ///
    /// Truncation is total: no sign extension, no error path.
    pub const fn normalize(handle: u64) -> Self {
        RemoteAddress((handle & ADDRESS_MASK) as u32)
    }

    /// Creates a null address (0x0)
    pub const fn null() -> Self {
        RemoteAddress(0)
    }

    /// Checks if the address is null
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns the raw 32-bit value
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Returns the address widened back to a host handle
    pub const fn as_u64(&self) -> u64 {
        self.0 as u64
    }

    /// Adds an offset, wrapping inside the 32-bit space
    pub const fn wrapping_add(&self, offset: u32) -> Self {
        RemoteAddress(self.0.wrapping_add(offset))
    }
}

impl FromStr for RemoteAddress {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u64::from_str_radix(hex, 16)
        } else if let Some(hex) = s.strip_prefix('$') {
            u64::from_str_radix(hex, 16)
        } else if s.chars().any(|c| c.is_ascii_alphabetic()) {
            u64::from_str_radix(s, 16)
        } else {
            s.parse::<u64>().or_else(|_| u64::from_str_radix(s, 16))
        };

        value
            .map(RemoteAddress::normalize)
            .map_err(|_| BridgeError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for RemoteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl fmt::LowerHex for RemoteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl fmt::UpperHex for RemoteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl From<u32> for RemoteAddress {
    fn from(value: u32) -> Self {
        RemoteAddress::new(value)
    }
}

impl From<u64> for RemoteAddress {
    fn from(value: u64) -> Self {
        RemoteAddress::normalize(value)
    }
}

impl From<usize> for RemoteAddress {
    fn from(value: usize) -> Self {
        RemoteAddress::normalize(value as u64)
    }
}

impl From<RemoteAddress> for u32 {
    fn from(address: RemoteAddress) -> Self {
        address.0
    }
}
