//! Error types for the bridge and the transport it drives

use std::fmt;
use thiserror::Error;

/// Failure reported by the debugging transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Target unreachable: {0}")]
    Unreachable(String),

    #[error("No process attached")]
    NotAttached,

    #[error("{operation} rejected by target: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },

    #[error("Unknown module id: {0}")]
    UnknownModule(u32),

    #[error("Unknown process id: {0}")]
    UnknownProcess(u32),
}

impl TransportError {
    /// Creates a rejected-operation error
    pub fn rejected(operation: &'static str, reason: impl Into<String>) -> Self {
        TransportError::Rejected {
            operation,
            reason: reason.into(),
        }
    }
}

/// Result type alias for transport primitives
pub type TransportResult<T> = Result<T, TransportError>;

/// Main error type for accessor operations
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Connection to target failed: {0}")]
    ConnectionFailed(String),

    #[error("Failed to read memory at {address}: {reason}")]
    ReadFailed { address: String, reason: String },

    #[error("Failed to write memory at {address}: {reason}")]
    WriteFailed { address: String, reason: String },

    #[error("Process control {action} failed: {reason}")]
    ControlFailed { action: String, reason: String },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Invalid memory address: {0}")]
    InvalidAddress(String),

    #[error("Buffer too small: expected {expected}, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type alias for accessor operations
pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    /// Creates a connection failed error
    pub fn connection_failed(reason: impl fmt::Display) -> Self {
        BridgeError::ConnectionFailed(reason.to_string())
    }

    /// Creates a read failed error
    pub fn read_failed(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        BridgeError::ReadFailed {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a write failed error
    pub fn write_failed(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        BridgeError::WriteFailed {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a control failed error
    pub fn control_failed(action: impl fmt::Display, reason: impl Into<String>) -> Self {
        BridgeError::ControlFailed {
            action: action.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates an unsupported operation error
    pub fn unsupported(operation: impl Into<String>) -> Self {
        BridgeError::Unsupported(operation.into())
    }

    /// Creates a buffer too small error
    pub fn buffer_too_small(expected: usize, actual: usize) -> Self {
        BridgeError::BufferTooSmall { expected, actual }
    }

    /// Whether this failure is soft, i.e. expected to clear on the next poll
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            BridgeError::ReadFailed { .. }
                | BridgeError::WriteFailed { .. }
                | BridgeError::ControlFailed { .. }
                | BridgeError::Unsupported(_)
        )
    }
}
