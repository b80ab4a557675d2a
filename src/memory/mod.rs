//! Remote memory access
//!
//! This module provides the read and write paths used by the accessor:
//! - Last-good-read caching
//! - Reads that mask transient empty or zeroed buffers
//! - Straight-through writes that never touch the cache

pub mod cache;
pub mod reader;
pub mod writer;

pub use cache::{CachedRead, RemoteMemoryCache};
pub use reader::{check_buffer, MemoryReader, SuspectRead};
pub use writer::MemoryWriter;
