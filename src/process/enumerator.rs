//! Process enumeration over the debugging link

use crate::core::types::{BridgeError, BridgeResult, ProcessRecord, RemoteAddress};
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Connection state of the link, entered lazily and only moving forward
/// until the process is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    #[default]
    Disconnected,
    Connected,
    Attached,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Disconnected => write!(f, "disconnected"),
            LinkState::Connected => write!(f, "connected"),
            LinkState::Attached => write!(f, "attached"),
        }
    }
}

/// Drives connect, attach and process listing against a transport
pub struct ProcessEnumerator<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
    link: &'a mut LinkState,
}

impl<'a, T: Transport + ?Sized> ProcessEnumerator<'a, T> {
    /// Create a new process enumerator
    pub fn new(transport: &'a mut T, link: &'a mut LinkState) -> Self {
        ProcessEnumerator { transport, link }
    }

    /// Bring the link up to `Attached`, skipping steps already done
    pub fn ensure_attached(&mut self) -> BridgeResult<()> {
        if *self.link == LinkState::Disconnected {
            self.transport
                .connect()
                .map_err(BridgeError::connection_failed)?;
            *self.link = LinkState::Connected;
            info!("connected to target");
        }
        if *self.link == LinkState::Connected {
            self.transport
                .attach_process()
                .map_err(BridgeError::connection_failed)?;
            *self.link = LinkState::Attached;
            info!("attached to target process");
        }
        Ok(())
    }

    /// Deliver every process to `callback` in transport order.
    ///
    /// Records delivered before a failure stay delivered. Returns the
    /// number of processes reported.
    pub fn enumerate<F>(&mut self, mut callback: F) -> BridgeResult<usize>
    where
        F: FnMut(ProcessRecord),
    {
        self.ensure_attached()?;

        let ids = self
            .transport
            .list_process_ids()
            .map_err(BridgeError::connection_failed)?;

        let mut count = 0;
        for id in ids {
            let name = self
                .transport
                .process_name(id)
                .map_err(BridgeError::connection_failed)?;
            let path = self
                .transport
                .process_path(id)
                .map_err(BridgeError::connection_failed)?;

            debug!(id = %RemoteAddress::new(id), %name, "process");
            callback(ProcessRecord::new(id, name, path));
            count += 1;
        }

        Ok(count)
    }
}

/// Collect every process into a vector
pub fn list_processes<T: Transport + ?Sized>(
    transport: &mut T,
    link: &mut LinkState,
) -> BridgeResult<Vec<ProcessRecord>> {
    let mut processes = Vec::new();
    ProcessEnumerator::new(transport, link).enumerate(|p| processes.push(p))?;
    Ok(processes)
}
