//! Suspend, resume and terminate requests

use crate::core::types::{BridgeError, BridgeResult};
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Execution control requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlAction {
    Suspend,
    Resume,
    Terminate,
    /// Any host value without a mapping; ignored
    Unknown(i32),
}

impl ControlAction {
    /// Maps the host's raw action value
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => ControlAction::Suspend,
            1 => ControlAction::Resume,
            2 => ControlAction::Terminate,
            other => ControlAction::Unknown(other),
        }
    }
}

impl From<i32> for ControlAction {
    fn from(raw: i32) -> Self {
        ControlAction::from_raw(raw)
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlAction::Suspend => write!(f, "suspend"),
            ControlAction::Resume => write!(f, "resume"),
            ControlAction::Terminate => write!(f, "terminate"),
            ControlAction::Unknown(raw) => write!(f, "unknown({})", raw),
        }
    }
}

/// Forward `action` to the matching transport primitive.
///
/// `Unknown` actions make no transport call.
pub fn control_process<T: Transport + ?Sized>(transport: &mut T, action: ControlAction) -> BridgeResult<()> {
    let result = match action {
        ControlAction::Suspend => transport.process_stop(),
        ControlAction::Resume => transport.process_continue(),
        ControlAction::Terminate => transport.process_kill(),
        ControlAction::Unknown(_) => {
            debug!(%action, "ignoring unmapped control action");
            return Ok(());
        }
    };

    result.map_err(|err| {
        warn!(%action, error = %err, "process control failed");
        BridgeError::control_failed(action, err.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, RunState};

    #[test]
    fn test_from_raw() {
        assert_eq!(ControlAction::from_raw(0), ControlAction::Suspend);
        assert_eq!(ControlAction::from_raw(1), ControlAction::Resume);
        assert_eq!(ControlAction::from_raw(2), ControlAction::Terminate);
        assert_eq!(ControlAction::from(42), ControlAction::Unknown(42));
    }

    #[test]
    fn test_actions_reach_transport() {
        let mut transport = MockTransport::builder().attached().build();
        let probe = transport.probe();

        control_process(&mut transport, ControlAction::Suspend).unwrap();
        assert_eq!(probe.run_state(), RunState::Stopped);
        control_process(&mut transport, ControlAction::Resume).unwrap();
        assert_eq!(probe.run_state(), RunState::Running);
        control_process(&mut transport, ControlAction::Terminate).unwrap();
        assert_eq!(probe.run_state(), RunState::Killed);
        assert_eq!((probe.stops(), probe.continues(), probe.kills()), (1, 1, 1));
    }

    #[test]
    fn test_unknown_action_is_noop() {
        let mut transport = MockTransport::builder().attached().build();
        let probe = transport.probe();
        control_process(&mut transport, ControlAction::Unknown(7)).unwrap();
        assert_eq!(probe.total_calls(), 0);
    }

    #[test]
    fn test_failure_is_reported() {
        let mut transport = MockTransport::builder().build();
        let result = control_process(&mut transport, ControlAction::Suspend);
        assert!(matches!(result, Err(BridgeError::ControlFailed { .. })));
    }
}
