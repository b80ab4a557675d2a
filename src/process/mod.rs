//! Process-level operations over the debugging link
//!
//! Process enumeration (with the lazy connect/attach sequence), module
//! lookup by base address and execution control.

pub mod control;
pub mod enumerator;
pub mod modules;

pub use control::{control_process, ControlAction};
pub use enumerator::{list_processes, LinkState, ProcessEnumerator};
pub use modules::ModuleEnumerator;
