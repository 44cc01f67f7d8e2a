//! Typed control facade for flow descriptors.
//!
//! Query and change per-flow parameters on an open flow: send and receive
//! timeouts, the QoS it was allocated with, queue lengths, and behavioral
//! flags. Each operation is one call into an injected
//! [`ControlPrimitive`](primitive::ControlPrimitive).
//!
//! ```
//! use std::time::Duration;
//!
//! use flowctl::primitive::MemoryPrimitive;
//! use flowctl::{FlowControl, FlowFlags};
//!
//! let ctl = FlowControl::new(MemoryPrimitive::default());
//! let fd = ctl.primitive().open().unwrap();
//!
//! let flow = ctl.flow(fd);
//! flow.set_recv_timeout(Duration::from_millis(2500)).unwrap();
//! assert_eq!(flow.recv_timeout().unwrap(), Duration::from_millis(2500));
//!
//! flow.set_flags(FlowFlags::READ_WRITE | FlowFlags::NON_BLOCKING).unwrap();
//! assert!(flow.flags().unwrap().contains(FlowFlags::NON_BLOCKING));
//! ```

pub mod error;
pub mod facade;
pub mod flags;
pub mod flow;

pub use error::{FlowError, Result};
pub use facade::FlowControl;
pub use flags::{AccessMode, FlowFlags, FLAGS_SENTINEL};
pub use flow::Flow;
pub use flowctl_primitive::{Command, FlowDescriptor, QosSpec};

/// Re-export primitive types.
pub mod primitive {
    pub use flowctl_primitive::*;
}
