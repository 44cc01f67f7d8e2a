//! Control primitive boundary for flow descriptors.
//!
//! Describes the one generic call every flow control operation goes through:
//! - [`Command`] tags with fixed direction and argument shape
//! - [`ControlCall`], a command paired with an argument of exactly its shape
//! - the [`ControlPrimitive`] trait the facade depends on
//!
//! Two primitives ship with the crate: [`RawPrimitive`] adapts a C control
//! function, and [`MemoryPrimitive`] keeps a flow table in process memory.

pub mod command;
pub mod error;
pub mod memory;
pub mod qos;
pub mod raw;
pub mod traits;

pub use command::{ArgShape, Command, ControlCall, Direction, FlowDescriptor};
pub use error::{PrimitiveError, Result, EBADF, EINVAL, EMFILE, ENOTSUP, EPERM};
pub use memory::{MemoryConfig, MemoryPrimitive};
pub use qos::QosSpec;
pub use raw::{duration_to_timespec, timespec_to_duration, RawControlFn, RawPrimitive};
pub use traits::ControlPrimitive;
