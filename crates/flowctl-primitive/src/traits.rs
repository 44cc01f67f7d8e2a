use std::sync::Arc;

use crate::command::{ControlCall, FlowDescriptor};
use crate::error::Result;

/// The single generic control entry point beneath the facade.
///
/// An implementation receives one [`ControlCall`] per invocation, reads
/// set-style arguments and writes get-style slots. It reports failure with a
/// [`PrimitiveError`](crate::PrimitiveError) and must not touch out-slots in
/// that case.
pub trait ControlPrimitive {
    fn control(&self, fd: FlowDescriptor, call: ControlCall<'_>) -> Result<()>;
}

impl<P: ControlPrimitive + ?Sized> ControlPrimitive for &P {
    fn control(&self, fd: FlowDescriptor, call: ControlCall<'_>) -> Result<()> {
        (**self).control(fd, call)
    }
}

impl<P: ControlPrimitive + ?Sized> ControlPrimitive for Box<P> {
    fn control(&self, fd: FlowDescriptor, call: ControlCall<'_>) -> Result<()> {
        (**self).control(fd, call)
    }
}

impl<P: ControlPrimitive + ?Sized> ControlPrimitive for Arc<P> {
    fn control(&self, fd: FlowDescriptor, call: ControlCall<'_>) -> Result<()> {
        (**self).control(fd, call)
    }
}
