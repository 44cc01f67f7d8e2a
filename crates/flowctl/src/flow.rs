use std::time::Duration;

use flowctl_primitive::{ControlPrimitive, FlowDescriptor, QosSpec};

use crate::error::Result;
use crate::facade::FlowControl;
use crate::flags::FlowFlags;

/// A [`FlowControl`] bound to one descriptor.
///
/// Holds nothing but the two references; create one per use with
/// [`FlowControl::flow`].
#[derive(Debug)]
pub struct Flow<'c, P> {
    ctl: &'c FlowControl<P>,
    fd: FlowDescriptor,
}

impl<P> Clone for Flow<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Flow<'_, P> {}

impl<'c, P: ControlPrimitive> Flow<'c, P> {
    pub(crate) fn new(ctl: &'c FlowControl<P>, fd: FlowDescriptor) -> Self {
        Self { ctl, fd }
    }

    pub fn fd(&self) -> FlowDescriptor {
        self.fd
    }

    pub fn set_send_timeout(&self, timeout: Duration) -> Result<()> {
        self.ctl.set_send_timeout(self.fd, timeout)
    }

    pub fn clear_send_timeout(&self) -> Result<()> {
        self.ctl.clear_send_timeout(self.fd)
    }

    pub fn send_timeout(&self) -> Result<Duration> {
        self.ctl.send_timeout(self.fd)
    }

    pub fn set_recv_timeout(&self, timeout: Duration) -> Result<()> {
        self.ctl.set_recv_timeout(self.fd, timeout)
    }

    pub fn clear_recv_timeout(&self) -> Result<()> {
        self.ctl.clear_recv_timeout(self.fd)
    }

    pub fn recv_timeout(&self) -> Result<Duration> {
        self.ctl.recv_timeout(self.fd)
    }

    pub fn qos(&self) -> Result<QosSpec> {
        self.ctl.qos(self.fd)
    }

    pub fn rx_queue_len(&self) -> Result<usize> {
        self.ctl.rx_queue_len(self.fd)
    }

    pub fn tx_queue_len(&self) -> Result<usize> {
        self.ctl.tx_queue_len(self.fd)
    }

    pub fn set_flags(&self, flags: FlowFlags) -> Result<()> {
        self.ctl.set_flags(self.fd, flags)
    }

    pub fn flags(&self) -> Result<FlowFlags> {
        self.ctl.flags(self.fd)
    }

    /// Add flags to the current set. Costs one get and one set call.
    pub fn insert_flags(&self, flags: FlowFlags) -> Result<()> {
        let current = self.flags()?;
        self.set_flags(current | flags)
    }

    /// Remove flags from the current set. Costs one get and one set call.
    pub fn remove_flags(&self, flags: FlowFlags) -> Result<()> {
        let current = self.flags()?;
        self.set_flags(current.difference(flags))
    }
}
