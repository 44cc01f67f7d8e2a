use std::time::Duration;

use flowctl_primitive::{ControlCall, ControlPrimitive, FlowDescriptor, QosSpec};
use tracing::{debug, trace};

use crate::error::{FlowError, Result};
use crate::flags::{FlowFlags, FLAGS_SENTINEL};
use crate::flow::Flow;

/// Typed control operations over an injected [`ControlPrimitive`].
///
/// Every method issues exactly one primitive call with the command tag and
/// argument shape that belong to it. Failures come back as [`FlowError`]
/// carrying the primitive's error unchanged; nothing is retried. On failure,
/// caller-supplied out-slots are left as they were.
#[derive(Debug, Clone, Default)]
pub struct FlowControl<P> {
    primitive: P,
}

impl<P: ControlPrimitive> FlowControl<P> {
    pub fn new(primitive: P) -> Self {
        Self { primitive }
    }

    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    pub fn into_inner(self) -> P {
        self.primitive
    }

    /// View bound to a single descriptor.
    pub fn flow(&self, fd: impl Into<FlowDescriptor>) -> Flow<'_, P> {
        Flow::new(self, fd.into())
    }

    fn call(&self, fd: FlowDescriptor, call: ControlCall<'_>) -> Result<()> {
        let command = call.command();
        trace!(%command, %fd, "flow control call");
        self.primitive.control(fd, call).map_err(|source| {
            debug!(%command, %fd, errno = source.errno(), "flow control call failed");
            FlowError::new(command, fd, source)
        })
    }

    /// Set the timeout for blocking writes.
    pub fn set_send_timeout(&self, fd: FlowDescriptor, timeout: Duration) -> Result<()> {
        self.call(fd, ControlCall::SetSendTimeout(Some(timeout)))
    }

    /// Remove the send timeout so writes block indefinitely.
    pub fn clear_send_timeout(&self, fd: FlowDescriptor) -> Result<()> {
        self.call(fd, ControlCall::SetSendTimeout(None))
    }

    pub fn send_timeout(&self, fd: FlowDescriptor) -> Result<Duration> {
        let mut timeout = Duration::ZERO;
        self.send_timeout_into(fd, &mut timeout)?;
        Ok(timeout)
    }

    pub fn send_timeout_into(&self, fd: FlowDescriptor, slot: &mut Duration) -> Result<()> {
        self.call(fd, ControlCall::GetSendTimeout(slot))
    }

    /// Set the timeout for blocking reads.
    pub fn set_recv_timeout(&self, fd: FlowDescriptor, timeout: Duration) -> Result<()> {
        self.call(fd, ControlCall::SetRecvTimeout(Some(timeout)))
    }

    /// Remove the receive timeout so reads block indefinitely.
    pub fn clear_recv_timeout(&self, fd: FlowDescriptor) -> Result<()> {
        self.call(fd, ControlCall::SetRecvTimeout(None))
    }

    pub fn recv_timeout(&self, fd: FlowDescriptor) -> Result<Duration> {
        let mut timeout = Duration::ZERO;
        self.recv_timeout_into(fd, &mut timeout)?;
        Ok(timeout)
    }

    pub fn recv_timeout_into(&self, fd: FlowDescriptor, slot: &mut Duration) -> Result<()> {
        self.call(fd, ControlCall::GetRecvTimeout(slot))
    }

    /// Current QoS of the flow. There is no setter: QoS is fixed at
    /// allocation time.
    pub fn qos(&self, fd: FlowDescriptor) -> Result<QosSpec> {
        let mut qos = QosSpec::default();
        self.qos_into(fd, &mut qos)?;
        Ok(qos)
    }

    pub fn qos_into(&self, fd: FlowDescriptor, slot: &mut QosSpec) -> Result<()> {
        self.call(fd, ControlCall::GetQos(slot))
    }

    /// Number of packets queued for reading.
    pub fn rx_queue_len(&self, fd: FlowDescriptor) -> Result<usize> {
        let mut len = 0;
        self.rx_queue_len_into(fd, &mut len)?;
        Ok(len)
    }

    pub fn rx_queue_len_into(&self, fd: FlowDescriptor, slot: &mut usize) -> Result<()> {
        self.call(fd, ControlCall::GetRxQueueLen(slot))
    }

    /// Number of packets queued for sending.
    pub fn tx_queue_len(&self, fd: FlowDescriptor) -> Result<usize> {
        let mut len = 0;
        self.tx_queue_len_into(fd, &mut len)?;
        Ok(len)
    }

    pub fn tx_queue_len_into(&self, fd: FlowDescriptor, slot: &mut usize) -> Result<()> {
        self.call(fd, ControlCall::GetTxQueueLen(slot))
    }

    pub fn set_flags(&self, fd: FlowDescriptor, flags: FlowFlags) -> Result<()> {
        self.call(fd, ControlCall::SetFlags(flags.bits()))
    }

    pub fn flags(&self, fd: FlowDescriptor) -> Result<FlowFlags> {
        let mut bits = 0;
        self.call(fd, ControlCall::GetFlags(&mut bits))?;
        Ok(FlowFlags::from_bits_retain(bits))
    }

    /// Flags as an `int`, or [`FLAGS_SENTINEL`] when they cannot be read.
    ///
    /// Compatibility form of [`FlowControl::flags`] for callers that expect
    /// the C return convention. Any failure collapses into the sentinel, as
    /// does a flag set that does not fit a non-negative `i32`.
    pub fn flags_or_sentinel(&self, fd: FlowDescriptor) -> i32 {
        match self.flags(fd) {
            Ok(flags) => i32::try_from(flags.bits()).unwrap_or_else(|_| {
                debug!(%fd, bits = flags.bits(), "flags outside the int return range");
                FLAGS_SENTINEL
            }),
            Err(_) => FLAGS_SENTINEL,
        }
    }
}
