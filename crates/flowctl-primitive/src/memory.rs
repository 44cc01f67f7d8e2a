use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::command::{Command, ControlCall, FlowDescriptor};
use crate::error::{PrimitiveError, Result};
use crate::qos::QosSpec;
use crate::traits::ControlPrimitive;

/// Read/write access mode bit used for freshly opened flows.
const DEFAULT_FLAGS: u32 = 0o2;

/// Controls the behavior of a [`MemoryPrimitive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryConfig {
    /// First descriptor handed out by [`MemoryPrimitive::open`].
    pub first_descriptor: i32,
    /// QoS of flows opened with [`MemoryPrimitive::open`].
    pub default_qos: QosSpec,
    /// Initial flags of every opened flow.
    pub default_flags: u32,
    /// Commands answered with `ENOTSUP`.
    pub unsupported: Vec<Command>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            first_descriptor: 0,
            default_qos: QosSpec::default(),
            default_flags: DEFAULT_FLAGS,
            unsupported: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct FlowEntry {
    snd_timeout: Option<Duration>,
    rcv_timeout: Option<Duration>,
    qos: QosSpec,
    flags: u32,
    rx_queued: usize,
    tx_queued: usize,
    denied: bool,
}

#[derive(Debug)]
struct Table {
    /// `None` once the descriptor range is used up.
    next_fd: Option<i32>,
    flows: HashMap<FlowDescriptor, FlowEntry>,
}

/// In-process flow table answering control calls.
///
/// Stands in for the real control primitive in tests and demos. Every
/// [`ControlPrimitive::control`] invocation is counted, including failed ones.
#[derive(Debug)]
pub struct MemoryPrimitive {
    config: MemoryConfig,
    table: Mutex<Table>,
    calls: [AtomicUsize; Command::ALL.len()],
}

impl Default for MemoryPrimitive {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

impl MemoryPrimitive {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            table: Mutex::new(Table {
                next_fd: Some(config.first_descriptor),
                flows: HashMap::new(),
            }),
            config,
            calls: Default::default(),
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a flow with the configured default QoS.
    pub fn open(&self) -> Result<FlowDescriptor> {
        self.open_with_qos(self.config.default_qos)
    }

    /// Register a flow with an explicit QoS.
    ///
    /// Descriptors are handed out in increasing order and never reused. Fails
    /// with `EMFILE` once the `i32` range above `first_descriptor` is spent.
    pub fn open_with_qos(&self, qos: QosSpec) -> Result<FlowDescriptor> {
        let mut table = self.table();
        let Some(raw) = table.next_fd else {
            debug!("in-memory descriptor range exhausted");
            return Err(PrimitiveError::TOO_MANY_FLOWS);
        };
        let fd = FlowDescriptor::new(raw);
        table.next_fd = raw.checked_add(1);
        table.flows.insert(
            fd,
            FlowEntry {
                snd_timeout: None,
                rcv_timeout: None,
                qos,
                flags: self.config.default_flags,
                rx_queued: 0,
                tx_queued: 0,
                denied: false,
            },
        );
        debug!(%fd, "opened in-memory flow");
        Ok(fd)
    }

    /// Forget a flow. Returns false if the descriptor was not open.
    pub fn close(&self, fd: FlowDescriptor) -> bool {
        let removed = self.table().flows.remove(&fd).is_some();
        if removed {
            debug!(%fd, "closed in-memory flow");
        }
        removed
    }

    /// Put a flow into a permanently denied state: every command fails with
    /// `EPERM` from now on.
    pub fn deny(&self, fd: FlowDescriptor) -> bool {
        match self.table().flows.get_mut(&fd) {
            Some(entry) => {
                entry.denied = true;
                debug!(%fd, "denying control calls on in-memory flow");
                true
            }
            None => false,
        }
    }

    /// Install the queue lengths reported for a flow.
    pub fn set_queue_lengths(&self, fd: FlowDescriptor, rx: usize, tx: usize) -> bool {
        match self.table().flows.get_mut(&fd) {
            Some(entry) => {
                entry.rx_queued = rx;
                entry.tx_queued = tx;
                true
            }
            None => false,
        }
    }

    /// Total number of control invocations.
    pub fn calls(&self) -> usize {
        self.calls.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    /// Number of control invocations for one command.
    pub fn calls_for(&self, command: Command) -> usize {
        self.calls[command.tag() as usize].load(Ordering::Relaxed)
    }
}

impl ControlPrimitive for MemoryPrimitive {
    fn control(&self, fd: FlowDescriptor, call: ControlCall<'_>) -> Result<()> {
        let command = call.command();
        self.calls[command.tag() as usize].fetch_add(1, Ordering::Relaxed);

        let mut table = self.table();
        let entry = table
            .flows
            .get_mut(&fd)
            .ok_or(PrimitiveError::BAD_DESCRIPTOR)?;
        if entry.denied {
            return Err(PrimitiveError::PERMISSION_DENIED);
        }
        if self.config.unsupported.contains(&command) {
            return Err(PrimitiveError::NOT_SUPPORTED);
        }

        match call {
            ControlCall::SetRecvTimeout(timeout) => entry.rcv_timeout = timeout,
            ControlCall::SetSendTimeout(timeout) => entry.snd_timeout = timeout,
            ControlCall::GetRecvTimeout(slot) => {
                *slot = entry.rcv_timeout.ok_or(PrimitiveError::PERMISSION_DENIED)?;
            }
            ControlCall::GetSendTimeout(slot) => {
                *slot = entry.snd_timeout.ok_or(PrimitiveError::PERMISSION_DENIED)?;
            }
            ControlCall::GetQos(slot) => *slot = entry.qos,
            ControlCall::SetFlags(flags) => entry.flags = flags,
            ControlCall::GetFlags(slot) => *slot = entry.flags,
            ControlCall::GetRxQueueLen(slot) => *slot = entry.rx_queued,
            ControlCall::GetTxQueueLen(slot) => *slot = entry.tx_queued,
        }
        Ok(())
    }
}
