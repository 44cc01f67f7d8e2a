//! Command tags and their argument shapes.
//!
//! Every command has one fixed direction and one fixed argument shape. The
//! [`ControlCall`] enum pairs each command with an argument of exactly that
//! shape, so a mismatched call cannot be constructed.

use std::fmt;
use std::time::Duration;

use crate::qos::QosSpec;

/// Opaque handle of an already-open flow.
///
/// Owned by the caller. Nothing in this workspace creates, duplicates or
/// closes the flow behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowDescriptor(i32);

impl FlowDescriptor {
    pub const fn new(fd: i32) -> Self {
        Self(fd)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl From<i32> for FlowDescriptor {
    fn from(fd: i32) -> Self {
        Self(fd)
    }
}

impl fmt::Display for FlowDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fd {}", self.0)
    }
}

/// Whether the primitive reads the argument or writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

/// The argument type a command carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    Timeout,
    Qos,
    Size,
    Flags,
}

/// Command tag understood by the control primitive.
///
/// Discriminants are the numeric tags of the `fccntl` command space.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Command {
    SetRecvTimeout = 0,
    GetRecvTimeout = 1,
    SetSendTimeout = 2,
    GetSendTimeout = 3,
    GetQos = 4,
    SetFlags = 5,
    GetFlags = 6,
    GetRxQueueLen = 7,
    GetTxQueueLen = 8,
}

impl Command {
    pub const ALL: [Command; 9] = [
        Command::SetRecvTimeout,
        Command::GetRecvTimeout,
        Command::SetSendTimeout,
        Command::GetSendTimeout,
        Command::GetQos,
        Command::SetFlags,
        Command::GetFlags,
        Command::GetRxQueueLen,
        Command::GetTxQueueLen,
    ];

    /// Numeric tag passed to the primitive.
    pub const fn tag(self) -> i32 {
        self as i32
    }

    /// Decode a numeric tag.
    pub fn from_tag(tag: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.tag() == tag)
    }

    pub const fn direction(self) -> Direction {
        match self {
            Command::SetRecvTimeout | Command::SetSendTimeout | Command::SetFlags => Direction::In,
            Command::GetRecvTimeout
            | Command::GetSendTimeout
            | Command::GetQos
            | Command::GetFlags
            | Command::GetRxQueueLen
            | Command::GetTxQueueLen => Direction::Out,
        }
    }

    pub const fn shape(self) -> ArgShape {
        match self {
            Command::SetRecvTimeout
            | Command::GetRecvTimeout
            | Command::SetSendTimeout
            | Command::GetSendTimeout => ArgShape::Timeout,
            Command::GetQos => ArgShape::Qos,
            Command::SetFlags | Command::GetFlags => ArgShape::Flags,
            Command::GetRxQueueLen | Command::GetTxQueueLen => ArgShape::Size,
        }
    }

    /// Symbolic name of the command in the `fccntl` header.
    pub const fn name(self) -> &'static str {
        match self {
            Command::SetRecvTimeout => "FLOWSRCVTIMEO",
            Command::GetRecvTimeout => "FLOWGRCVTIMEO",
            Command::SetSendTimeout => "FLOWSSNDTIMEO",
            Command::GetSendTimeout => "FLOWGSNDTIMEO",
            Command::GetQos => "FLOWGQOSSPEC",
            Command::SetFlags => "FLOWSFLAGS",
            Command::GetFlags => "FLOWGFLAGS",
            Command::GetRxQueueLen => "FLOWGRXQLEN",
            Command::GetTxQueueLen => "FLOWGTXQLEN",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A command together with its argument.
///
/// Set-style variants carry the value, get-style variants borrow the slot
/// the primitive fills. Primitives must leave out-slots untouched when they
/// report failure.
#[derive(Debug)]
pub enum ControlCall<'a> {
    /// `None` clears the timeout so reads block indefinitely.
    SetRecvTimeout(Option<Duration>),
    GetRecvTimeout(&'a mut Duration),
    /// `None` clears the timeout so writes block indefinitely.
    SetSendTimeout(Option<Duration>),
    GetSendTimeout(&'a mut Duration),
    GetQos(&'a mut QosSpec),
    SetFlags(u32),
    GetFlags(&'a mut u32),
    GetRxQueueLen(&'a mut usize),
    GetTxQueueLen(&'a mut usize),
}

impl ControlCall<'_> {
    pub fn command(&self) -> Command {
        match self {
            ControlCall::SetRecvTimeout(_) => Command::SetRecvTimeout,
            ControlCall::GetRecvTimeout(_) => Command::GetRecvTimeout,
            ControlCall::SetSendTimeout(_) => Command::SetSendTimeout,
            ControlCall::GetSendTimeout(_) => Command::GetSendTimeout,
            ControlCall::GetQos(_) => Command::GetQos,
            ControlCall::SetFlags(_) => Command::SetFlags,
            ControlCall::GetFlags(_) => Command::GetFlags,
            ControlCall::GetRxQueueLen(_) => Command::GetRxQueueLen,
            ControlCall::GetTxQueueLen(_) => Command::GetTxQueueLen,
        }
    }
}
