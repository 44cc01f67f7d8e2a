use flowctl_primitive::{Command, FlowDescriptor, PrimitiveError, EPERM};

/// A control operation failed in the underlying primitive.
///
/// `source` is the primitive's failure, unchanged. The facade adds only the
/// command and descriptor it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{command} on {fd} failed: {source}")]
pub struct FlowError {
    command: Command,
    fd: FlowDescriptor,
    source: PrimitiveError,
}

impl FlowError {
    pub(crate) fn new(command: Command, fd: FlowDescriptor, source: PrimitiveError) -> Self {
        Self {
            command,
            fd,
            source,
        }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn fd(&self) -> FlowDescriptor {
        self.fd
    }

    pub fn primitive_error(&self) -> PrimitiveError {
        self.source
    }

    /// Positive errno reported by the primitive.
    pub fn errno(&self) -> i32 {
        self.source.errno()
    }

    pub fn is_permission_denied(&self) -> bool {
        self.source.errno() == EPERM
    }
}

impl From<FlowError> for std::io::Error {
    fn from(err: FlowError) -> Self {
        std::io::Error::new(err.source.kind(), err)
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
