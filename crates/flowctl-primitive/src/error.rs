use std::io;

/// Permission denied; also reported for unset timeouts and denied flows.
pub const EPERM: i32 = libc::EPERM;
/// Bad (unknown or closed) flow descriptor.
pub const EBADF: i32 = libc::EBADF;
/// Invalid argument.
pub const EINVAL: i32 = libc::EINVAL;
/// Command not supported by the primitive.
pub const ENOTSUP: i32 = libc::ENOTSUP;
/// No descriptor left to hand out.
pub const EMFILE: i32 = libc::EMFILE;

/// Failure signal reported by a control primitive.
///
/// This is the only failure class at the boundary. It carries the positive
/// errno the primitive reported and nothing else; callers that need the
/// finer meaning inspect [`PrimitiveError::errno`] or [`PrimitiveError::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("control primitive failed with errno {errno}")]
pub struct PrimitiveError {
    errno: i32,
}

impl PrimitiveError {
    pub const PERMISSION_DENIED: Self = Self::from_errno(EPERM);
    pub const BAD_DESCRIPTOR: Self = Self::from_errno(EBADF);
    pub const INVALID_ARGUMENT: Self = Self::from_errno(EINVAL);
    pub const NOT_SUPPORTED: Self = Self::from_errno(ENOTSUP);
    pub const TOO_MANY_FLOWS: Self = Self::from_errno(EMFILE);

    /// Create an error from a positive errno value.
    ///
    /// Negative values are normalized, so `from_errno(-EPERM)` equals
    /// `from_errno(EPERM)`.
    pub const fn from_errno(errno: i32) -> Self {
        Self {
            errno: errno.saturating_abs(),
        }
    }

    /// Create an error from a non-zero primitive return code (`-errno`).
    pub const fn from_return(rc: i32) -> Self {
        Self::from_errno(rc)
    }

    /// The positive errno value.
    pub const fn errno(&self) -> i32 {
        self.errno
    }

    /// The value a C-style primitive returns for this failure.
    pub const fn as_return(&self) -> i32 {
        -self.errno
    }

    /// Map the errno to the closest [`io::ErrorKind`].
    pub fn kind(&self) -> io::ErrorKind {
        io::Error::from_raw_os_error(self.errno).kind()
    }
}

impl From<PrimitiveError> for io::Error {
    fn from(err: PrimitiveError) -> Self {
        io::Error::from_raw_os_error(err.errno)
    }
}

pub type Result<T> = std::result::Result<T, PrimitiveError>;
