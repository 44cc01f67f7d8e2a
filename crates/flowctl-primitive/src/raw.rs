use std::ffi::c_void;
use std::fmt;
use std::os::raw::c_int;
use std::ptr;
use std::time::Duration;

use crate::command::{ControlCall, FlowDescriptor};
use crate::error::{PrimitiveError, Result};
use crate::traits::ControlPrimitive;

/// C control function: `(fd, command tag, argument pointer) -> 0 | -errno`.
///
/// This is the non-variadic form of `fccntl`. Set-flags passes a pointer to
/// the `uint32_t` value rather than the value itself.
pub type RawControlFn = unsafe extern "C" fn(fd: c_int, cmd: c_int, arg: *mut c_void) -> c_int;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Convert a duration into a `timespec`, saturating seconds at `time_t::MAX`.
pub fn duration_to_timespec(duration: Duration) -> libc::timespec {
    libc::timespec {
        tv_sec: libc::time_t::try_from(duration.as_secs()).unwrap_or(libc::time_t::MAX),
        tv_nsec: duration.subsec_nanos() as _,
    }
}

/// Convert a `timespec` into a duration.
///
/// Negative seconds map to zero and nanoseconds are clamped to `[0, 1s)`.
pub fn timespec_to_duration(ts: &libc::timespec) -> Duration {
    if ts.tv_sec < 0 {
        return Duration::ZERO;
    }
    let nanos = (ts.tv_nsec as i64).clamp(0, NANOS_PER_SEC - 1);
    Duration::new(ts.tv_sec as u64, nanos as u32)
}

fn arg_ptr<T>(value: &mut T) -> *mut c_void {
    (value as *mut T).cast::<c_void>()
}

/// Control primitive backed by a C function pointer.
///
/// Each [`ControlCall`] is encoded as its numeric tag plus a pointer to a
/// C-shaped argument. Out-values land in a temporary first and reach the
/// caller's slot only when the function returns 0.
#[derive(Clone, Copy)]
pub struct RawPrimitive {
    func: RawControlFn,
}

impl RawPrimitive {
    /// Wrap a C control function.
    ///
    /// # Safety
    /// For every call, `func` must only access `arg` as the type its command
    /// documents (`struct timespec`, `qosspec_t`, `size_t` or `uint32_t`),
    /// must accept a null `arg` for the set-timeout commands, and must not
    /// retain the pointer after returning.
    pub unsafe fn new(func: RawControlFn) -> Self {
        Self { func }
    }

    fn invoke(&self, fd: FlowDescriptor, tag: c_int, arg: *mut c_void) -> Result<()> {
        // SAFETY: `arg` is null or points to a live value of the shape `tag`
        // expects; the contract on `func` was accepted in `new`.
        let rc = unsafe { (self.func)(fd.raw(), tag, arg) };
        if rc == 0 {
            Ok(())
        } else {
            Err(PrimitiveError::from_return(rc))
        }
    }
}

impl ControlPrimitive for RawPrimitive {
    fn control(&self, fd: FlowDescriptor, call: ControlCall<'_>) -> Result<()> {
        let tag = call.command().tag();
        match call {
            ControlCall::SetRecvTimeout(timeout) | ControlCall::SetSendTimeout(timeout) => {
                let mut ts = timeout.map(duration_to_timespec);
                let arg = ts.as_mut().map_or(ptr::null_mut(), arg_ptr);
                self.invoke(fd, tag, arg)
            }
            ControlCall::GetRecvTimeout(slot) | ControlCall::GetSendTimeout(slot) => {
                let mut ts = duration_to_timespec(Duration::ZERO);
                self.invoke(fd, tag, arg_ptr(&mut ts))?;
                *slot = timespec_to_duration(&ts);
                Ok(())
            }
            ControlCall::GetQos(slot) => {
                let mut qos = *slot;
                self.invoke(fd, tag, arg_ptr(&mut qos))?;
                *slot = qos;
                Ok(())
            }
            ControlCall::SetFlags(flags) => {
                let mut flags = flags;
                self.invoke(fd, tag, arg_ptr(&mut flags))
            }
            ControlCall::GetFlags(slot) => {
                let mut flags = 0u32;
                self.invoke(fd, tag, arg_ptr(&mut flags))?;
                *slot = flags;
                Ok(())
            }
            ControlCall::GetRxQueueLen(slot) | ControlCall::GetTxQueueLen(slot) => {
                let mut len: libc::size_t = 0;
                self.invoke(fd, tag, arg_ptr(&mut len))?;
                *slot = len;
                Ok(())
            }
        }
    }
}

impl fmt::Debug for RawPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawPrimitive")
            .field("func", &(self.func as *const c_void))
            .finish()
    }
}
