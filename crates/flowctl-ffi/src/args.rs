use std::time::Duration;

use flowctl::primitive::timespec_to_duration;

use crate::error;

/// Convert a required out-pointer into a mutable reference.
///
/// # Safety
/// `value` must be null or valid for writes of `T` for the duration of the call.
pub(crate) unsafe fn out_arg<'a, T>(value: *mut T, name: &str) -> Option<&'a mut T> {
    if value.is_null() {
        let _ = error::set_invalid_argument(format!("{name} cannot be null"));
        return None;
    }

    // SAFETY: Null was rejected above; the caller guarantees validity.
    Some(unsafe { &mut *value })
}

/// Convert an optional timespec argument. Null means "no timeout".
///
/// # Safety
/// `ts` must be null or point to a readable `struct timespec`.
pub(crate) unsafe fn timeout_arg(ts: *const libc::timespec) -> Option<Duration> {
    if ts.is_null() {
        return None;
    }

    // SAFETY: Null was rejected above; the caller guarantees validity.
    Some(timespec_to_duration(unsafe { &*ts }))
}
