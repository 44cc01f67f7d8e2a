use std::os::raw::c_int;

use flowctl::primitive::{duration_to_timespec, PrimitiveError};
use flowctl::{FlowDescriptor, FlowFlags, FLAGS_SENTINEL};

use crate::types::{FlowctlHandle, FlowctlQosSpec};
use crate::{args, error, with_ctl, FLOWCTL_ERR_INTERNAL};

fn status(result: flowctl::Result<()>) -> c_int {
    match result {
        Ok(()) => 0,
        Err(err) => error::map_flow_error(&err),
    }
}

/// Set the send timeout. A null `ts` removes the timeout.
///
/// # Safety
/// `ctl` must be a handle returned by `flowctl_new`; `ts` must be null or
/// point to a readable `struct timespec`.
#[no_mangle]
pub unsafe extern "C" fn flow_set_snd_timeout(
    ctl: FlowctlHandle,
    fd: c_int,
    ts: *const libc::timespec,
) -> c_int {
    crate::ffi_boundary(FLOWCTL_ERR_INTERNAL, || {
        error::clear_error_state();

        with_ctl(ctl, |handle| {
            let fd = FlowDescriptor::new(fd);
            // SAFETY: Caller guarantees `ts` is null or readable.
            match unsafe { args::timeout_arg(ts) } {
                Some(timeout) => status(handle.ctl.set_send_timeout(fd, timeout)),
                None => status(handle.ctl.clear_send_timeout(fd)),
            }
        })
    })
}

/// Set the receive timeout. A null `ts` removes the timeout.
///
/// # Safety
/// `ctl` must be a handle returned by `flowctl_new`; `ts` must be null or
/// point to a readable `struct timespec`.
#[no_mangle]
pub unsafe extern "C" fn flow_set_rcv_timeout(
    ctl: FlowctlHandle,
    fd: c_int,
    ts: *const libc::timespec,
) -> c_int {
    crate::ffi_boundary(FLOWCTL_ERR_INTERNAL, || {
        error::clear_error_state();

        with_ctl(ctl, |handle| {
            let fd = FlowDescriptor::new(fd);
            // SAFETY: Caller guarantees `ts` is null or readable.
            match unsafe { args::timeout_arg(ts) } {
                Some(timeout) => status(handle.ctl.set_recv_timeout(fd, timeout)),
                None => status(handle.ctl.clear_recv_timeout(fd)),
            }
        })
    })
}

/// Read the send timeout into `ts`. `ts` is untouched on failure.
///
/// # Safety
/// `ctl` must be a handle returned by `flowctl_new`; `ts` must be writable.
#[no_mangle]
pub unsafe extern "C" fn flow_get_snd_timeout(
    ctl: FlowctlHandle,
    fd: c_int,
    ts: *mut libc::timespec,
) -> c_int {
    crate::ffi_boundary(FLOWCTL_ERR_INTERNAL, || {
        error::clear_error_state();

        with_ctl(ctl, |handle| {
            // SAFETY: Caller guarantees `ts` is writable when non-null.
            let Some(out) = (unsafe { args::out_arg(ts, "ts") }) else {
                return PrimitiveError::INVALID_ARGUMENT.as_return();
            };
            match handle.ctl.send_timeout(FlowDescriptor::new(fd)) {
                Ok(timeout) => {
                    *out = duration_to_timespec(timeout);
                    0
                }
                Err(err) => error::map_flow_error(&err),
            }
        })
    })
}

/// Read the receive timeout into `ts`. `ts` is untouched on failure.
///
/// # Safety
/// `ctl` must be a handle returned by `flowctl_new`; `ts` must be writable.
#[no_mangle]
pub unsafe extern "C" fn flow_get_rcv_timeout(
    ctl: FlowctlHandle,
    fd: c_int,
    ts: *mut libc::timespec,
) -> c_int {
    crate::ffi_boundary(FLOWCTL_ERR_INTERNAL, || {
        error::clear_error_state();

        with_ctl(ctl, |handle| {
            // SAFETY: Caller guarantees `ts` is writable when non-null.
            let Some(out) = (unsafe { args::out_arg(ts, "ts") }) else {
                return PrimitiveError::INVALID_ARGUMENT.as_return();
            };
            match handle.ctl.recv_timeout(FlowDescriptor::new(fd)) {
                Ok(timeout) => {
                    *out = duration_to_timespec(timeout);
                    0
                }
                Err(err) => error::map_flow_error(&err),
            }
        })
    })
}

/// Read the flow's QoS into `qs`.
///
/// # Safety
/// `ctl` must be a handle returned by `flowctl_new`; `qs` must be writable.
#[no_mangle]
pub unsafe extern "C" fn flow_get_qos(
    ctl: FlowctlHandle,
    fd: c_int,
    qs: *mut FlowctlQosSpec,
) -> c_int {
    crate::ffi_boundary(FLOWCTL_ERR_INTERNAL, || {
        error::clear_error_state();

        with_ctl(ctl, |handle| {
            // SAFETY: Caller guarantees `qs` is writable when non-null.
            let Some(out) = (unsafe { args::out_arg(qs, "qs") }) else {
                return PrimitiveError::INVALID_ARGUMENT.as_return();
            };
            status(handle.ctl.qos_into(FlowDescriptor::new(fd), out))
        })
    })
}

/// Read the receive queue length into `sz`.
///
/// # Safety
/// `ctl` must be a handle returned by `flowctl_new`; `sz` must be writable.
#[no_mangle]
pub unsafe extern "C" fn flow_get_rx_qlen(
    ctl: FlowctlHandle,
    fd: c_int,
    sz: *mut libc::size_t,
) -> c_int {
    crate::ffi_boundary(FLOWCTL_ERR_INTERNAL, || {
        error::clear_error_state();

        with_ctl(ctl, |handle| {
            // SAFETY: Caller guarantees `sz` is writable when non-null.
            let Some(out) = (unsafe { args::out_arg(sz, "sz") }) else {
                return PrimitiveError::INVALID_ARGUMENT.as_return();
            };
            status(handle.ctl.rx_queue_len_into(FlowDescriptor::new(fd), out))
        })
    })
}

/// Read the transmit queue length into `sz`.
///
/// # Safety
/// `ctl` must be a handle returned by `flowctl_new`; `sz` must be writable.
#[no_mangle]
pub unsafe extern "C" fn flow_get_tx_qlen(
    ctl: FlowctlHandle,
    fd: c_int,
    sz: *mut libc::size_t,
) -> c_int {
    crate::ffi_boundary(FLOWCTL_ERR_INTERNAL, || {
        error::clear_error_state();

        with_ctl(ctl, |handle| {
            // SAFETY: Caller guarantees `sz` is writable when non-null.
            let Some(out) = (unsafe { args::out_arg(sz, "sz") }) else {
                return PrimitiveError::INVALID_ARGUMENT.as_return();
            };
            status(handle.ctl.tx_queue_len_into(FlowDescriptor::new(fd), out))
        })
    })
}

/// Replace the flow's flags.
///
/// # Safety
/// `ctl` must be a handle returned by `flowctl_new`.
#[no_mangle]
pub unsafe extern "C" fn flow_set_flags(ctl: FlowctlHandle, fd: c_int, flags: u32) -> c_int {
    crate::ffi_boundary(FLOWCTL_ERR_INTERNAL, || {
        error::clear_error_state();

        with_ctl(ctl, |handle| {
            status(
                handle
                    .ctl
                    .set_flags(FlowDescriptor::new(fd), FlowFlags::from_bits_retain(flags)),
            )
        })
    })
}

/// Return the flow's flags, or `-EPERM` if they cannot be read.
///
/// Every failure, including a null handle, yields `-EPERM`. The last-error
/// message still carries the underlying reason.
///
/// # Safety
/// `ctl` must be null or a handle returned by `flowctl_new`.
#[no_mangle]
pub unsafe extern "C" fn flow_get_flags(ctl: FlowctlHandle, fd: c_int) -> c_int {
    crate::ffi_boundary(FLAGS_SENTINEL, || {
        error::clear_error_state();

        let rc = with_ctl(ctl, |handle| match handle.ctl.flags(FlowDescriptor::new(fd)) {
            Ok(flags) => i32::try_from(flags.bits()).unwrap_or_else(|_| {
                error::set_error_message(format!(
                    "flags {:#o} do not fit the int return value",
                    flags.bits()
                ));
                FLAGS_SENTINEL
            }),
            Err(err) => error::map_flow_error(&err),
        });
        if rc < 0 {
            FLAGS_SENTINEL
        } else {
            rc
        }
    })
}
