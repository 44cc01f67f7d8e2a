//! flowctl-ffi: C-ABI exports for the flow control facade.
//!
//! The control primitive is injected as a C function pointer when the
//! handle is created. Every export returns 0 on success and `-errno` on
//! failure, except `flow_get_flags`, which returns the flags or `-EPERM`.

mod args;
mod error;
mod flow;
mod types;

use std::os::raw::{c_char, c_int};
use std::panic::AssertUnwindSafe;

use flowctl::primitive::RawPrimitive;
use flowctl::FlowControl;

use crate::types::ControlHandle;

pub use flow::{
    flow_get_flags, flow_get_qos, flow_get_rcv_timeout, flow_get_rx_qlen, flow_get_snd_timeout,
    flow_get_tx_qlen, flow_set_flags, flow_set_rcv_timeout, flow_set_snd_timeout,
};
pub use types::{FlowctlControlFn, FlowctlHandle, FlowctlQosSpec};

/// Returned when a panic is caught at the boundary.
pub const FLOWCTL_ERR_INTERNAL: c_int = -libc::EIO;

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

fn with_ctl(handle: FlowctlHandle, f: impl FnOnce(&ControlHandle) -> c_int) -> c_int {
    if handle.is_null() {
        return error::set_invalid_argument("flowctl handle cannot be null");
    }

    let ctl_handle = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &*(handle as *const ControlHandle) }
    };

    f(ctl_handle)
}

/// Create a control handle over a C control function.
///
/// Returns null if `control` is null.
///
/// # Safety
/// `control` must honour the argument contract of `RawPrimitive::new`.
#[no_mangle]
pub unsafe extern "C" fn flowctl_new(control: Option<FlowctlControlFn>) -> FlowctlHandle {
    ffi_boundary(std::ptr::null_mut(), || {
        error::clear_error_state();

        let Some(control) = control else {
            let _ = error::set_invalid_argument("control function cannot be null");
            return std::ptr::null_mut();
        };

        // SAFETY: The caller accepted the contract for `control`.
        let primitive = unsafe { RawPrimitive::new(control) };
        let handle = ControlHandle {
            ctl: FlowControl::new(primitive),
        };
        Box::into_raw(Box::new(handle)) as FlowctlHandle
    })
}

/// Free a control handle.
///
/// # Safety
/// `ctl` must be null or a handle returned by `flowctl_new`.
#[no_mangle]
pub unsafe extern "C" fn flowctl_free(ctl: FlowctlHandle) {
    ffi_boundary((), || {
        if ctl.is_null() {
            return;
        }

        // SAFETY: Caller guarantees this handle was allocated by flowctl_new.
        unsafe {
            drop(Box::from_raw(ctl as *mut ControlHandle));
        }
    });
}

/// Message for the last failed call on this thread, or an empty string.
#[no_mangle]
pub extern "C" fn flowctl_last_error() -> *const c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}
