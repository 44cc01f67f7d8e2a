use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::{c_char, c_int};

use flowctl::primitive::PrimitiveError;
use flowctl::FlowError;

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::default());
}

pub(crate) fn clear_error_state() {
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::default();
    });
}

pub(crate) fn set_error_message(message: impl Into<String>) {
    let message = message.into();
    let sanitized = message.replace('\0', "?");
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::new(sanitized).unwrap_or_default();
    });
}

pub(crate) fn set_invalid_argument(message: impl Into<String>) -> c_int {
    set_error_message(message);
    PrimitiveError::INVALID_ARGUMENT.as_return()
}

pub(crate) fn set_panic_error() {
    set_error_message("panic across FFI boundary");
}

/// Record the error text and return the primitive's errno as `-errno`.
pub(crate) fn map_flow_error(err: &FlowError) -> c_int {
    set_error_message(err.to_string());
    err.primitive_error().as_return()
}

pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|state| state.borrow().as_ptr())
}
