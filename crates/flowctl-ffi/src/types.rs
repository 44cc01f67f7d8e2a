use std::ffi::c_void;

use flowctl::primitive::RawPrimitive;
use flowctl::FlowControl;

pub use flowctl::primitive::RawControlFn as FlowctlControlFn;

pub type FlowctlHandle = *mut c_void;

/// C view of `qosspec_t`.
pub type FlowctlQosSpec = flowctl::QosSpec;

pub(crate) struct ControlHandle {
    pub(crate) ctl: FlowControl<RawPrimitive>,
}
