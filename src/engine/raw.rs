// ── C-compatible struct definitions matching mpv/client.h ──

use std::ffi::{c_char, c_int, c_void};

/// Opaque `mpv_handle`.
#[repr(C)]
#[allow(non_camel_case_types)]
pub struct mpv_handle {
    _private: [u8; 0],
}

#[allow(non_camel_case_types)]
pub type mpv_format = c_int;
pub const MPV_FORMAT_NONE: mpv_format = 0;
pub const MPV_FORMAT_STRING: mpv_format = 1;

#[repr(C)]
#[allow(non_camel_case_types)]
pub struct mpv_event {
    pub event_id: c_int,
    pub error: c_int,
    pub reply_userdata: u64,
    pub data: *mut c_void,
}

#[repr(C)]
#[allow(non_camel_case_types)]
pub struct mpv_event_property {
    pub name: *const c_char,
    pub format: mpv_format,
    pub data: *mut c_void,
}

#[repr(C)]
#[allow(non_camel_case_types)]
pub struct mpv_event_log_message {
    pub prefix: *const c_char,
    pub level: *const c_char,
    pub text: *const c_char,
    pub log_level: c_int,
}

/// Only the leading fields; newer libmpv versions append more.
#[repr(C)]
#[allow(non_camel_case_types)]
pub struct mpv_event_end_file {
    pub reason: c_int,
    pub error: c_int,
}

#[repr(C)]
#[allow(non_camel_case_types)]
pub struct mpv_event_client_message {
    pub num_args: c_int,
    pub args: *mut *const c_char,
}

#[repr(C)]
#[allow(non_camel_case_types)]
pub struct mpv_event_hook {
    pub name: *const c_char,
    pub id: u64,
}

// ── Function signatures resolved from the shared library ──

#[allow(non_camel_case_types)]
pub type mpv_create_fn = unsafe extern "C" fn() -> *mut mpv_handle;
#[allow(non_camel_case_types)]
pub type mpv_initialize_fn = unsafe extern "C" fn(*mut mpv_handle) -> c_int;
#[allow(non_camel_case_types)]
pub type mpv_terminate_destroy_fn = unsafe extern "C" fn(*mut mpv_handle);
#[allow(non_camel_case_types)]
pub type mpv_client_name_fn = unsafe extern "C" fn(*mut mpv_handle) -> *const c_char;
#[allow(non_camel_case_types)]
pub type mpv_get_time_us_fn = unsafe extern "C" fn(*mut mpv_handle) -> i64;
#[allow(non_camel_case_types)]
pub type mpv_free_fn = unsafe extern "C" fn(*mut c_void);
#[allow(non_camel_case_types)]
pub type mpv_set_option_string_fn =
    unsafe extern "C" fn(*mut mpv_handle, *const c_char, *const c_char) -> c_int;
#[allow(non_camel_case_types)]
pub type mpv_command_fn = unsafe extern "C" fn(*mut mpv_handle, *mut *const c_char) -> c_int;
#[allow(non_camel_case_types)]
pub type mpv_command_async_fn =
    unsafe extern "C" fn(*mut mpv_handle, u64, *mut *const c_char) -> c_int;
#[allow(non_camel_case_types)]
pub type mpv_set_property_string_fn =
    unsafe extern "C" fn(*mut mpv_handle, *const c_char, *const c_char) -> c_int;
#[allow(non_camel_case_types)]
pub type mpv_get_property_fn =
    unsafe extern "C" fn(*mut mpv_handle, *const c_char, mpv_format, *mut c_void) -> c_int;
#[allow(non_camel_case_types)]
pub type mpv_observe_property_fn =
    unsafe extern "C" fn(*mut mpv_handle, u64, *const c_char, mpv_format) -> c_int;
#[allow(non_camel_case_types)]
pub type mpv_unobserve_property_fn = unsafe extern "C" fn(*mut mpv_handle, u64) -> c_int;
#[allow(non_camel_case_types)]
pub type mpv_request_log_messages_fn =
    unsafe extern "C" fn(*mut mpv_handle, *const c_char) -> c_int;
#[allow(non_camel_case_types)]
pub type mpv_request_event_fn = unsafe extern "C" fn(*mut mpv_handle, c_int, c_int) -> c_int;
#[allow(non_camel_case_types)]
pub type mpv_wait_event_fn = unsafe extern "C" fn(*mut mpv_handle, f64) -> *mut mpv_event;
#[allow(non_camel_case_types)]
pub type mpv_wakeup_fn = unsafe extern "C" fn(*mut mpv_handle);
#[allow(non_camel_case_types)]
pub type mpv_get_wakeup_pipe_fn = unsafe extern "C" fn(*mut mpv_handle) -> c_int;
