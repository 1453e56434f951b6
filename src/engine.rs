//! The engine boundary.
//!
//! [`Engine`] is the set of libmpv client calls a [`Handle`](crate::Handle)
//! needs. Status-returning calls hand back the raw `c_int` so translation into
//! [`Error`](crate::Error) stays in one place.
//!
//! - `raw` - `#[repr(C)]` mirrors of the libmpv structs
//! - `library` - runtime loading of `libmpv.so`
//! - `libmpv` - the real engine over one `mpv_handle`

pub mod library;
pub mod libmpv;
pub mod raw;

#[cfg(test)]
pub(crate) mod mock;

use std::ffi::{CStr, c_int};

use crate::event::Event;

pub use library::MpvLibrary;
pub use libmpv::LibMpv;

/// One engine instance.
///
/// Implementations must tolerate `wakeup` being called from another thread
/// while `wait_event` blocks.
pub trait Engine: Send + Sync {
    /// `mpv_initialize`.
    fn initialize(&self) -> c_int;

    fn client_name(&self) -> String;

    /// Engine monotonic clock in microseconds.
    fn time_us(&self) -> i64;

    fn set_option_string(&self, name: &CStr, value: &CStr) -> c_int;

    fn command(&self, args: &[&CStr]) -> c_int;

    fn command_async(&self, reply_id: u64, args: &[&CStr]) -> c_int;

    fn set_property_string(&self, name: &CStr, value: &CStr) -> c_int;

    /// Read a property as a string, or the negative status on failure.
    fn get_property_string(&self, name: &CStr) -> Result<String, c_int>;

    /// Start string-formatted change notifications tagged with `reply_id`.
    fn observe_property(&self, reply_id: u64, name: &CStr) -> c_int;

    /// Returns the number of removed observations, or a negative status.
    fn unobserve_property(&self, reply_id: u64) -> c_int;

    fn request_log_messages(&self, min_level: &CStr) -> c_int;

    fn request_event(&self, event_id: c_int, enable: bool) -> c_int;

    /// Block for the next event. Negative `timeout` waits forever; expiry
    /// yields the `none` event.
    fn wait_event(&self, timeout: f64) -> Event;

    /// Interrupt a concurrent `wait_event`.
    fn wakeup(&self);

    /// Engine-owned readable descriptor, or a negative value on failure.
    fn wakeup_fd(&self) -> c_int;
}
