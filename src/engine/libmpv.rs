//! The real engine: one `mpv_handle` driven through [`MpvLibrary`].

use std::ffi::{CStr, c_char, c_int, c_void};
use std::path::Path;
use std::ptr;
use std::sync::Arc;

use super::Engine;
use super::library::MpvLibrary;
use super::raw::*;
use crate::error::{Error, ErrorCode, Result};
use crate::event::{
    EndFile, EndFileReason, Event, EventId, EventPayload, LogLevel, LogMessage, PropertyChange,
};

/// A created (not yet initialized) libmpv instance.
///
/// Dropping it calls `mpv_terminate_destroy`, so each instance is released
/// exactly once.
pub struct LibMpv {
    lib: Arc<MpvLibrary>,
    ctx: *mut mpv_handle,
}

// SAFETY: libmpv's client API is thread-safe for a single handle, except for
// concurrent `mpv_wait_event` calls, which `Handle` rules out.
unsafe impl Send for LibMpv {}
unsafe impl Sync for LibMpv {}

impl LibMpv {
    /// `mpv_create` against an already loaded library.
    pub fn new(lib: Arc<MpvLibrary>) -> Result<Self> {
        let ctx = unsafe { (lib.create)() };
        if ctx.is_null() {
            return Err(Error::initialization(ErrorCode::NoMem.status()));
        }
        log::debug!("mpv: created instance from {}", lib.path().display());
        Ok(Self { lib, ctx })
    }

    /// Load libmpv (from `path` or the default sonames) and create an instance.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::new(MpvLibrary::load(path)?)
    }

    fn with_argv<R>(args: &[&CStr], f: impl FnOnce(*mut *const c_char) -> R) -> R {
        let mut argv: Vec<*const c_char> = args.iter().map(|a| a.as_ptr()).collect();
        argv.push(ptr::null());
        f(argv.as_mut_ptr())
    }
}

impl Drop for LibMpv {
    fn drop(&mut self) {
        if !self.ctx.is_null() {
            log::debug!("mpv: terminating instance");
            unsafe { (self.lib.terminate_destroy)(self.ctx) };
            self.ctx = ptr::null_mut();
        }
    }
}

impl Engine for LibMpv {
    fn initialize(&self) -> c_int {
        unsafe { (self.lib.initialize)(self.ctx) }
    }

    fn client_name(&self) -> String {
        unsafe { cstr_to_string((self.lib.client_name)(self.ctx)) }
    }

    fn time_us(&self) -> i64 {
        unsafe { (self.lib.get_time_us)(self.ctx) }
    }

    fn set_option_string(&self, name: &CStr, value: &CStr) -> c_int {
        unsafe { (self.lib.set_option_string)(self.ctx, name.as_ptr(), value.as_ptr()) }
    }

    fn command(&self, args: &[&CStr]) -> c_int {
        Self::with_argv(args, |argv| unsafe { (self.lib.command)(self.ctx, argv) })
    }

    fn command_async(&self, reply_id: u64, args: &[&CStr]) -> c_int {
        Self::with_argv(args, |argv| unsafe {
            (self.lib.command_async)(self.ctx, reply_id, argv)
        })
    }

    fn set_property_string(&self, name: &CStr, value: &CStr) -> c_int {
        unsafe { (self.lib.set_property_string)(self.ctx, name.as_ptr(), value.as_ptr()) }
    }

    fn get_property_string(&self, name: &CStr) -> std::result::Result<String, c_int> {
        let mut out: *mut c_char = ptr::null_mut();
        let status = unsafe {
            (self.lib.get_property)(
                self.ctx,
                name.as_ptr(),
                MPV_FORMAT_STRING,
                &mut out as *mut *mut c_char as *mut c_void,
            )
        };
        if status < 0 {
            return Err(status);
        }
        let value = unsafe { cstr_to_string(out) };
        if !out.is_null() {
            unsafe { (self.lib.free)(out as *mut c_void) };
        }
        Ok(value)
    }

    fn observe_property(&self, reply_id: u64, name: &CStr) -> c_int {
        unsafe { (self.lib.observe_property)(self.ctx, reply_id, name.as_ptr(), MPV_FORMAT_STRING) }
    }

    fn unobserve_property(&self, reply_id: u64) -> c_int {
        unsafe { (self.lib.unobserve_property)(self.ctx, reply_id) }
    }

    fn request_log_messages(&self, min_level: &CStr) -> c_int {
        unsafe { (self.lib.request_log_messages)(self.ctx, min_level.as_ptr()) }
    }

    fn request_event(&self, event_id: c_int, enable: bool) -> c_int {
        unsafe { (self.lib.request_event)(self.ctx, event_id, enable as c_int) }
    }

    fn wait_event(&self, timeout: f64) -> Event {
        let raw = unsafe { (self.lib.wait_event)(self.ctx, timeout) };
        if raw.is_null() {
            return Event::none();
        }
        // The event stays valid until the next wait_event on this handle.
        unsafe { decode_event(&*raw) }
    }

    fn wakeup(&self) {
        unsafe { (self.lib.wakeup)(self.ctx) }
    }

    fn wakeup_fd(&self) -> c_int {
        unsafe { (self.lib.get_wakeup_pipe)(self.ctx) }
    }
}

/// Copy a raw `mpv_event` into an owned [`Event`].
///
/// # Safety
/// `raw.data` must point to the struct libmpv documents for `raw.event_id`.
unsafe fn decode_event(raw: &mpv_event) -> Event {
    let id = EventId::from_raw(raw.event_id);
    let payload = if raw.data.is_null() {
        EventPayload::Empty
    } else {
        unsafe { decode_payload(id, raw.data) }
    };
    Event::new(id)
        .with_reply_id(raw.reply_userdata)
        .with_status(raw.error)
        .with_payload(payload)
}

unsafe fn decode_payload(id: EventId, data: *mut c_void) -> EventPayload {
    unsafe {
        match id {
            EventId::PropertyChange | EventId::GetPropertyReply => {
                let prop = &*(data as *const mpv_event_property);
                let value = if prop.format == MPV_FORMAT_STRING && !prop.data.is_null() {
                    let s = *(prop.data as *const *const c_char);
                    (!s.is_null()).then(|| cstr_to_string(s))
                } else {
                    None
                };
                EventPayload::Property(PropertyChange {
                    name: cstr_to_string(prop.name),
                    value,
                })
            }
            EventId::LogMessage => {
                let msg = &*(data as *const mpv_event_log_message);
                EventPayload::LogMessage(LogMessage {
                    prefix: cstr_to_string(msg.prefix),
                    level: LogLevel::from_raw(msg.log_level),
                    text: cstr_to_string(msg.text).trim_end_matches('\n').to_string(),
                })
            }
            EventId::EndFile => {
                let end = &*(data as *const mpv_event_end_file);
                EventPayload::EndFile(EndFile {
                    reason: EndFileReason::from_raw(end.reason),
                    error: (end.error < 0).then(|| ErrorCode::from_status(end.error)),
                })
            }
            EventId::ClientMessage => {
                let msg = &*(data as *const mpv_event_client_message);
                let count = usize::try_from(msg.num_args).unwrap_or(0);
                let args = if msg.args.is_null() {
                    Vec::new()
                } else {
                    std::slice::from_raw_parts(msg.args, count)
                        .iter()
                        .map(|&a| cstr_to_string(a))
                        .collect()
                };
                EventPayload::ClientMessage(args)
            }
            EventId::Hook => {
                let hook = &*(data as *const mpv_event_hook);
                EventPayload::Hook {
                    name: cstr_to_string(hook.name),
                    id: hook.id,
                }
            }
            _ => EventPayload::Empty,
        }
    }
}

unsafe fn cstr_to_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn test_decode_property_change() {
        let name = CString::new("pause").unwrap();
        let value = CString::new("yes").unwrap();
        let mut value_ptr: *const c_char = value.as_ptr();
        let mut prop = mpv_event_property {
            name: name.as_ptr(),
            format: MPV_FORMAT_STRING,
            data: &mut value_ptr as *mut *const c_char as *mut c_void,
        };
        let raw = mpv_event {
            event_id: 22,
            error: 0,
            reply_userdata: 3,
            data: &mut prop as *mut mpv_event_property as *mut c_void,
        };

        let ev = unsafe { decode_event(&raw) };
        assert_eq!(ev.id, EventId::PropertyChange);
        assert_eq!(ev.reply_id, 3);
        assert_eq!(ev.error, None);
        assert_eq!(
            ev.property(),
            Some(&PropertyChange {
                name: "pause".into(),
                value: Some("yes".into()),
            })
        );
    }

    #[test]
    fn test_decode_unavailable_property() {
        let name = CString::new("duration").unwrap();
        let mut prop = mpv_event_property {
            name: name.as_ptr(),
            format: MPV_FORMAT_NONE,
            data: ptr::null_mut(),
        };
        let raw = mpv_event {
            event_id: 22,
            error: 0,
            reply_userdata: 9,
            data: &mut prop as *mut mpv_event_property as *mut c_void,
        };
        let ev = unsafe { decode_event(&raw) };
        assert_eq!(ev.property().and_then(|p| p.value.clone()), None);
    }

    #[test]
    fn test_decode_log_message_strips_newline() {
        let prefix = CString::new("cplayer").unwrap();
        let level = CString::new("warn").unwrap();
        let text = CString::new("audio device lost\n").unwrap();
        let mut msg = mpv_event_log_message {
            prefix: prefix.as_ptr(),
            level: level.as_ptr(),
            text: text.as_ptr(),
            log_level: 30,
        };
        let raw = mpv_event {
            event_id: 2,
            error: 0,
            reply_userdata: 0,
            data: &mut msg as *mut mpv_event_log_message as *mut c_void,
        };
        let ev = unsafe { decode_event(&raw) };
        assert_eq!(
            ev.log_message(),
            Some(&LogMessage {
                prefix: "cplayer".into(),
                level: LogLevel::Warn,
                text: "audio device lost".into(),
            })
        );
    }

    #[test]
    fn test_decode_command_reply_error() {
        let raw = mpv_event {
            event_id: 5,
            error: -12,
            reply_userdata: 4,
            data: ptr::null_mut(),
        };
        let ev = unsafe { decode_event(&raw) };
        assert_eq!(ev.id, EventId::CommandReply);
        assert_eq!(ev.error, Some(ErrorCode::Command));
        assert_eq!(ev.payload, EventPayload::Empty);
    }

    #[test]
    fn test_decode_end_file_and_client_message() {
        let mut end = mpv_event_end_file {
            reason: 4,
            error: -13,
        };
        let raw = mpv_event {
            event_id: 7,
            error: 0,
            reply_userdata: 0,
            data: &mut end as *mut mpv_event_end_file as *mut c_void,
        };
        let ev = unsafe { decode_event(&raw) };
        assert_eq!(
            ev.payload,
            EventPayload::EndFile(EndFile {
                reason: EndFileReason::Error,
                error: Some(ErrorCode::LoadingFailed),
            })
        );

        let a = CString::new("osd").unwrap();
        let b = CString::new("hello").unwrap();
        let mut args = [a.as_ptr(), b.as_ptr()];
        let mut msg = mpv_event_client_message {
            num_args: 2,
            args: args.as_mut_ptr(),
        };
        let raw = mpv_event {
            event_id: 16,
            error: 0,
            reply_userdata: 0,
            data: &mut msg as *mut mpv_event_client_message as *mut c_void,
        };
        let ev = unsafe { decode_event(&raw) };
        assert_eq!(
            ev.payload,
            EventPayload::ClientMessage(vec!["osd".into(), "hello".into()])
        );
    }
}
