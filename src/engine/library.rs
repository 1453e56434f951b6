//! Runtime loading of libmpv.
//!
//! The library is opened with `dlopen` and every client function the crate
//! uses is resolved up front, so a missing symbol is reported once at load
//! time instead of on first use.

use std::ffi::{CString, c_void};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::raw::*;
use crate::error::{Error, Result};

/// Sonames tried, in order, when no explicit path is configured.
pub const DEFAULT_SONAMES: &[&str] = &["libmpv.so.2", "libmpv.so.1", "libmpv.so"];

/// A loaded libmpv (keeps the dlopen handle alive).
pub struct MpvLibrary {
    /// dlopen handle. Never closed: libmpv spawns threads that may outlive
    /// every `mpv_handle` created from it.
    _handle: *mut c_void,
    path: PathBuf,

    pub(crate) create: mpv_create_fn,
    pub(crate) initialize: mpv_initialize_fn,
    pub(crate) terminate_destroy: mpv_terminate_destroy_fn,
    pub(crate) client_name: mpv_client_name_fn,
    pub(crate) get_time_us: mpv_get_time_us_fn,
    pub(crate) free: mpv_free_fn,
    pub(crate) set_option_string: mpv_set_option_string_fn,
    pub(crate) command: mpv_command_fn,
    pub(crate) command_async: mpv_command_async_fn,
    pub(crate) set_property_string: mpv_set_property_string_fn,
    pub(crate) get_property: mpv_get_property_fn,
    pub(crate) observe_property: mpv_observe_property_fn,
    pub(crate) unobserve_property: mpv_unobserve_property_fn,
    pub(crate) request_log_messages: mpv_request_log_messages_fn,
    pub(crate) request_event: mpv_request_event_fn,
    pub(crate) wait_event: mpv_wait_event_fn,
    pub(crate) wakeup: mpv_wakeup_fn,
    pub(crate) get_wakeup_pipe: mpv_get_wakeup_pipe_fn,
}

// SAFETY: the handle and function pointers are immutable after load and the
// libmpv client API is callable from any thread.
unsafe impl Send for MpvLibrary {}
unsafe impl Sync for MpvLibrary {}

impl MpvLibrary {
    /// Load libmpv from `path`, or from the first default soname that opens.
    pub fn load(path: Option<&Path>) -> Result<Arc<Self>> {
        match path {
            Some(p) => Self::open(p).map(Arc::new),
            None => {
                let mut last_err = None;
                for soname in DEFAULT_SONAMES {
                    match Self::open(Path::new(soname)) {
                        Ok(lib) => return Ok(Arc::new(lib)),
                        Err(e) => {
                            log::debug!("libmpv: {}", e);
                            last_err = Some(e);
                        }
                    }
                }
                Err(last_err.unwrap_or_else(|| Error::Library {
                    path: PathBuf::new(),
                    reason: "no candidate sonames".to_string(),
                }))
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(path: &Path) -> Result<Self> {
        let path_str = path.to_string_lossy();
        let c_path = CString::new(path_str.as_bytes()).map_err(|_| Error::Library {
            path: path.to_path_buf(),
            reason: "path contains a NUL byte".to_string(),
        })?;

        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        if handle.is_null() {
            return Err(Error::Library {
                path: path.to_path_buf(),
                reason: dlerror_string(),
            });
        }

        match unsafe { Self::resolve(handle, path) } {
            Ok(lib) => {
                log::debug!("libmpv: loaded {}", path_str);
                Ok(lib)
            }
            Err(e) => {
                unsafe { libc::dlclose(handle) };
                Err(e)
            }
        }
    }

    /// # Safety
    /// `handle` must be a live dlopen handle.
    unsafe fn resolve(handle: *mut c_void, path: &Path) -> Result<Self> {
        macro_rules! sym {
            ($name:literal) => {{
                let ptr = unsafe { libc::dlsym(handle, concat!($name, "\0").as_ptr().cast()) };
                if ptr.is_null() {
                    return Err(Error::Library {
                        path: path.to_path_buf(),
                        reason: format!("missing symbol {}", $name),
                    });
                }
                unsafe { std::mem::transmute(ptr) }
            }};
        }

        Ok(Self {
            _handle: handle,
            path: path.to_path_buf(),
            create: sym!("mpv_create"),
            initialize: sym!("mpv_initialize"),
            terminate_destroy: sym!("mpv_terminate_destroy"),
            client_name: sym!("mpv_client_name"),
            get_time_us: sym!("mpv_get_time_us"),
            free: sym!("mpv_free"),
            set_option_string: sym!("mpv_set_option_string"),
            command: sym!("mpv_command"),
            command_async: sym!("mpv_command_async"),
            set_property_string: sym!("mpv_set_property_string"),
            get_property: sym!("mpv_get_property"),
            observe_property: sym!("mpv_observe_property"),
            unobserve_property: sym!("mpv_unobserve_property"),
            request_log_messages: sym!("mpv_request_log_messages"),
            request_event: sym!("mpv_request_event"),
            wait_event: sym!("mpv_wait_event"),
            wakeup: sym!("mpv_wakeup"),
            get_wakeup_pipe: sym!("mpv_get_wakeup_pipe"),
        })
    }
}

fn dlerror_string() -> String {
    let err = unsafe { libc::dlerror() };
    if err.is_null() {
        "unknown dlopen error".to_string()
    } else {
        unsafe { std::ffi::CStr::from_ptr(err) }
            .to_string_lossy()
            .into_owned()
    }
}
