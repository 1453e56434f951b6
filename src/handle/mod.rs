//! The mpv handle: one engine instance plus its dispatch state.
//!
//! A [`Handle`] issues synchronous calls straight to the engine, tags
//! asynchronous calls with a fresh [`ReplyId`] so their results can be routed
//! back, and drives the event loop in [`Handle::each_event`].
//!
//! ## Dispatch order
//!
//! 1. An event with a non-zero reply id goes to the callback registered for
//!    that id, and never to generic observers. A reply nobody registered for
//!    is handed to the loop body.
//! 2. Otherwise every observer registered for the event id runs, in order.
//! 3. Otherwise the loop body sees the event.

pub mod registry;

use std::ffi::CString;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::config::Config;
use crate::engine::{Engine, LibMpv};
use crate::error::{Error, Result};
use crate::event::{Event, EventId, LogLevel, ReplyId, event_id_from_name};
use crate::wakeup::{Waker, WakeupPipe};

pub use registry::{EventHandler, EventObservers, Flow, ReplyKind, ReplyRegistry};

/// Engine slot shared with [`Waker`]s. `None` once the handle is closed.
pub(crate) type SharedEngine<E> = Arc<RwLock<Option<E>>>;

/// Options for [`Handle::each_event`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopOptions {
    /// `None` blocks indefinitely; expiry of a bounded wait ends the loop.
    pub timeout: Option<Duration>,
    /// Return [`Error::Event`] for events that carry an error condition
    /// instead of dispatching them.
    pub raise_on_error: bool,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            raise_on_error: true,
        }
    }
}

impl LoopOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn raise_on_error(mut self, raise: bool) -> Self {
        self.raise_on_error = raise;
        self
    }
}

/// Owns one engine instance and routes its events.
///
/// All registration and dispatch for a handle happens through `&mut self`,
/// so one thread drives it at a time. Use [`Handle::waker`] to interrupt a
/// blocking wait from elsewhere.
pub struct Handle<E: Engine = LibMpv> {
    engine: SharedEngine<E>,
    /// Next reply id to hand out. Starts at 1; 0 means "not a reply".
    next_reply_id: ReplyId,
    replies: ReplyRegistry,
    observers: EventObservers,
}

impl Handle<LibMpv> {
    /// Load libmpv as configured, apply pre-init options and initialize.
    pub fn open(config: &Config) -> Result<Self> {
        let engine = LibMpv::load(config.library.as_deref())?;
        let options = config
            .options
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()));
        let handle = Self::create_with_options(engine, options)?;
        if let Some(level) = config.log_level {
            handle.request_log_messages(level)?;
        }
        Ok(handle)
    }
}

impl<E: Engine> Handle<E> {
    /// Initialize `engine` and take ownership of it.
    ///
    /// On failure the engine is dropped, which releases it.
    pub fn create(engine: E) -> Result<Self> {
        Self::create_with_options(engine, std::iter::empty::<(&str, &str)>())
    }

    /// Apply `options` in order before initializing. Many engine options
    /// only take effect when set before initialization.
    pub fn create_with_options<I, K, V>(engine: E, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in options {
            let (name, value) = (name.as_ref(), value.as_ref());
            let status = engine.set_option_string(
                &option_name(name)?,
                &c_string("value", value)?,
            );
            if status < 0 {
                log::error!("mpv: option {}={} rejected ({})", name, value, status);
                return Err(Error::option(name, status));
            }
        }

        let status = engine.initialize();
        if status < 0 {
            log::error!("mpv: initialize failed ({})", status);
            return Err(Error::initialization(status));
        }
        log::debug!("mpv: initialized client '{}'", engine.client_name());

        Ok(Self {
            engine: Arc::new(RwLock::new(Some(engine))),
            next_reply_id: 1,
            replies: ReplyRegistry::new(),
            observers: EventObservers::new(),
        })
    }

    /// Release the engine instance. Safe to call more than once; every other
    /// operation fails with [`Error::UseAfterClose`] afterwards.
    pub fn close(&mut self) {
        let engine = self.engine.write().take();
        if let Some(engine) = engine {
            drop(engine);
            if !self.replies.is_empty() {
                log::debug!("mpv: discarding {} pending replies", self.replies.len());
            }
            self.replies = ReplyRegistry::new();
            self.observers = EventObservers::new();
            log::debug!("mpv: handle closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.engine.read().is_none()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::UseAfterClose);
        }
        Ok(())
    }

    fn with_engine<R>(&self, f: impl FnOnce(&E) -> R) -> Result<R> {
        let guard = self.engine.read();
        let engine = guard.as_ref().ok_or(Error::UseAfterClose)?;
        Ok(f(engine))
    }

    // ----- Synchronous operations -----

    pub fn client_name(&self) -> Result<String> {
        self.with_engine(|e| e.client_name())
    }

    /// Engine monotonic time in microseconds.
    pub fn time_us(&self) -> Result<i64> {
        self.with_engine(|e| e.time_us())
    }

    pub fn set_option(&self, name: &str, value: impl Display) -> Result<()> {
        let c_name = option_name(name)?;
        let c_value = c_string("value", &value.to_string())?;
        let status = self.with_engine(|e| e.set_option_string(&c_name, &c_value))?;
        if status < 0 {
            return Err(Error::option(name, status));
        }
        Ok(())
    }

    /// Run a command and wait for the engine to accept it.
    pub fn command<S: AsRef<str>>(&self, args: &[S]) -> Result<()> {
        let c_args = command_args(args)?;
        let refs: Vec<&std::ffi::CStr> = c_args.iter().map(|a| a.as_c_str()).collect();
        let status = self.with_engine(|e| e.command(&refs))?;
        if status < 0 {
            log::debug!("mpv: command {:?} failed ({})", first_arg(args), status);
            return Err(Error::command(status));
        }
        Ok(())
    }

    pub fn set_property(&self, name: &str, value: impl Display) -> Result<()> {
        let c_name = c_string("name", name)?;
        let c_value = c_string("value", &value.to_string())?;
        let status = self.with_engine(|e| e.set_property_string(&c_name, &c_value))?;
        if status < 0 {
            return Err(Error::property(name, status));
        }
        Ok(())
    }

    pub fn get_property(&self, name: &str) -> Result<String> {
        let c_name = c_string("name", name)?;
        self.with_engine(|e| e.get_property_string(&c_name))?
            .map_err(|status| Error::property(name, status))
    }

    /// Ask the engine to emit `log-message` events at `level` and above.
    pub fn request_log_messages(&self, level: LogLevel) -> Result<()> {
        let c_level = c_string("level", level.as_str())?;
        let status = self.with_engine(|e| e.request_log_messages(&c_level))?;
        if status < 0 {
            return Err(Error::operation("request_log_messages", status));
        }
        Ok(())
    }

    /// Enable or disable delivery of an event type.
    pub fn request_event(&self, id: EventId, enable: bool) -> Result<()> {
        let status = self.with_engine(|e| e.request_event(id.raw(), enable))?;
        if status < 0 {
            return Err(Error::operation("request_event", status));
        }
        Ok(())
    }

    // ----- Asynchronous correlation -----

    fn allocate_reply_id(&mut self) -> ReplyId {
        let id = self.next_reply_id;
        self.next_reply_id += 1;
        id
    }

    /// Run a command without waiting; `callback` receives its
    /// `command-reply` event once.
    ///
    /// If the engine rejects the request outright the callback is dropped
    /// unused.
    pub fn command_async<S, F>(&mut self, args: &[S], callback: F) -> Result<ReplyId>
    where
        S: AsRef<str>,
        F: FnMut(&Event) -> Result<Flow> + Send + 'static,
    {
        let c_args = command_args(args)?;
        let refs: Vec<&std::ffi::CStr> = c_args.iter().map(|a| a.as_c_str()).collect();
        self.ensure_open()?;

        let reply_id = self.allocate_reply_id();
        self.replies
            .insert(reply_id, ReplyKind::OneShot, Box::new(callback));

        let status = self.with_engine(|e| e.command_async(reply_id, &refs))?;
        if status < 0 {
            self.replies.remove(reply_id);
            log::debug!(
                "mpv: async command {:?} rejected ({})",
                first_arg(args),
                status
            );
            return Err(Error::command(status));
        }
        log::trace!("mpv: async command {:?} -> reply {}", first_arg(args), reply_id);
        Ok(reply_id)
    }

    /// Observe a property as a string; `callback` runs on every change until
    /// [`unobserve_property`](Self::unobserve_property) is called with the
    /// returned id.
    pub fn observe_property<F>(&mut self, name: &str, callback: F) -> Result<ReplyId>
    where
        F: FnMut(&Event) -> Result<Flow> + Send + 'static,
    {
        let c_name = c_string("name", name)?;
        self.ensure_open()?;

        let reply_id = self.allocate_reply_id();
        self.replies
            .insert(reply_id, ReplyKind::Persistent, Box::new(callback));

        let status = self.with_engine(|e| e.observe_property(reply_id, &c_name))?;
        if status < 0 {
            self.replies.remove(reply_id);
            return Err(Error::property(name, status));
        }
        log::debug!("mpv: observing '{}' as reply {}", name, reply_id);
        Ok(reply_id)
    }

    /// Stop an observation started by `observe_property`. Returns how many
    /// observations the engine removed.
    pub fn unobserve_property(&mut self, reply_id: ReplyId) -> Result<usize> {
        let status = self.with_engine(|e| e.unobserve_property(reply_id))?;
        if status < 0 {
            return Err(Error::operation("unobserve_property", status));
        }
        self.replies.remove(reply_id);
        Ok(status as usize)
    }

    /// Number of reply callbacks still registered.
    pub fn pending_replies(&self) -> usize {
        self.replies.len()
    }

    // ----- Generic event observation -----

    /// Run `callback` for every event named `name` (e.g. `"end-file"`).
    pub fn register_event<F>(&mut self, name: &str, callback: F) -> Result<()>
    where
        F: FnMut(&Event) -> Result<Flow> + Send + 'static,
    {
        let id = event_id_from_name(name).ok_or_else(|| Error::UnknownEvent(name.to_string()))?;
        self.register_event_id(id, callback);
        Ok(())
    }

    pub fn register_event_id<F>(&mut self, id: EventId, callback: F)
    where
        F: FnMut(&Event) -> Result<Flow> + Send + 'static,
    {
        self.observers.register(id, Box::new(callback));
    }

    pub fn observer_count(&self, id: EventId) -> usize {
        self.observers.count(id)
    }

    // ----- Event loop -----

    /// Block for the next event. `None` waits indefinitely; an expired
    /// bounded wait returns the `none` event.
    pub fn wait_event(&self, timeout: Option<Duration>) -> Result<Event> {
        let secs = timeout.map_or(-1.0, |d| d.as_secs_f64());
        self.with_engine(|e| e.wait_event(secs))
    }

    /// Route one event to its reply callback, its observers, or `body`.
    pub fn dispatch<F>(&mut self, event: &Event, body: &mut F) -> Result<Flow>
    where
        F: FnMut(&Event) -> Result<Flow>,
    {
        if event.is_reply() {
            if let Some(result) = self.replies.dispatch(event) {
                return result;
            }
            log::warn!(
                "mpv: no callback for reply {} ({})",
                event.reply_id,
                event.id
            );
            return body(event);
        }
        if let Some(result) = self.observers.dispatch(event) {
            return result;
        }
        body(event)
    }

    /// Wait for and dispatch events until a callback returns
    /// [`Flow::Stop`], a bounded wait expires, or an error occurs.
    ///
    /// `body` receives every event no registered callback claimed.
    pub fn each_event<F>(&mut self, options: LoopOptions, mut body: F) -> Result<()>
    where
        F: FnMut(&Event) -> Result<Flow>,
    {
        loop {
            let event = self.wait_event(options.timeout)?;
            log::trace!(
                "mpv: event {} reply={} error={:?}",
                event.id,
                event.reply_id,
                event.error
            );

            if options.raise_on_error
                && let Some(code) = event.error
            {
                log::debug!("mpv: event {} carried {}", event.id, code);
                // No second reply follows a failed one.
                if event.is_reply()
                    && self.replies.kind(event.reply_id) == Some(ReplyKind::OneShot)
                {
                    self.replies.remove(event.reply_id);
                }
                return Err(Error::Event {
                    event: event.id,
                    reply_id: event.reply_id,
                    code,
                });
            }
            if event.is_none() {
                return Ok(());
            }

            match self.dispatch(&event, &mut body) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => {
                    log::debug!("mpv: event loop stopped at {}", event.id);
                    return Ok(());
                }
                Err(e) => {
                    log::debug!("mpv: event loop aborted at {}: {}", event.id, e);
                    return Err(e);
                }
            }
        }
    }

    // ----- Wakeup -----

    /// A cross-thread handle that interrupts a blocking wait.
    pub fn waker(&self) -> Waker<E> {
        Waker::new(self.engine.clone())
    }

    /// The engine's wakeup descriptor, readable when events are pending.
    ///
    /// The descriptor belongs to the engine and is invalid after `close`.
    pub fn wakeup_pipe(&self) -> Result<WakeupPipe> {
        let fd = self.with_engine(|e| e.wakeup_fd())?;
        if fd < 0 {
            return Err(Error::Io(std::io::Error::other(
                "engine did not provide a wakeup pipe",
            )));
        }
        Ok(WakeupPipe::new(fd))
    }
}

impl<E: Engine> Drop for Handle<E> {
    fn drop(&mut self) {
        self.close();
    }
}

fn c_string(field: &str, value: &str) -> Result<CString> {
    CString::new(value).map_err(|_| Error::invalid_argument(field, "contains a NUL byte"))
}

fn option_name(name: &str) -> Result<CString> {
    if name.is_empty() {
        return Err(Error::invalid_argument("name", "option name is empty"));
    }
    c_string("name", name)
}

fn command_args<S: AsRef<str>>(args: &[S]) -> Result<Vec<CString>> {
    if args.is_empty() {
        return Err(Error::invalid_argument("args", "command is empty"));
    }
    args.iter().map(|a| c_string("args", a.as_ref())).collect()
}

fn first_arg<S: AsRef<str>>(args: &[S]) -> &str {
    args.first().map(|a| a.as_ref()).unwrap_or("")
}
