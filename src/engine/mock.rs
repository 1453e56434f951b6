//! Scripted in-memory engine for tests.

use std::collections::{HashMap, VecDeque};
use std::ffi::{CStr, c_int};
use std::sync::Arc;

use parking_lot::Mutex;

use super::Engine;
use crate::event::Event;

/// Record of a call that reached the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Initialize,
    SetOption(String, String),
    Command(Vec<String>),
    CommandAsync(u64, Vec<String>),
    SetProperty(String, String),
    GetProperty(String),
    Observe(u64, String),
    Unobserve(u64),
    RequestLog(String),
    RequestEvent(c_int, bool),
    Wait(f64),
    Wakeup,
    Destroy,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    events: VecDeque<Event>,
    /// Status returned by calls whose key matches (command name, option name
    /// or property name). Unlisted keys succeed.
    statuses: HashMap<String, c_int>,
    properties: HashMap<String, String>,
    init_status: c_int,
    wakeup_fd: c_int,
}

/// The engine instance handed to a `Handle`. Tests keep a [`script`]
/// companion to queue events and inspect calls after the move.
///
/// [`script`]: ScriptedEngine::script
pub struct ScriptedEngine {
    state: Arc<Mutex<State>>,
    instance: bool,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        let state = State {
            wakeup_fd: -1,
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            instance: true,
        }
    }

    /// A controller sharing this engine's state. Dropping it does not count
    /// as destroying the instance.
    pub fn script(&self) -> ScriptedEngine {
        Self {
            state: self.state.clone(),
            instance: false,
        }
    }

    pub fn fail_init(&self, status: c_int) {
        self.state.lock().init_status = status;
    }

    pub fn fail(&self, key: &str, status: c_int) {
        self.state.lock().statuses.insert(key.to_string(), status);
    }

    pub fn set_wakeup_fd(&self, fd: c_int) {
        self.state.lock().wakeup_fd = fd;
    }

    pub fn push_event(&self, event: Event) {
        self.state.lock().events.push_back(event);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Calls other than event waits.
    pub fn engine_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Wait(_)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.lock().calls.push(call);
    }

    fn status_for(&self, key: &str) -> c_int {
        self.state.lock().statuses.get(key).copied().unwrap_or(0)
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        if self.instance {
            self.state.lock().calls.push(Call::Destroy);
        }
    }
}

fn owned(s: &CStr) -> String {
    s.to_string_lossy().into_owned()
}

fn owned_args(args: &[&CStr]) -> Vec<String> {
    args.iter().map(|a| owned(a)).collect()
}

impl Engine for ScriptedEngine {
    fn initialize(&self) -> c_int {
        self.record(Call::Initialize);
        self.state.lock().init_status
    }

    fn client_name(&self) -> String {
        "main".to_string()
    }

    fn time_us(&self) -> i64 {
        self.state.lock().calls.len() as i64
    }

    fn set_option_string(&self, name: &CStr, value: &CStr) -> c_int {
        self.record(Call::SetOption(owned(name), owned(value)));
        self.status_for(&owned(name))
    }

    fn command(&self, args: &[&CStr]) -> c_int {
        let args = owned_args(args);
        let status = args.first().map(|a| self.status_for(a)).unwrap_or(0);
        self.record(Call::Command(args));
        status
    }

    fn command_async(&self, reply_id: u64, args: &[&CStr]) -> c_int {
        let args = owned_args(args);
        let status = args.first().map(|a| self.status_for(a)).unwrap_or(0);
        self.record(Call::CommandAsync(reply_id, args));
        status
    }

    fn set_property_string(&self, name: &CStr, value: &CStr) -> c_int {
        self.record(Call::SetProperty(owned(name), owned(value)));
        let status = self.status_for(&owned(name));
        if status >= 0 {
            self.state
                .lock()
                .properties
                .insert(owned(name), owned(value));
        }
        status
    }

    fn get_property_string(&self, name: &CStr) -> Result<String, c_int> {
        self.record(Call::GetProperty(owned(name)));
        let status = self.status_for(&owned(name));
        if status < 0 {
            return Err(status);
        }
        self.state
            .lock()
            .properties
            .get(&owned(name))
            .cloned()
            .ok_or(-8)
    }

    fn observe_property(&self, reply_id: u64, name: &CStr) -> c_int {
        self.record(Call::Observe(reply_id, owned(name)));
        self.status_for(&owned(name))
    }

    fn unobserve_property(&self, reply_id: u64) -> c_int {
        self.record(Call::Unobserve(reply_id));
        1
    }

    fn request_log_messages(&self, min_level: &CStr) -> c_int {
        self.record(Call::RequestLog(owned(min_level)));
        self.status_for("request_log_messages")
    }

    fn request_event(&self, event_id: c_int, enable: bool) -> c_int {
        self.record(Call::RequestEvent(event_id, enable));
        0
    }

    fn wait_event(&self, timeout: f64) -> Event {
        let mut state = self.state.lock();
        state.calls.push(Call::Wait(timeout));
        state.events.pop_front().unwrap_or_else(Event::none)
    }

    fn wakeup(&self) {
        self.record(Call::Wakeup);
    }

    fn wakeup_fd(&self) -> c_int {
        self.state.lock().wakeup_fd
    }
}
