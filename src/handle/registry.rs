//! Callback registries owned by a [`Handle`](super::Handle).
//!
//! Reply callbacks are keyed by the [`ReplyId`] a request was tagged with;
//! event observers are keyed by [`EventId`] and run in registration order.

use std::collections::HashMap;

use crate::error::Result;
use crate::event::{Event, EventId, ReplyId};

/// What the event loop should do after a callback returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    #[default]
    Continue,
    /// End `each_event` cleanly.
    Stop,
}

/// A registered callback.
///
/// Implemented for every `FnMut(&Event) -> Result<Flow> + Send` closure.
pub trait EventHandler: Send {
    fn on_event(&mut self, event: &Event) -> Result<Flow>;
}

impl<F> EventHandler for F
where
    F: FnMut(&Event) -> Result<Flow> + Send,
{
    fn on_event(&mut self, event: &Event) -> Result<Flow> {
        self(event)
    }
}

pub type BoxedHandler = Box<dyn EventHandler>;

/// How long a reply registration lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Removed when its reply is dispatched (`command_async`).
    OneShot,
    /// Kept until explicitly removed (`observe_property`).
    Persistent,
}

struct ReplyEntry {
    kind: ReplyKind,
    handler: BoxedHandler,
}

#[derive(Default)]
pub struct ReplyRegistry {
    entries: HashMap<ReplyId, ReplyEntry>,
}

impl ReplyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ReplyId, kind: ReplyKind, handler: BoxedHandler) {
        debug_assert!(id != 0, "reply id 0 means \"not a reply\"");
        let previous = self.entries.insert(id, ReplyEntry { kind, handler });
        debug_assert!(previous.is_none(), "reply id {id} registered twice");
    }

    pub fn remove(&mut self, id: ReplyId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn kind(&self, id: ReplyId) -> Option<ReplyKind> {
        self.entries.get(&id).map(|e| e.kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run the callback registered for `event.reply_id`.
    ///
    /// Returns `None` when nothing is registered for that id.
    pub fn dispatch(&mut self, event: &Event) -> Option<Result<Flow>> {
        let id = event.reply_id;
        match self.entries.get(&id)?.kind {
            ReplyKind::OneShot => {
                let mut entry = self.entries.remove(&id)?;
                Some(entry.handler.on_event(event))
            }
            ReplyKind::Persistent => {
                let entry = self.entries.get_mut(&id)?;
                Some(entry.handler.on_event(event))
            }
        }
    }
}

#[derive(Default)]
pub struct EventObservers {
    observers: HashMap<EventId, Vec<BoxedHandler>>,
}

impl EventObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: EventId, handler: BoxedHandler) {
        self.observers.entry(id).or_default().push(handler);
    }

    pub fn count(&self, id: EventId) -> usize {
        self.observers.get(&id).map_or(0, Vec::len)
    }

    /// Run every observer of `event.id` in registration order.
    ///
    /// Stops early on `Flow::Stop` or an error. Returns `None` when no
    /// observer is registered.
    pub fn dispatch(&mut self, event: &Event) -> Option<Result<Flow>> {
        let observers = self.observers.get_mut(&event.id)?;
        if observers.is_empty() {
            return None;
        }
        for observer in observers.iter_mut() {
            match observer.on_event(event) {
                Ok(Flow::Continue) => {}
                other => return Some(other),
            }
        }
        Some(Ok(Flow::Continue))
    }
}
