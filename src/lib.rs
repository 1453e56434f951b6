//! # mpvctl
//!
//! Command and event-dispatch layer over the libmpv client API.
//!
//! A [`Handle`] owns one engine instance. Synchronous calls (`command`,
//! `get_property`, ...) return the engine's verdict directly. Asynchronous
//! calls (`command_async`, `observe_property`) are tagged with a reply id,
//! and [`Handle::each_event`] routes the resulting events back to the
//! callback that asked for them.
//!
//! ```no_run
//! use mpvctl::{Config, Flow, Handle, LoopOptions};
//!
//! # fn main() -> mpvctl::Result<()> {
//! let mut mpv = Handle::open(&Config::default())?;
//! mpv.observe_property("pause", |ev| {
//!     println!("pause = {:?}", ev.property().and_then(|p| p.value.as_deref()));
//!     Ok(Flow::Continue)
//! })?;
//! mpv.register_event("shutdown", |_| Ok(Flow::Stop))?;
//! mpv.command(&["loadfile", "video.mkv"])?;
//! mpv.each_event(LoopOptions::default(), |ev| {
//!     println!("unhandled: {}", ev.id);
//!     Ok(Flow::Continue)
//! })?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - `engine` - the libmpv boundary and its dlopen-based implementation
//! - `event` - decoded events and the event name catalog
//! - `handle` - lifecycle, reply correlation and the event loop
//! - `wakeup` - interrupting a blocked wait from another thread
//! - `config` - user configuration

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod handle;
pub mod wakeup;

pub use config::Config;
pub use engine::{Engine, LibMpv, MpvLibrary};
pub use error::{Error, ErrorCode, Result};
pub use event::{Event, EventId, EventPayload, LogLevel, ReplyId};
pub use handle::{EventHandler, Flow, Handle, LoopOptions};
pub use wakeup::{Waker, WakeupPipe};
