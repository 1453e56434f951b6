//! Events emitted by the engine.
//!
//! - `types` - the decoded [`Event`] value and its payloads
//! - `catalog` - event name lookup used by `register_event`

mod catalog;
mod types;

pub use catalog::{event_id_from_name, event_name};
pub use types::*;
