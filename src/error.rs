//! Error types for mpv handle operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::event::{EventId, ReplyId};

/// Status codes returned by the libmpv client API (`mpv_error`).
///
/// Every negative status the engine reports maps onto one of these; codes the
/// table does not know about are kept verbatim in `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Success,
    EventQueueFull,
    NoMem,
    Uninitialized,
    InvalidParameter,
    OptionNotFound,
    OptionFormat,
    OptionError,
    PropertyNotFound,
    PropertyFormat,
    PropertyUnavailable,
    PropertyError,
    Command,
    LoadingFailed,
    AoInitFailed,
    VoInitFailed,
    NothingToPlay,
    UnknownFormat,
    Unsupported,
    NotImplemented,
    Generic,
    Unknown(i32),
}

impl ErrorCode {
    pub fn from_status(code: i32) -> Self {
        match code {
            0 => ErrorCode::Success,
            -1 => ErrorCode::EventQueueFull,
            -2 => ErrorCode::NoMem,
            -3 => ErrorCode::Uninitialized,
            -4 => ErrorCode::InvalidParameter,
            -5 => ErrorCode::OptionNotFound,
            -6 => ErrorCode::OptionFormat,
            -7 => ErrorCode::OptionError,
            -8 => ErrorCode::PropertyNotFound,
            -9 => ErrorCode::PropertyFormat,
            -10 => ErrorCode::PropertyUnavailable,
            -11 => ErrorCode::PropertyError,
            -12 => ErrorCode::Command,
            -13 => ErrorCode::LoadingFailed,
            -14 => ErrorCode::AoInitFailed,
            -15 => ErrorCode::VoInitFailed,
            -16 => ErrorCode::NothingToPlay,
            -17 => ErrorCode::UnknownFormat,
            -18 => ErrorCode::Unsupported,
            -19 => ErrorCode::NotImplemented,
            -20 => ErrorCode::Generic,
            other => ErrorCode::Unknown(other),
        }
    }

    /// The raw libmpv status value.
    pub fn status(&self) -> i32 {
        match self {
            ErrorCode::Success => 0,
            ErrorCode::EventQueueFull => -1,
            ErrorCode::NoMem => -2,
            ErrorCode::Uninitialized => -3,
            ErrorCode::InvalidParameter => -4,
            ErrorCode::OptionNotFound => -5,
            ErrorCode::OptionFormat => -6,
            ErrorCode::OptionError => -7,
            ErrorCode::PropertyNotFound => -8,
            ErrorCode::PropertyFormat => -9,
            ErrorCode::PropertyUnavailable => -10,
            ErrorCode::PropertyError => -11,
            ErrorCode::Command => -12,
            ErrorCode::LoadingFailed => -13,
            ErrorCode::AoInitFailed => -14,
            ErrorCode::VoInitFailed => -15,
            ErrorCode::NothingToPlay => -16,
            ErrorCode::UnknownFormat => -17,
            ErrorCode::Unsupported => -18,
            ErrorCode::NotImplemented => -19,
            ErrorCode::Generic => -20,
            ErrorCode::Unknown(code) => *code,
        }
    }

    /// Same wording as libmpv's `mpv_error_string()`.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::Success => "success",
            ErrorCode::EventQueueFull => "event queue full",
            ErrorCode::NoMem => "memory allocation failed",
            ErrorCode::Uninitialized => "core not uninitialized",
            ErrorCode::InvalidParameter => "invalid parameter",
            ErrorCode::OptionNotFound => "option not found",
            ErrorCode::OptionFormat => "unsupported format for accessing option",
            ErrorCode::OptionError => "error setting option",
            ErrorCode::PropertyNotFound => "property not found",
            ErrorCode::PropertyFormat => "unsupported format for accessing property",
            ErrorCode::PropertyUnavailable => "property unavailable",
            ErrorCode::PropertyError => "error accessing property",
            ErrorCode::Command => "error running command",
            ErrorCode::LoadingFailed => "loading failed",
            ErrorCode::AoInitFailed => "audio output initialization failed",
            ErrorCode::VoInitFailed => "video output initialization failed",
            ErrorCode::NothingToPlay => "no audio or video data played",
            ErrorCode::UnknownFormat => "unrecognized file format",
            ErrorCode::Unsupported => "not supported",
            ErrorCode::NotImplemented => "operation not implemented",
            ErrorCode::Generic => "something happened",
            ErrorCode::Unknown(_) => "unknown error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.status())
    }
}

/// Errors surfaced by [`Handle`](crate::Handle) and the engine loader.
#[derive(Debug, Error)]
pub enum Error {
    /// libmpv could not be loaded or is missing a symbol.
    #[error("Failed to load libmpv from '{path}': {reason}")]
    Library { path: PathBuf, reason: String },

    /// `mpv_create` or `mpv_initialize` failed.
    #[error("mpv initialization failed with code {code}: {message}")]
    Initialization { code: i32, message: String },

    /// Setting an option was rejected.
    #[error("Option '{name}' failed with code {code}: {message}")]
    Option {
        name: String,
        code: i32,
        message: String,
    },

    /// A command was rejected.
    #[error("Command failed with code {code}: {message}")]
    Command { code: i32, message: String },

    /// Reading, writing or observing a property failed.
    #[error("Property '{name}' failed with code {code}: {message}")]
    Property {
        name: String,
        code: i32,
        message: String,
    },

    /// Any other synchronous call that returned a negative status.
    #[error("{operation} failed with code {code}: {message}")]
    Operation {
        operation: &'static str,
        code: i32,
        message: String,
    },

    /// The event name is not in the catalog.
    #[error("No such event: {0:?}")]
    UnknownEvent(String),

    /// An event arrived carrying an error condition. `reply_id` is 0 unless
    /// the event answers an asynchronous request.
    #[error("Event '{event}' carried error {code}")]
    Event {
        event: EventId,
        reply_id: ReplyId,
        code: ErrorCode,
    },

    /// The handle's engine instance has already been released.
    #[error("Handle used after close")]
    UseAfterClose,

    /// An argument could not be passed to the engine.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The configuration file could not be parsed.
    #[error("Invalid config '{path}': {reason}")]
    Config { path: PathBuf, reason: String },

    /// An error raised by an event callback.
    #[error("Callback failed: {0}")]
    Callback(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn command(code: i32) -> Self {
        Self::Command {
            code,
            message: ErrorCode::from_status(code).description().to_string(),
        }
    }

    pub fn property(name: impl Into<String>, code: i32) -> Self {
        Self::Property {
            name: name.into(),
            code,
            message: ErrorCode::from_status(code).description().to_string(),
        }
    }

    pub fn option(name: impl Into<String>, code: i32) -> Self {
        Self::Option {
            name: name.into(),
            code,
            message: ErrorCode::from_status(code).description().to_string(),
        }
    }

    pub fn operation(operation: &'static str, code: i32) -> Self {
        Self::Operation {
            operation,
            code,
            message: ErrorCode::from_status(code).description().to_string(),
        }
    }

    pub fn initialization(code: i32) -> Self {
        Self::Initialization {
            code,
            message: ErrorCode::from_status(code).description().to_string(),
        }
    }

    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an arbitrary error raised inside a callback.
    pub fn callback<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Callback(err.into())
    }

    /// The engine status code carried by this error, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Initialization { code, .. }
            | Self::Option { code, .. }
            | Self::Command { code, .. }
            | Self::Property { code, .. }
            | Self::Operation { code, .. } => Some(*code),
            Self::Event { code, .. } => Some(code.status()),
            _ => None,
        }
    }

    /// A failed synchronous call leaves the handle usable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Option { .. }
                | Self::Command { .. }
                | Self::Property { .. }
                | Self::Operation { .. }
                | Self::UnknownEvent(_)
                | Self::Event { .. }
                | Self::InvalidArgument { .. }
                | Self::Callback(_)
        )
    }
}

/// Result type for mpv handle operations.
pub type Result<T> = std::result::Result<T, Error>;
