use std::fmt;
use std::str::FromStr;

use crate::error::ErrorCode;

/// Correlation token attached to asynchronous requests.
///
/// `0` is never issued and means "not a reply".
pub type ReplyId = u64;

/// Numeric event type (`mpv_event_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventId {
    None,
    Shutdown,
    LogMessage,
    GetPropertyReply,
    SetPropertyReply,
    CommandReply,
    StartFile,
    EndFile,
    FileLoaded,
    TracksChanged,
    TrackSwitched,
    Idle,
    Pause,
    Unpause,
    Tick,
    ScriptInputDispatch,
    ClientMessage,
    VideoReconfig,
    AudioReconfig,
    MetadataUpdate,
    Seek,
    PlaybackRestart,
    PropertyChange,
    ChapterChange,
    QueueOverflow,
    Hook,
    /// An id newer than this table.
    Other(i32),
}

impl EventId {
    pub fn from_raw(id: i32) -> Self {
        match id {
            0 => EventId::None,
            1 => EventId::Shutdown,
            2 => EventId::LogMessage,
            3 => EventId::GetPropertyReply,
            4 => EventId::SetPropertyReply,
            5 => EventId::CommandReply,
            6 => EventId::StartFile,
            7 => EventId::EndFile,
            8 => EventId::FileLoaded,
            9 => EventId::TracksChanged,
            10 => EventId::TrackSwitched,
            11 => EventId::Idle,
            12 => EventId::Pause,
            13 => EventId::Unpause,
            14 => EventId::Tick,
            15 => EventId::ScriptInputDispatch,
            16 => EventId::ClientMessage,
            17 => EventId::VideoReconfig,
            18 => EventId::AudioReconfig,
            19 => EventId::MetadataUpdate,
            20 => EventId::Seek,
            21 => EventId::PlaybackRestart,
            22 => EventId::PropertyChange,
            23 => EventId::ChapterChange,
            24 => EventId::QueueOverflow,
            25 => EventId::Hook,
            other => EventId::Other(other),
        }
    }

    pub fn raw(&self) -> i32 {
        match self {
            EventId::None => 0,
            EventId::Shutdown => 1,
            EventId::LogMessage => 2,
            EventId::GetPropertyReply => 3,
            EventId::SetPropertyReply => 4,
            EventId::CommandReply => 5,
            EventId::StartFile => 6,
            EventId::EndFile => 7,
            EventId::FileLoaded => 8,
            EventId::TracksChanged => 9,
            EventId::TrackSwitched => 10,
            EventId::Idle => 11,
            EventId::Pause => 12,
            EventId::Unpause => 13,
            EventId::Tick => 14,
            EventId::ScriptInputDispatch => 15,
            EventId::ClientMessage => 16,
            EventId::VideoReconfig => 17,
            EventId::AudioReconfig => 18,
            EventId::MetadataUpdate => 19,
            EventId::Seek => 20,
            EventId::PlaybackRestart => 21,
            EventId::PropertyChange => 22,
            EventId::ChapterChange => 23,
            EventId::QueueOverflow => 24,
            EventId::Hook => 25,
            EventId::Other(id) => *id,
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match super::event_name(*self) {
            Some(name) => f.write_str(name),
            None => write!(f, "event#{}", self.raw()),
        }
    }
}

/// Severity of engine log messages (`mpv_log_level`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    None,
    Fatal,
    Error,
    Warn,
    Info,
    Verbose,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn from_raw(level: i32) -> Self {
        match level {
            i32::MIN..=0 => LogLevel::None,
            1..=10 => LogLevel::Fatal,
            11..=20 => LogLevel::Error,
            21..=30 => LogLevel::Warn,
            31..=40 => LogLevel::Info,
            41..=50 => LogLevel::Verbose,
            51..=60 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// The name `mpv_request_log_messages` expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::None => "no",
            LogLevel::Fatal => "fatal",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Verbose => "v",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Matching `log` crate level, `None` for [`LogLevel::None`].
    pub fn to_log_level(&self) -> Option<log::Level> {
        match self {
            LogLevel::None => None,
            LogLevel::Fatal | LogLevel::Error => Some(log::Level::Error),
            LogLevel::Warn => Some(log::Level::Warn),
            LogLevel::Info => Some(log::Level::Info),
            LogLevel::Verbose | LogLevel::Debug => Some(log::Level::Debug),
            LogLevel::Trace => Some(log::Level::Trace),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no" | "none" => Ok(LogLevel::None),
            "fatal" => Ok(LogLevel::Fatal),
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "v" | "verbose" => Ok(LogLevel::Verbose),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level {other:?}")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why playback of a file ended (`mpv_end_file_reason`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndFileReason {
    Eof,
    Stop,
    Quit,
    Error,
    Redirect,
    Other(i32),
}

impl EndFileReason {
    pub fn from_raw(reason: i32) -> Self {
        match reason {
            0 => EndFileReason::Eof,
            2 => EndFileReason::Stop,
            3 => EndFileReason::Quit,
            4 => EndFileReason::Error,
            5 => EndFileReason::Redirect,
            other => EndFileReason::Other(other),
        }
    }
}

/// A property value as reported by a change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    pub name: String,
    /// `None` when the property is currently unavailable.
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub prefix: String,
    pub level: LogLevel,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndFile {
    pub reason: EndFileReason,
    pub error: Option<ErrorCode>,
}

/// Event-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventPayload {
    #[default]
    Empty,
    Property(PropertyChange),
    LogMessage(LogMessage),
    EndFile(EndFile),
    ClientMessage(Vec<String>),
    Hook { name: String, id: u64 },
}

/// One notification from the engine, consumed within a single dispatch
/// iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    /// Non-zero when this event answers a request made with that id.
    pub reply_id: ReplyId,
    pub error: Option<ErrorCode>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId) -> Self {
        Self {
            id,
            reply_id: 0,
            error: None,
            payload: EventPayload::Empty,
        }
    }

    /// The sentinel returned when a bounded wait expires.
    pub fn none() -> Self {
        Self::new(EventId::None)
    }

    pub fn with_reply_id(mut self, reply_id: ReplyId) -> Self {
        self.reply_id = reply_id;
        self
    }

    /// Attach a raw engine status; non-negative statuses carry no error.
    pub fn with_status(mut self, status: i32) -> Self {
        self.error = (status < 0).then(|| ErrorCode::from_status(status));
        self
    }

    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Build a `property-change` event for `name`.
    pub fn property_change(
        reply_id: ReplyId,
        name: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self::new(EventId::PropertyChange)
            .with_reply_id(reply_id)
            .with_payload(EventPayload::Property(PropertyChange {
                name: name.into(),
                value,
            }))
    }

    pub fn is_none(&self) -> bool {
        self.id == EventId::None
    }

    pub fn is_reply(&self) -> bool {
        self.reply_id != 0
    }

    pub fn property(&self) -> Option<&PropertyChange> {
        match &self.payload {
            EventPayload::Property(p) => Some(p),
            _ => None,
        }
    }

    pub fn log_message(&self) -> Option<&LogMessage> {
        match &self.payload {
            EventPayload::LogMessage(m) => Some(m),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_raw_round_trip() {
        for raw in 0..=25 {
            assert_eq!(EventId::from_raw(raw).raw(), raw);
        }
        assert_eq!(EventId::from_raw(99), EventId::Other(99));
    }

    #[test]
    fn test_log_level_ordering_and_names() {
        assert!(LogLevel::Warn < LogLevel::Info);
        assert_eq!(LogLevel::from_raw(30), LogLevel::Warn);
        assert_eq!(LogLevel::from_raw(50), LogLevel::Verbose);
        assert_eq!("v".parse::<LogLevel>(), Ok(LogLevel::Verbose));
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::None.to_log_level(), None);
        assert_eq!(LogLevel::Fatal.to_log_level(), Some(log::Level::Error));
    }

    #[test]
    fn test_event_status() {
        let ev = Event::new(EventId::CommandReply).with_status(-12);
        assert_eq!(ev.error, Some(ErrorCode::Command));
        let ev = Event::new(EventId::CommandReply).with_status(0);
        assert_eq!(ev.error, None);
    }

    #[test]
    fn test_property_change_helpers() {
        let ev = Event::property_change(7, "pause", Some("yes".into()));
        assert!(ev.is_reply());
        assert_eq!(ev.property().map(|p| p.name.as_str()), Some("pause"));
        assert!(ev.log_message().is_none());
        assert!(Event::none().is_none());
    }
}
