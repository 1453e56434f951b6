use super::types::EventId;

/// Event names as printed by `mpv_event_name()`, indexed by raw id.
const EVENT_NAMES: &[(&str, EventId)] = &[
    ("none", EventId::None),
    ("shutdown", EventId::Shutdown),
    ("log-message", EventId::LogMessage),
    ("get-property-reply", EventId::GetPropertyReply),
    ("set-property-reply", EventId::SetPropertyReply),
    ("command-reply", EventId::CommandReply),
    ("start-file", EventId::StartFile),
    ("end-file", EventId::EndFile),
    ("file-loaded", EventId::FileLoaded),
    ("tracks-changed", EventId::TracksChanged),
    ("track-switched", EventId::TrackSwitched),
    ("idle", EventId::Idle),
    ("pause", EventId::Pause),
    ("unpause", EventId::Unpause),
    ("tick", EventId::Tick),
    ("script-input-dispatch", EventId::ScriptInputDispatch),
    ("client-message", EventId::ClientMessage),
    ("video-reconfig", EventId::VideoReconfig),
    ("audio-reconfig", EventId::AudioReconfig),
    ("metadata-update", EventId::MetadataUpdate),
    ("seek", EventId::Seek),
    ("playback-restart", EventId::PlaybackRestart),
    ("property-change", EventId::PropertyChange),
    ("chapter-change", EventId::ChapterChange),
    ("queue-overflow", EventId::QueueOverflow),
    ("hook", EventId::Hook),
];

/// Resolve a human-readable event name.
pub fn event_id_from_name(name: &str) -> Option<EventId> {
    EVENT_NAMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, id)| *id)
}

pub fn event_name(id: EventId) -> Option<&'static str> {
    let raw = usize::try_from(id.raw()).ok()?;
    EVENT_NAMES
        .get(raw)
        .filter(|(_, known)| *known == id)
        .map(|(name, _)| *name)
}
