//! Common types used by the player facade.

use serde::{Deserialize, Serialize};

/// Quality ceiling applied when youtube-dl resolves a stream.
///
/// Every level except [`VideoQuality::Highest`] caps the vertical resolution
/// of the selected video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoQuality {
    #[default]
    Highest,
    UltraHd,
    QuadHd,
    FullHd,
    Hd,
    Sd,
    Low,
}

impl VideoQuality {
    /// Maximum vertical resolution for this level, `None` for unconstrained.
    pub fn max_height(self) -> Option<u32> {
        match self {
            VideoQuality::Highest => None,
            VideoQuality::UltraHd => Some(2160),
            VideoQuality::QuadHd => Some(1440),
            VideoQuality::FullHd => Some(1080),
            VideoQuality::Hd => Some(720),
            VideoQuality::Sd => Some(480),
            VideoQuality::Low => Some(360),
        }
    }
}

/// Behavior of the engine once playback reaches the end of the file.
///
/// When set to [`KeepOpen::Yes`] or [`KeepOpen::Always`] the engine keeps the
/// media loaded at end of file, so the `MediaUnloaded` notification is never
/// raised for a natural end of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeepOpen {
    No,
    Yes,
    Always,
}

impl KeepOpen {
    pub(crate) fn as_mpv(self) -> &'static str {
        match self {
            KeepOpen::No => "no",
            KeepOpen::Yes => "yes",
            KeepOpen::Always => "always",
        }
    }

    pub(crate) fn from_mpv(value: &str) -> Option<Self> {
        match value {
            "no" => Some(KeepOpen::No),
            "yes" => Some(KeepOpen::Yes),
            "always" => Some(KeepOpen::Always),
            _ => None,
        }
    }
}

/// How `loadfile` treats media that is already playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadMethod {
    Replace,
    Append,
}

impl LoadMethod {
    /// Queue-while-playing semantics: append to the playlist when something
    /// is already playing, unless the caller forces a replace.
    pub(crate) fn choose(is_playing: bool, force: bool) -> Self {
        if is_playing && !force {
            LoadMethod::Append
        } else {
            LoadMethod::Replace
        }
    }

    pub(crate) fn as_mpv(self) -> &'static str {
        match self {
            LoadMethod::Replace => "replace",
            LoadMethod::Append => "append",
        }
    }
}

/// Why the engine stopped playing the current file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndReason {
    Eof,
    Stop,
    Quit,
    Error,
    Redirect,
    Unknown(u32),
}

impl EndReason {
    pub(crate) fn from_raw(raw: u32) -> Self {
        match raw {
            libmpv2_sys::mpv_end_file_reason_MPV_END_FILE_REASON_EOF => EndReason::Eof,
            libmpv2_sys::mpv_end_file_reason_MPV_END_FILE_REASON_STOP => EndReason::Stop,
            libmpv2_sys::mpv_end_file_reason_MPV_END_FILE_REASON_QUIT => EndReason::Quit,
            libmpv2_sys::mpv_end_file_reason_MPV_END_FILE_REASON_ERROR => EndReason::Error,
            libmpv2_sys::mpv_end_file_reason_MPV_END_FILE_REASON_REDIRECT => EndReason::Redirect,
            other => EndReason::Unknown(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_method_replaces_unless_queueing_behind_playback() {
        assert_eq!(LoadMethod::choose(false, false), LoadMethod::Replace);
        assert_eq!(LoadMethod::choose(false, true), LoadMethod::Replace);
        assert_eq!(LoadMethod::choose(true, false), LoadMethod::Append);
        assert_eq!(LoadMethod::choose(true, true), LoadMethod::Replace);
    }

    #[test]
    fn keep_open_round_trips_through_mpv_strings() {
        for keep_open in [KeepOpen::No, KeepOpen::Yes, KeepOpen::Always] {
            assert_eq!(KeepOpen::from_mpv(keep_open.as_mpv()), Some(keep_open));
        }
        assert_eq!(KeepOpen::from_mpv("sometimes"), None);
    }

    #[test]
    fn end_reason_maps_engine_codes() {
        assert_eq!(EndReason::from_raw(0), EndReason::Eof);
        assert_eq!(EndReason::from_raw(2), EndReason::Stop);
        assert_eq!(EndReason::from_raw(3), EndReason::Quit);
        assert_eq!(EndReason::from_raw(4), EndReason::Error);
        assert_eq!(EndReason::from_raw(5), EndReason::Redirect);
        assert_eq!(EndReason::from_raw(42), EndReason::Unknown(42));
    }
}
