//! Notifications republished by the player facade.

/// High-level notifications derived from the engine's event stream.
///
/// Engine callbacks arrive on the player's internal event thread; they are
/// handed off through a broadcast channel so consumers always observe them
/// from their own task or thread, never from inside the engine. Subscribe
/// with [`MpvPlayer::subscribe`](crate::MpvPlayer::subscribe); a receiver
/// that falls behind the channel capacity sees a lag error and can resume
/// from the next event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// Media finished loading and is ready for playback.
    MediaLoaded,
    /// The current media was unloaded (end of file, stop, quit or redirect).
    MediaUnloaded,
    /// The engine failed to play the current media.
    MediaError,
    /// The engine started seeking.
    SeekStarted,
    /// Seeking finished and playback restarted.
    SeekEnded,
    /// The observed playback position changed, in whole seconds.
    PositionChanged(i64),
}

/// Buffered events per subscriber before a slow receiver starts lagging.
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 64;
