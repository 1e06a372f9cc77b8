//! Translation of raw engine events into player notifications.
//!
//! A dedicated thread pumps the engine's event queue and applies each event
//! to the shared playback state. Consumer-visible notifications are emitted
//! on the broadcast channel, never invoked on the engine thread directly.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use libmpv2::events::{Event, EventContext, PropertyData};
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use super::events::PlayerEvent;
use super::mpv_player::PlayerInner;
use super::types::EndReason;

/// Correlation token for the observed `time-pos` property.
pub(crate) const REPLY_TIME_POS: u64 = 1;

/// How long a single `wait_event` call may block. Bounds how quickly the
/// event thread notices a shutdown request.
pub(crate) const EVENT_POLL_SECS: f64 = 0.25;

/// Derived playback state shared between the facade and the event thread.
pub(crate) struct SharedState {
    pub(crate) is_media_loaded: AtomicBool,
    pub(crate) is_playing: AtomicBool,
    pub(crate) is_seeking: AtomicBool,
    pub(crate) auto_play: AtomicBool,
}

impl SharedState {
    pub(crate) fn new(auto_play: bool) -> Self {
        Self {
            is_media_loaded: AtomicBool::new(false),
            is_playing: AtomicBool::new(false),
            is_seeking: AtomicBool::new(false),
            auto_play: AtomicBool::new(auto_play),
        }
    }
}

/// The subset of engine events the facade reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EngineEvent {
    SeekStarted,
    PlaybackRestart,
    FileLoaded,
    EndFile(EndReason),
    Position(i64),
}

type SeekSlot = Mutex<Option<oneshot::Sender<()>>>;

/// Apply one engine event to the shared state, resolving the pending seek
/// where required, and return the notification to publish (if any).
pub(crate) fn translate(
    event: EngineEvent,
    state: &SharedState,
    pending_seek: &SeekSlot,
) -> Option<PlayerEvent> {
    match event {
        EngineEvent::SeekStarted => {
            state.is_seeking.store(true, Ordering::Release);
            Some(PlayerEvent::SeekStarted)
        }
        EngineEvent::PlaybackRestart => {
            // Only a restart that ends a seek is interesting; mpv also
            // reports restarts after load and unpause.
            if !state.is_seeking.swap(false, Ordering::AcqRel) {
                return None;
            }
            if let Some(done) = pending_seek.lock().unwrap().take() {
                let _ = done.send(());
            }
            Some(PlayerEvent::SeekEnded)
        }
        EngineEvent::FileLoaded => {
            state.is_media_loaded.store(true, Ordering::Release);
            let auto_play = state.auto_play.load(Ordering::Acquire);
            state.is_playing.store(auto_play, Ordering::Release);
            Some(PlayerEvent::MediaLoaded)
        }
        EngineEvent::EndFile(reason) => {
            state.is_media_loaded.store(false, Ordering::Release);
            state.is_seeking.store(false, Ordering::Release);
            match reason {
                EndReason::Eof | EndReason::Stop | EndReason::Quit | EndReason::Redirect => {
                    Some(PlayerEvent::MediaUnloaded)
                }
                EndReason::Error => Some(PlayerEvent::MediaError),
                EndReason::Unknown(raw) => {
                    warn!("unhandled end-file reason {raw}");
                    None
                }
            }
        }
        EngineEvent::Position(seconds) => Some(PlayerEvent::PositionChanged(seconds)),
    }
}

/// Event-thread body: pump the engine queue until shutdown.
pub(crate) fn run(mut ev_ctx: EventContext, inner: Arc<PlayerInner>) {
    loop {
        if inner.shutdown.load(Ordering::Acquire) {
            break;
        }

        let event = match ev_ctx.wait_event(EVENT_POLL_SECS) {
            None => continue,
            Some(Ok(event)) => event,
            Some(Err(err)) => {
                warn!("mpv event queue error: {err:?}");
                continue;
            }
        };

        match event {
            Event::Shutdown => break,
            Event::Seek => dispatch(&inner, EngineEvent::SeekStarted),
            Event::PlaybackRestart => dispatch(&inner, EngineEvent::PlaybackRestart),
            Event::FileLoaded => dispatch(&inner, EngineEvent::FileLoaded),
            Event::EndFile(reason) => {
                dispatch(&inner, EngineEvent::EndFile(EndReason::from_raw(reason as u32)));
            }
            Event::PropertyChange {
                change: PropertyData::Int64(position),
                reply_userdata: REPLY_TIME_POS,
                ..
            } => dispatch(&inner, EngineEvent::Position(position)),
            #[cfg(debug_assertions)]
            Event::LogMessage {
                prefix,
                level,
                text,
                ..
            } => trace!(target: "mpv", "[{prefix}] {level}: {}", text.trim_end()),
            _ => {}
        }
    }

    debug!("mpv event thread stopped");
}

fn dispatch(inner: &PlayerInner, event: EngineEvent) {
    if let Some(notification) = translate(event, &inner.state, &inner.pending_seek) {
        trace!("publishing {notification:?}");
        // A send error only means there are no subscribers right now.
        let _ = inner.events.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seek_slot_with_sender() -> (SeekSlot, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Mutex::new(Some(tx)), rx)
    }

    #[test]
    fn file_loaded_marks_media_and_applies_auto_play() {
        let state = SharedState::new(true);
        let slot = Mutex::new(None);

        let note = translate(EngineEvent::FileLoaded, &state, &slot);

        assert_eq!(note, Some(PlayerEvent::MediaLoaded));
        assert!(state.is_media_loaded.load(Ordering::Acquire));
        assert!(state.is_playing.load(Ordering::Acquire));
    }

    #[test]
    fn file_loaded_without_auto_play_stays_paused() {
        let state = SharedState::new(false);
        let slot = Mutex::new(None);

        translate(EngineEvent::FileLoaded, &state, &slot);

        assert!(state.is_media_loaded.load(Ordering::Acquire));
        assert!(!state.is_playing.load(Ordering::Acquire));
    }

    #[test]
    fn end_of_file_unloads_without_reporting_an_error() {
        let state = SharedState::new(false);
        let slot = Mutex::new(None);

        for reason in [
            EndReason::Eof,
            EndReason::Stop,
            EndReason::Quit,
            EndReason::Redirect,
        ] {
            state.is_media_loaded.store(true, Ordering::Release);
            let note = translate(EngineEvent::EndFile(reason), &state, &slot);
            assert_eq!(note, Some(PlayerEvent::MediaUnloaded));
            assert!(!state.is_media_loaded.load(Ordering::Acquire));
        }
    }

    #[test]
    fn end_file_error_reason_reports_media_error() {
        let state = SharedState::new(false);
        let slot = Mutex::new(None);
        state.is_media_loaded.store(true, Ordering::Release);
        state.is_seeking.store(true, Ordering::Release);

        let note = translate(EngineEvent::EndFile(EndReason::Error), &state, &slot);

        assert_eq!(note, Some(PlayerEvent::MediaError));
        assert!(!state.is_media_loaded.load(Ordering::Acquire));
        assert!(!state.is_seeking.load(Ordering::Acquire));
    }

    #[test]
    fn unknown_end_reason_clears_state_silently() {
        let state = SharedState::new(false);
        let slot = Mutex::new(None);
        state.is_media_loaded.store(true, Ordering::Release);

        let note = translate(EngineEvent::EndFile(EndReason::Unknown(1)), &state, &slot);

        assert_eq!(note, None);
        assert!(!state.is_media_loaded.load(Ordering::Acquire));
    }

    #[test]
    fn restart_after_seek_resolves_the_pending_future_exactly_once() {
        let state = SharedState::new(false);
        let (slot, mut rx) = seek_slot_with_sender();

        let started = translate(EngineEvent::SeekStarted, &state, &slot);
        assert_eq!(started, Some(PlayerEvent::SeekStarted));
        assert!(state.is_seeking.load(Ordering::Acquire));

        let ended = translate(EngineEvent::PlaybackRestart, &state, &slot);
        assert_eq!(ended, Some(PlayerEvent::SeekEnded));
        assert!(!state.is_seeking.load(Ordering::Acquire));
        assert!(rx.try_recv().is_ok());

        // A second restart is not a seek end and must not emit again.
        let again = translate(EngineEvent::PlaybackRestart, &state, &slot);
        assert_eq!(again, None);
    }

    #[test]
    fn restart_without_a_seek_is_ignored() {
        let state = SharedState::new(false);
        let (slot, mut rx) = seek_slot_with_sender();

        let note = translate(EngineEvent::PlaybackRestart, &state, &slot);

        assert_eq!(note, None);
        // The pending sender is untouched: nothing resolved, nothing dropped.
        assert!(rx.try_recv().is_err());
        assert!(slot.lock().unwrap().is_some());
    }

    #[test]
    fn position_changes_pass_through_in_seconds() {
        let state = SharedState::new(false);
        let slot = Mutex::new(None);

        let note = translate(EngineEvent::Position(17), &state, &slot);

        assert_eq!(note, Some(PlayerEvent::PositionChanged(17)));
    }
}
