//! The embedded mpv player facade.

use std::ffi::CString;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use libmpv2::events::EventContext;
use libmpv2::{Format, Mpv};
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, error, info};

use super::event_loop::{self, SharedState, REPLY_TIME_POS};
use super::events::{PlayerEvent, EVENT_CHANNEL_CAPACITY};
use super::types::{KeepOpen, LoadMethod, VideoQuality};
use super::ytdl;
use crate::config::PlayerConfig;
use crate::error::{is_unapplicable_command, PlayerError, Result};

/// Embedded mpv player.
///
/// Owns the engine handle and serializes every engine call behind one lock;
/// the lock is held only for the duration of a call, never across an await.
/// Engine events are pumped on a dedicated thread and republished through a
/// broadcast channel, see [`MpvPlayer::subscribe`].
///
/// The player is `Send + Sync`; wrap it in an `Arc` to share it between the
/// UI and background tasks. Dropping the last handle shuts the event thread
/// down and releases the engine.
pub struct MpvPlayer {
    inner: Arc<PlayerInner>,
    event_thread: Option<thread::JoinHandle<()>>,
}

pub(crate) struct PlayerInner {
    mpv: Mutex<Mpv>,
    pub(crate) state: SharedState,
    /// Single-slot pending seek: a new seek replaces the sender, the event
    /// thread takes it when the engine reports the restart.
    pub(crate) pending_seek: Mutex<Option<oneshot::Sender<()>>>,
    pub(crate) events: broadcast::Sender<PlayerEvent>,
    pub(crate) shutdown: AtomicBool,
    ytdl_enabled: AtomicBool,
    video_quality: Mutex<VideoQuality>,
}

impl MpvPlayer {
    /// Create a player and start its event thread.
    ///
    /// Fails with [`PlayerError::Initialization`] when the mpv engine cannot
    /// be created or its event queue cannot be configured.
    pub fn new(config: PlayerConfig) -> Result<Self> {
        info!(
            "initializing mpv player (auto_play: {}, volume: {})",
            config.auto_play, config.volume
        );

        // mpv requires the C numeric locale for float parsing.
        unsafe {
            let c_locale = CString::new("C").unwrap();
            libc::setlocale(libc::LC_NUMERIC, c_locale.as_ptr());
        }

        let mpv = Mpv::new().map_err(|e| PlayerError::Initialization(format!("{e:?}")))?;

        if config.verbose_logging {
            let _ = mpv.set_property("msg-level", "all=debug");
        }
        if let Ok(version) = mpv.get_property::<String>("mpv-version") {
            debug!("mpv version: {version}");
        }

        let mut ev_ctx = EventContext::new(mpv.ctx);
        ev_ctx
            .disable_deprecated_events()
            .map_err(|e| PlayerError::Initialization(format!("{e:?}")))?;
        ev_ctx
            .observe_property("time-pos", Format::Int64, REPLY_TIME_POS)
            .map_err(|e| PlayerError::Initialization(format!("{e:?}")))?;

        // Diagnostic builds forward the engine's log stream to tracing.
        #[cfg(debug_assertions)]
        unsafe {
            let min_level = CString::new("info").unwrap();
            libmpv2_sys::mpv_request_log_messages(mpv.ctx.as_ptr(), min_level.as_ptr());
        }

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let inner = Arc::new(PlayerInner {
            mpv: Mutex::new(mpv),
            state: SharedState::new(config.auto_play),
            pending_seek: Mutex::new(None),
            events,
            shutdown: AtomicBool::new(false),
            ytdl_enabled: AtomicBool::new(false),
            video_quality: Mutex::new(config.video_quality),
        });

        let mut player = Self {
            inner: Arc::clone(&inner),
            event_thread: None,
        };

        // Defaults mirror the embedded control: volume 50, unconstrained
        // download quality.
        player.set_volume(config.volume)?;
        player.set_video_quality(config.video_quality)?;

        let thread_inner = Arc::clone(&inner);
        let handle = thread::Builder::new()
            .name("mpv-events".into())
            .spawn(move || event_loop::run(ev_ctx, thread_inner))
            .map_err(|e| PlayerError::Initialization(format!("event thread: {e}")))?;
        player.event_thread = Some(handle);

        Ok(player)
    }

    /// Subscribe to the translated event stream.
    ///
    /// Events are published from the player's event thread; receiving them
    /// on your own task is the hand-off that keeps engine callbacks off
    /// consumer code.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.inner.events.subscribe()
    }

    /// Current number of event subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.events.receiver_count()
    }

    /// True when media is loaded and ready for playback.
    pub fn is_media_loaded(&self) -> bool {
        self.inner.state.is_media_loaded.load(Ordering::Acquire)
    }

    /// True while media is playing.
    pub fn is_playing(&self) -> bool {
        self.inner.state.is_playing.load(Ordering::Acquire)
    }

    /// True between a reported seek start and the matching restart.
    pub fn is_seeking(&self) -> bool {
        self.inner.state.is_seeking.load(Ordering::Acquire)
    }

    /// Whether loaded media starts playing automatically.
    pub fn auto_play(&self) -> bool {
        self.inner.state.auto_play.load(Ordering::Acquire)
    }

    pub fn set_auto_play(&self, auto_play: bool) {
        self.inner.state.auto_play.store(auto_play, Ordering::Release);
    }

    /// Load media from a path or URL.
    ///
    /// While media is playing the new entry is appended to the playlist;
    /// otherwise it replaces the current playback. Failures to actually open
    /// the media are reported asynchronously as
    /// [`PlayerEvent::MediaError`], not from this call.
    pub fn load(&self, path: &str) -> Result<()> {
        self.load_with(path, false)
    }

    /// Load media, replacing current playback when `force` is true even if
    /// something is playing.
    pub fn load_with(&self, path: &str, force: bool) -> Result<()> {
        if path.trim().is_empty() {
            return Err(PlayerError::InvalidArgument("path"));
        }

        let method = LoadMethod::choose(self.is_playing(), force);
        debug!("loading {path} ({method:?})");

        let mpv = self.inner.mpv.lock().unwrap();
        mpv.set_property("pause", !self.auto_play())
            .map_err(|e| PlayerError::engine("set pause", e))?;
        mpv.command("loadfile", &[path, method.as_mpv()])
            .map_err(|e| PlayerError::engine("loadfile", e))
    }

    /// Seek and wait until the engine reports that playback restarted.
    ///
    /// Only one seek is tracked at a time: issuing a new seek replaces the
    /// pending one, whose future then resolves with
    /// [`PlayerError::SeekSuperseded`]. There is no timeout; if the engine
    /// never restarts playback the future never resolves.
    pub async fn seek(&self, position: Duration) -> Result<()> {
        let (done, completed) = oneshot::channel();
        *self.inner.pending_seek.lock().unwrap() = Some(done);

        self.set_position(position)?;

        completed.await.map_err(|_| PlayerError::SeekSuperseded)
    }

    /// Playback position since the start of the media, zero when nothing is
    /// loaded.
    pub fn position(&self) -> Result<Duration> {
        self.timed_property("time-pos")
    }

    /// Issue an absolute seek.
    ///
    /// Fails with [`PlayerError::NotLoaded`] when no media is loaded and
    /// with [`PlayerError::OutOfRange`] when the target lies beyond the
    /// media's duration.
    pub fn set_position(&self, position: Duration) -> Result<()> {
        if !self.is_media_loaded() {
            return Err(PlayerError::NotLoaded);
        }

        let duration = self.duration()?;
        if position > duration {
            return Err(PlayerError::OutOfRange {
                what: "position",
                value: position.as_secs_f64(),
                max: duration.as_secs_f64(),
            });
        }

        let target = position.as_secs_f64().to_string();
        let mpv = self.inner.mpv.lock().unwrap();
        mpv.command("seek", &[&target, "absolute"])
            .map_err(|e| PlayerError::engine("seek", e))
    }

    /// Duration of the media as indicated by its metadata, zero when nothing
    /// is loaded. Read from the engine on every call.
    pub fn duration(&self) -> Result<Duration> {
        self.timed_property("duration")
    }

    /// Time left of playback, zero when nothing is loaded.
    pub fn remaining(&self) -> Result<Duration> {
        self.timed_property("time-remaining")
    }

    /// Volume of the current media, 0..=100.
    pub fn volume(&self) -> Result<i64> {
        let mpv = self.inner.mpv.lock().unwrap();
        let volume = mpv
            .get_property::<f64>("volume")
            .map_err(|e| PlayerError::engine("get volume", e))?;
        Ok(volume as i64)
    }

    /// Set the volume. Fails with [`PlayerError::OutOfRange`] outside
    /// 0..=100; the engine is not touched in that case.
    pub fn set_volume(&self, volume: i64) -> Result<()> {
        if !(0..=100).contains(&volume) {
            return Err(PlayerError::OutOfRange {
                what: "volume",
                value: volume as f64,
                max: 100.0,
            });
        }

        let mpv = self.inner.mpv.lock().unwrap();
        mpv.set_property("volume", volume as f64)
            .map_err(|e| PlayerError::engine("set volume", e))
    }

    /// Resume playback.
    pub fn resume(&self) -> Result<()> {
        {
            let mpv = self.inner.mpv.lock().unwrap();
            mpv.set_property("pause", false)
                .map_err(|e| PlayerError::engine("set pause", e))?;
        }
        self.inner.state.is_playing.store(true, Ordering::Release);
        Ok(())
    }

    /// Pause playback.
    pub fn pause(&self) -> Result<()> {
        {
            let mpv = self.inner.mpv.lock().unwrap();
            mpv.set_property("pause", true)
                .map_err(|e| PlayerError::engine("set pause", e))?;
        }
        self.inner.state.is_playing.store(false, Ordering::Release);
        Ok(())
    }

    /// Stop playback and unload the media.
    pub fn stop(&self) -> Result<()> {
        {
            let mpv = self.inner.mpv.lock().unwrap();
            mpv.command("stop", &[])
                .map_err(|e| PlayerError::engine("stop", e))?;
        }
        self.inner.state.is_media_loaded.store(false, Ordering::Release);
        self.inner.state.is_playing.store(false, Ordering::Release);
        Ok(())
    }

    /// Go back to the start of the media and resume playback.
    pub fn restart(&self) -> Result<()> {
        self.set_position(Duration::ZERO)?;
        self.resume()
    }

    /// Go to the next playlist entry. `Ok(false)` when there is no entry
    /// after the current one.
    pub fn playlist_next(&self) -> Result<bool> {
        self.playlist_command("playlist-next", &[])
    }

    /// Go to the previous playlist entry. `Ok(false)` when there is no entry
    /// before the current one.
    pub fn playlist_previous(&self) -> Result<bool> {
        self.playlist_command("playlist-prev", &[])
    }

    /// Remove the current playlist entry. `Ok(false)` when there is nothing
    /// to remove.
    pub fn playlist_remove_current(&self) -> Result<bool> {
        self.playlist_command("playlist-remove", &["current"])
    }

    /// Remove the playlist entry at `index` (zero based). `Ok(false)` when
    /// the index does not name an entry.
    pub fn playlist_remove(&self, index: usize) -> Result<bool> {
        let index = index.to_string();
        self.playlist_command("playlist-remove", &[&index])
    }

    /// Move the entry at `from` so it takes the place of the entry at `to`.
    /// `Ok(false)` when either index does not name an entry.
    pub fn playlist_move(&self, from: usize, to: usize) -> Result<bool> {
        let from = from.to_string();
        let to = to.to_string();
        self.playlist_command("playlist-move", &[&from, &to])
    }

    /// Clear the playlist of all entries.
    pub fn playlist_clear(&self) -> Result<()> {
        let mpv = self.inner.mpv.lock().unwrap();
        mpv.command("playlist-clear", &[])
            .map_err(|e| PlayerError::engine("playlist-clear", e))
    }

    /// Number of entries in the playlist.
    pub fn playlist_entry_count(&self) -> Result<i64> {
        let mpv = self.inner.mpv.lock().unwrap();
        mpv.get_property::<i64>("playlist-count")
            .map_err(|e| PlayerError::engine("get playlist-count", e))
    }

    /// Index of the current playlist entry (zero based), `-1` when none.
    pub fn playlist_position(&self) -> Result<i64> {
        let mpv = self.inner.mpv.lock().unwrap();
        mpv.get_property::<i64>("playlist-pos")
            .map_err(|e| PlayerError::engine("get playlist-pos", e))
    }

    /// Enable youtube-dl support by loading its hook script into the engine.
    ///
    /// Idempotent: once enabled, further calls are no-ops and the script is
    /// never loaded twice.
    pub fn enable_youtube_dl(&self, script_path: &str) -> Result<()> {
        if self.inner.ytdl_enabled.load(Ordering::Acquire) {
            return Ok(());
        }
        if script_path.trim().is_empty() {
            return Err(PlayerError::InvalidArgument("script_path"));
        }

        info!("enabling youtube-dl (hook script: {script_path})");
        {
            let mpv = self.inner.mpv.lock().unwrap();
            mpv.command("load-script", &[script_path])
                .map_err(|e| PlayerError::engine("load-script", e))?;
        }
        self.inner.ytdl_enabled.store(true, Ordering::Release);
        Ok(())
    }

    /// Quality ceiling used when youtube-dl resolves a stream.
    pub fn video_quality(&self) -> VideoQuality {
        *self.inner.video_quality.lock().unwrap()
    }

    /// Select the quality ceiling for youtube-dl resolved streams.
    pub fn set_video_quality(&self, quality: VideoQuality) -> Result<()> {
        let selector = ytdl::format_selector(quality);
        {
            let mpv = self.inner.mpv.lock().unwrap();
            mpv.set_property("ytdl-format", selector.as_str())
                .map_err(|e| PlayerError::engine("set ytdl-format", e))?;
        }
        *self.inner.video_quality.lock().unwrap() = quality;
        Ok(())
    }

    /// The engine's end-of-file behavior.
    pub fn keep_open(&self) -> Result<KeepOpen> {
        let raw = {
            let mpv = self.inner.mpv.lock().unwrap();
            mpv.get_property::<String>("keep-open")
                .map_err(|e| PlayerError::engine("get keep-open", e))?
        };
        KeepOpen::from_mpv(&raw).ok_or_else(|| PlayerError::Engine {
            command: "get keep-open",
            message: format!("unexpected value {raw:?}"),
            code: None,
        })
    }

    /// Control whether the engine keeps media loaded at end of file. With
    /// [`KeepOpen::Yes`] or [`KeepOpen::Always`] a natural end of playback no
    /// longer raises [`PlayerEvent::MediaUnloaded`].
    pub fn set_keep_open(&self, keep_open: KeepOpen) -> Result<()> {
        let mpv = self.inner.mpv.lock().unwrap();
        mpv.set_property("keep-open", keep_open.as_mpv())
            .map_err(|e| PlayerError::engine("set keep-open", e))
    }

    /// Raw engine handle, for a windowing host that attaches a native
    /// rendering surface. Do not touch unless you know what you are doing:
    /// the adapter still serializes its own calls through its lock, and the
    /// handle stays valid only while the player lives.
    pub fn raw_handle(&self) -> *mut libmpv2_sys::mpv_handle {
        self.inner.mpv.lock().unwrap().ctx.as_ptr()
    }

    /// Hand the engine a native window id to render into.
    pub fn attach_window(&self, wid: i64) -> Result<()> {
        let mpv = self.inner.mpv.lock().unwrap();
        mpv.set_property("wid", wid)
            .map_err(|e| PlayerError::engine("set wid", e))
    }

    fn timed_property(&self, name: &'static str) -> Result<Duration> {
        if !self.is_media_loaded() {
            return Ok(Duration::ZERO);
        }
        let mpv = self.inner.mpv.lock().unwrap();
        let seconds = mpv
            .get_property::<i64>(name)
            .map_err(|e| PlayerError::engine(name, e))?;
        Ok(Duration::from_secs(seconds.max(0) as u64))
    }

    /// Run a playlist command, converting the engine's "command not
    /// applicable" failure kind into `Ok(false)`. Every other failure
    /// propagates.
    fn playlist_command(&self, name: &'static str, args: &[&str]) -> Result<bool> {
        let mpv = self.inner.mpv.lock().unwrap();
        match mpv.command(name, args) {
            Ok(()) => Ok(true),
            Err(err) if is_unapplicable_command(&err) => Ok(false),
            Err(err) => Err(PlayerError::engine(name, err)),
        }
    }
}

impl Drop for MpvPlayer {
    fn drop(&mut self) {
        self.inner.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.event_thread.take() {
            if handle.join().is_err() {
                error!("mpv event thread panicked during shutdown");
            }
        }
        // The engine handle itself is released when the last reference to
        // the inner state goes away, strictly after the event thread exits.
    }
}
