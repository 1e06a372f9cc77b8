//! Embed the mpv media engine inside a desktop application.
//!
//! [`MpvPlayer`] wraps an engine handle behind a lock, mirrors playback
//! state as typed accessors and republishes the engine's callbacks as
//! [`PlayerEvent`] notifications on a broadcast channel. Rendering is left
//! to a windowing host, which only needs [`MpvPlayer::raw_handle`] or
//! [`MpvPlayer::attach_window`] to attach a surface.

pub mod config;
pub mod error;
pub mod player;

pub use config::PlayerConfig;
pub use error::{PlayerError, Result};
pub use player::{KeepOpen, MpvPlayer, PlayerEvent, VideoQuality};
