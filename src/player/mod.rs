mod event_loop;
pub mod events;
pub mod mpv_player;
pub mod types;
pub mod ytdl;

pub use events::PlayerEvent;
pub use mpv_player::MpvPlayer;
pub use types::{KeepOpen, VideoQuality};
