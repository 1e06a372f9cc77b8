//! Minimal command-line host: load one file and print translated events.

use std::env;

use anyhow::{Context, Result};
use mpv_embed::{MpvPlayer, PlayerConfig, PlayerEvent};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mpv_embed=debug,play=info")),
        )
        .init();

    let path = env::args()
        .nth(1)
        .context("usage: play <media path or URL>")?;

    let player = MpvPlayer::new(PlayerConfig {
        auto_play: true,
        ..PlayerConfig::default()
    })?;
    let mut events = player.subscribe();

    player.load(&path)?;

    loop {
        match events.recv().await? {
            PlayerEvent::MediaLoaded => {
                info!("media loaded, duration {:?}", player.duration()?);
            }
            PlayerEvent::PositionChanged(seconds) => info!("position {seconds}s"),
            PlayerEvent::SeekStarted => info!("seek started"),
            PlayerEvent::SeekEnded => info!("seek ended"),
            PlayerEvent::MediaUnloaded => {
                info!("playback finished");
                break;
            }
            PlayerEvent::MediaError => {
                error!("playback failed");
                break;
            }
        }
    }

    Ok(())
}
