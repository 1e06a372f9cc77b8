//! Integration tests against a real libmpv engine.
//!
//! These construct an actual engine instance, so they are ignored by
//! default; run them with `cargo test -- --ignored` on a machine with
//! libmpv installed.

use std::time::Duration;

use mpv_embed::{MpvPlayer, PlayerConfig, PlayerError};

#[test]
#[ignore = "requires a libmpv runtime"]
fn volume_round_trips_and_rejects_out_of_range() {
    let player = MpvPlayer::new(PlayerConfig::default()).unwrap();

    player.set_volume(75).unwrap();
    assert_eq!(player.volume().unwrap(), 75);

    assert!(matches!(
        player.set_volume(150),
        Err(PlayerError::OutOfRange { .. })
    ));
    assert!(matches!(
        player.set_volume(-1),
        Err(PlayerError::OutOfRange { .. })
    ));
    // The rejected values never reached the engine.
    assert_eq!(player.volume().unwrap(), 75);
}

#[test]
#[ignore = "requires a libmpv runtime"]
fn position_requires_loaded_media() {
    let player = MpvPlayer::new(PlayerConfig::default()).unwrap();

    assert_eq!(player.position().unwrap(), Duration::ZERO);
    assert_eq!(player.duration().unwrap(), Duration::ZERO);
    assert!(matches!(
        player.set_position(Duration::from_secs(10)),
        Err(PlayerError::NotLoaded)
    ));
}

#[test]
#[ignore = "requires a libmpv runtime"]
fn blank_paths_are_rejected_before_the_engine_is_called() {
    let player = MpvPlayer::new(PlayerConfig::default()).unwrap();

    assert!(matches!(
        player.load(""),
        Err(PlayerError::InvalidArgument("path"))
    ));
    assert!(matches!(
        player.load("   "),
        Err(PlayerError::InvalidArgument("path"))
    ));
    assert!(matches!(
        player.enable_youtube_dl(" "),
        Err(PlayerError::InvalidArgument("script_path"))
    ));
}

#[test]
#[ignore = "requires a libmpv runtime"]
fn keep_open_round_trips_through_the_engine() {
    use mpv_embed::KeepOpen;

    let player = MpvPlayer::new(PlayerConfig::default()).unwrap();

    for keep_open in [KeepOpen::Always, KeepOpen::Yes, KeepOpen::No] {
        player.set_keep_open(keep_open).unwrap();
        assert_eq!(player.keep_open().unwrap(), keep_open);
    }
}

#[test]
#[ignore = "requires a libmpv runtime"]
fn playlist_navigation_past_the_end_is_benign() {
    let player = MpvPlayer::new(PlayerConfig::default()).unwrap();

    // Nothing queued: navigation is not applicable, but must not error.
    assert!(!player.playlist_next().unwrap());
    assert!(!player.playlist_previous().unwrap());
}
