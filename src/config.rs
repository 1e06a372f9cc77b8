use serde::{Deserialize, Serialize};

use crate::player::VideoQuality;

/// Startup configuration for an embedded player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Start playback automatically when media finishes loading.
    #[serde(default)]
    pub auto_play: bool,

    /// Initial volume, 0..=100.
    #[serde(default = "default_volume")]
    pub volume: i64,

    /// Initial quality ceiling for youtube-dl resolved streams.
    #[serde(default)]
    pub video_quality: VideoQuality,

    /// Raise the engine's own message level for troubleshooting.
    #[serde(default)]
    pub verbose_logging: bool,
}

fn default_volume() -> i64 {
    50
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            auto_play: false,
            volume: default_volume(),
            video_quality: VideoQuality::default(),
            verbose_logging: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_embedded_control() {
        let config = PlayerConfig::default();
        assert_eq!(config.volume, 50);
        assert_eq!(config.video_quality, VideoQuality::Highest);
        assert!(!config.auto_play);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: PlayerConfig = toml::from_str("auto_play = true").unwrap();
        assert!(config.auto_play);
        assert_eq!(config.volume, 50);
        assert!(!config.verbose_logging);
    }
}
