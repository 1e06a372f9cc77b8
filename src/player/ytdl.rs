//! youtube-dl format-selector strings.

use super::types::VideoQuality;

/// Build the `ytdl-format` selector for a quality level.
///
/// `Highest` selects best video plus best audio with no constraint; any other
/// level caps the video stream's vertical resolution.
pub fn format_selector(quality: VideoQuality) -> String {
    match quality.max_height() {
        None => "bestvideo+bestaudio/best".to_string(),
        Some(height) => format!("bestvideo[height<={height}]+bestaudio/best"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_is_unconstrained() {
        assert_eq!(
            format_selector(VideoQuality::Highest),
            "bestvideo+bestaudio/best"
        );
    }

    #[test]
    fn other_levels_cap_vertical_resolution() {
        assert_eq!(
            format_selector(VideoQuality::FullHd),
            "bestvideo[height<=1080]+bestaudio/best"
        );
        assert_eq!(
            format_selector(VideoQuality::Low),
            "bestvideo[height<=360]+bestaudio/best"
        );
    }
}
