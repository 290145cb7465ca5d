use crate::error::Result;
use crate::types::OverlayStyle;
use serde::{Deserialize, Serialize};

/// Shortest span a trim range or overlay may be narrowed to, in seconds.
pub const MIN_SPAN: f64 = 0.5;

/// How long a freshly added overlay stays on screen, in seconds.
pub const OVERLAY_DURATION: f64 = 5.0;

/// Distance either side of the playhead used to seed a new trim range.
pub const TRIM_SEED_RADIUS: f64 = 2.0;

pub const FONT_SIZE_MIN: u32 = 12;
pub const FONT_SIZE_MAX: u32 = 72;

/// Runtime knobs for an editing session. Never written to disk; the host
/// builds one in code or hands one over as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Number of frames in the timeline thumbnail strip.
    pub thumbnail_count: usize,
    /// Artificial processing time before the download is produced.
    pub export_delay_ms: u64,
    /// JPEG quality for thumbnails, 0.0 to 1.0.
    pub jpeg_quality: f64,
    /// The player is re-seeked only when it drifts at least this far.
    pub playback_resync_threshold: f64,
    /// Style preselected in the "add overlay" form.
    pub default_overlay_style: OverlayStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            thumbnail_count: 8,
            export_delay_ms: 2000,
            jpeg_quality: 0.8,
            playback_resync_threshold: 0.5,
            default_overlay_style: OverlayStyle::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OverlayPosition, Rgb};

    #[test]
    fn defaults_match_editor_behaviour() {
        let config = EditorConfig::default();
        assert_eq!(config.thumbnail_count, 8);
        assert_eq!(config.export_delay_ms, 2000);
        assert!((config.jpeg_quality - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.default_overlay_style.position, OverlayPosition::Center);
        assert_eq!(config.default_overlay_style.font_size, 36);
        assert_eq!(config.default_overlay_style.color, Rgb::WHITE);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = EditorConfig::from_json(r#"{"export_delay_ms": 0}"#).unwrap();
        assert_eq!(config.export_delay_ms, 0);
        assert_eq!(config.thumbnail_count, 8);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(EditorConfig::from_json("{not json").is_err());
    }
}
