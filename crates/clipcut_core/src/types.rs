use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// OverlayId
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OverlayId(pub Uuid);

impl OverlayId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OverlayId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for OverlayId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// ---------------------------------------------------------------------------
// OverlayPosition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(from = "String", into = "String")]
pub enum OverlayPosition {
    Top,
    #[default]
    Center,
    Bottom,
}

impl OverlayPosition {
    /// Parse a position name. Anything unrecognised is treated as `Bottom`.
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Self::Top,
            "center" => Self::Center,
            _ => Self::Bottom,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
        }
    }
}

impl From<String> for OverlayPosition {
    fn from(s: String) -> Self {
        Self::parse_lossy(&s)
    }
}

impl From<OverlayPosition> for String {
    fn from(p: OverlayPosition) -> Self {
        p.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// Rgb
// ---------------------------------------------------------------------------

/// An opaque RGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or the short `#rgb` form. The leading `#` is optional.
    pub fn parse_hex(s: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidColor(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |part: &str| u8::from_str_radix(part, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 0x11);
                Ok(Self::new(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&s)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

// ---------------------------------------------------------------------------
// OverlayStyle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverlayStyle {
    pub position: OverlayPosition,
    pub font_size: u32,
    pub color: Rgb,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            position: OverlayPosition::Center,
            font_size: 36,
            color: Rgb::WHITE,
        }
    }
}

// ---------------------------------------------------------------------------
// TextOverlay
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextOverlay {
    pub id: OverlayId,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub position: OverlayPosition,
    pub font_size: u32,
    pub color: Rgb,
}

/// Partial update for a `TextOverlay`; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverlayPatch {
    pub text: Option<String>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub position: Option<OverlayPosition>,
    pub font_size: Option<u32>,
    pub color: Option<Rgb>,
}

// ---------------------------------------------------------------------------
// TrimRange
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrimRange {
    pub start_time: f64,
    pub end_time: f64,
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// A user-provided file, before it has been accepted as a video.
#[derive(Debug, Clone)]
pub struct MediaSource {
    pub name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
    /// Where the bytes live on disk, when they came from a file.
    pub path: Option<PathBuf>,
}

impl MediaSource {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.trim().to_ascii_lowercase().starts_with("video/")
    }
}

/// The one live media resource of a session. Released on drop.
#[derive(Debug)]
pub struct MediaHandle {
    pub id: Uuid,
    pub name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
    pub path: Option<PathBuf>,
}

impl MediaHandle {
    pub(crate) fn from_source(source: MediaSource) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: source.name,
            mime_type: source.mime_type,
            bytes: source.bytes,
            path: source.path,
        }
    }

    pub fn info(&self) -> MediaInfo {
        MediaInfo {
            id: self.id,
            name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            size_bytes: self.bytes.len() as u64,
        }
    }
}

impl Drop for MediaHandle {
    fn drop(&mut self) {
        tracing::debug!(media_id = %self.id, name = %self.name, "releasing media handle");
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaInfo {
    pub id: Uuid,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

// ---------------------------------------------------------------------------
// Thumbnails
// ---------------------------------------------------------------------------

/// A still frame for the timeline strip, JPEG encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub time: f64,
    pub jpeg: Vec<u8>,
}

/// Frames to extract once a media duration is known.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailPlan {
    pub media_id: Uuid,
    pub times: Vec<f64>,
}

// ---------------------------------------------------------------------------
// ExportJob
// ---------------------------------------------------------------------------

/// Snapshot handed to the exporter. The trim range and overlays are carried
/// along but the exporter never applies them: the output is the original
/// media bytes.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub media_id: Uuid,
    pub source_name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
    pub trim_range: Option<TrimRange>,
    pub overlays: Vec<TextOverlay>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
