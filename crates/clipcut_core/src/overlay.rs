use crate::config::{FONT_SIZE_MAX, FONT_SIZE_MIN, MIN_SPAN, OVERLAY_DURATION};
use crate::error::{CoreError, Result};
use crate::time::clamp_time;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Margin between the container edge and a top or bottom anchored overlay,
/// as a fraction of the container height.
pub const EDGE_MARGIN: f64 = 0.10;

impl TextOverlay {
    /// Create an overlay that starts at the playhead and lasts five seconds,
    /// cut short at the end of the media.
    ///
    /// When the playhead is too close to the end, the start is pulled back so
    /// the overlay still spans `MIN_SPAN`. Rejects text that is empty after
    /// trimming whitespace, and media too short (or not yet measured) to hold
    /// `MIN_SPAN`.
    pub fn new(
        text: impl Into<String>,
        current_time: f64,
        duration: f64,
        style: OverlayStyle,
    ) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CoreError::EmptyOverlayText);
        }
        if !(duration.is_finite() && duration >= MIN_SPAN) {
            return Err(CoreError::DurationUnknown);
        }

        let end_time = (current_time + OVERLAY_DURATION).min(duration);
        let start_time = if end_time - current_time < MIN_SPAN {
            (end_time - MIN_SPAN).max(0.0)
        } else {
            current_time
        };

        Ok(Self {
            id: OverlayId::new(),
            text,
            start_time,
            end_time,
            position: style.position,
            font_size: clamp_font_size(style.font_size),
            color: style.color,
        })
    }

    /// Visible on both boundary instants.
    pub fn is_visible(&self, current_time: f64) -> bool {
        self.start_time <= current_time && current_time <= self.end_time
    }

    /// Move the start to `t`, never closer than `MIN_SPAN` to the end and
    /// never before 0.
    pub fn with_start_at(&self, t: f64) -> Self {
        Self {
            start_time: t.min(self.end_time - MIN_SPAN).max(0.0),
            ..self.clone()
        }
    }

    /// Move the end to `t`, never closer than `MIN_SPAN` to the start.
    pub fn with_end_at(&self, t: f64) -> Self {
        Self {
            end_time: t.max(self.start_time + MIN_SPAN),
            ..self.clone()
        }
    }

    pub fn style(&self) -> OverlayStyle {
        OverlayStyle {
            position: self.position,
            font_size: self.font_size,
            color: self.color,
        }
    }

    /// Merge a partial update. Blank text is ignored so an overlay never loses
    /// its caption. Times are clamped to `[0, duration]` and then held
    /// `MIN_SPAN` apart, start first.
    pub fn apply(&mut self, patch: OverlayPatch, duration: f64) {
        if let Some(text) = patch.text {
            if text.trim().is_empty() {
                tracing::warn!(overlay_id = %self.id, "ignoring blank overlay text");
            } else {
                self.text = text;
            }
        }
        if let Some(t) = patch.start_time {
            *self = self.with_start_at(clamp_time(t, duration));
        }
        if let Some(t) = patch.end_time {
            *self = self.with_end_at(clamp_time(t, duration));
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(font_size) = patch.font_size {
            self.font_size = clamp_font_size(font_size);
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
    }
}

pub fn clamp_font_size(size: u32) -> u32 {
    size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX)
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerticalAnchor {
    /// Top edge of the text sits `margin` (fraction of height) below the container top.
    Top { margin: f64 },
    Center,
    /// Bottom edge of the text sits `margin` above the container bottom.
    Bottom { margin: f64 },
}

/// Where an overlay is drawn. Overlays are always centred horizontally.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Anchor {
    pub vertical: VerticalAnchor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

pub fn layout_for(position: OverlayPosition) -> Anchor {
    let vertical = match position {
        OverlayPosition::Top => VerticalAnchor::Top {
            margin: EDGE_MARGIN,
        },
        OverlayPosition::Center => VerticalAnchor::Center,
        OverlayPosition::Bottom => VerticalAnchor::Bottom {
            margin: EDGE_MARGIN,
        },
    };
    Anchor { vertical }
}

impl Anchor {
    /// Style declarations for an absolutely positioned element.
    pub fn css(&self) -> Vec<(&'static str, String)> {
        let percent = |m: f64| format!("{}%", (m * 100.0).round());
        match self.vertical {
            VerticalAnchor::Top { margin } => vec![
                ("top", percent(margin)),
                ("left", "50%".into()),
                ("transform", "translateX(-50%)".into()),
            ],
            VerticalAnchor::Center => vec![
                ("top", "50%".into()),
                ("left", "50%".into()),
                ("transform", "translate(-50%, -50%)".into()),
            ],
            VerticalAnchor::Bottom { margin } => vec![
                ("bottom", percent(margin)),
                ("left", "50%".into()),
                ("transform", "translateX(-50%)".into()),
            ],
        }
    }

    /// Top-left corner of a `text` box placed inside `container`.
    pub fn resolve(&self, container: Size, text: Size) -> (f64, f64) {
        let x = (container.width - text.width) / 2.0;
        let y = match self.vertical {
            VerticalAnchor::Top { margin } => container.height * margin,
            VerticalAnchor::Center => (container.height - text.height) / 2.0,
            VerticalAnchor::Bottom { margin } => {
                container.height - container.height * margin - text.height
            }
        };
        (x, y)
    }
}

// ---------------------------------------------------------------------------
// OverlayList
// ---------------------------------------------------------------------------

/// Overlays keyed by id, iterated in insertion order (display order, not time
/// order).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct OverlayList {
    items: Vec<TextOverlay>,
}

impl OverlayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, overlay: TextOverlay) {
        self.items.push(overlay);
    }

    pub fn get(&self, id: OverlayId) -> Option<&TextOverlay> {
        self.items.iter().find(|o| o.id == id)
    }

    /// Apply `patch` to the overlay with `id`. Returns false if there is none.
    pub fn update(&mut self, id: OverlayId, patch: OverlayPatch, duration: f64) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.items[idx].apply(patch, duration);
                true
            }
            None => false,
        }
    }

    /// Replace the overlay with the same id, keeping its slot.
    pub fn replace(&mut self, overlay: TextOverlay) -> bool {
        match self.position(overlay.id) {
            Some(idx) => {
                self.items[idx] = overlay;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: OverlayId) -> Option<TextOverlay> {
        self.position(id).map(|idx| self.items.remove(idx))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextOverlay> {
        self.items.iter()
    }

    pub fn visible_at(&self, current_time: f64) -> impl Iterator<Item = &TextOverlay> {
        self.items.iter().filter(move |o| o.is_visible(current_time))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn to_vec(&self) -> Vec<TextOverlay> {
        self.items.clone()
    }

    fn position(&self, id: OverlayId) -> Option<usize> {
        self.items.iter().position(|o| o.id == id)
    }
}
