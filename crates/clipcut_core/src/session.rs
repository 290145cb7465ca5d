use crate::config::{EditorConfig, MIN_SPAN};
use crate::error::{CoreError, Result};
use crate::overlay::OverlayList;
use crate::time::{clamp_time, format_coarse};
use crate::timeline::{self, TimeMarker, TimelineEvent};
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Playback surface the session drives.
pub trait Player {
    /// Start playback. Environments that refuse programmatic playback return
    /// `CoreError::AutoplayRejected`.
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);
}

/// In-memory state of one editing session.
///
/// Without media every other field sits at its default. Loading media resets
/// everything in one step and releases the previous handle.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    media: Option<MediaHandle>,
    duration: f64,
    current_time: f64,
    is_playing: bool,
    overlays: OverlayList,
    trim_range: Option<TrimRange>,
    trim_editing: bool,
    thumbnails: Vec<Thumbnail>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            media: None,
            duration: 0.0,
            current_time: 0.0,
            is_playing: false,
            overlays: OverlayList::new(),
            trim_range: None,
            trim_editing: false,
            thumbnails: Vec::new(),
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn media(&self) -> Option<&MediaHandle> {
        self.media.as_ref()
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn overlays(&self) -> &OverlayList {
        &self.overlays
    }

    pub fn trim_range(&self) -> Option<TrimRange> {
        self.trim_range
    }

    pub fn is_trim_editing(&self) -> bool {
        self.trim_editing
    }

    pub fn thumbnails(&self) -> &[Thumbnail] {
        &self.thumbnails
    }

    // -- media --------------------------------------------------------------

    /// Accept a new video, superseding and releasing the current one.
    ///
    /// Non-video sources are rejected with `InvalidMediaType` and leave the
    /// session untouched.
    pub fn load_media(&mut self, source: MediaSource) -> Result<&MediaHandle> {
        if !source.is_video() {
            tracing::warn!(name = %source.name, mime = %source.mime_type, "rejected non-video file");
            return Err(CoreError::InvalidMediaType(source.mime_type));
        }

        self.reset_state();
        let handle = MediaHandle::from_source(source);
        tracing::info!(media_id = %handle.id, name = %handle.name, "video loaded");
        let handle: &MediaHandle = self.media.insert(handle);
        Ok(handle)
    }

    /// End the session, releasing the media handle.
    pub fn close(&mut self) {
        if self.media.is_some() {
            tracing::info!("closing editing session");
        }
        self.reset_state();
    }

    /// Record the media duration once metadata is available.
    ///
    /// Returns the frames to extract for the thumbnail strip; the caller runs
    /// the extraction and hands the result to `set_thumbnails`.
    pub fn resolve_duration(&mut self, duration: f64) -> Option<ThumbnailPlan> {
        let media_id = self.media.as_ref()?.id;
        if !duration.is_finite() || duration <= 0.0 {
            tracing::warn!(duration, "ignoring unusable media duration");
            return None;
        }

        self.duration = duration;
        self.current_time = clamp_time(self.current_time, duration);
        self.thumbnails.clear();

        let count = self.config.thumbnail_count;
        let interval = duration / count.max(1) as f64;
        let times = (0..count).map(|i| i as f64 * interval).collect();
        Some(ThumbnailPlan { media_id, times })
    }

    /// Store generated thumbnails. Results for media that has since been
    /// replaced are dropped.
    pub fn set_thumbnails(&mut self, media_id: uuid::Uuid, thumbnails: Vec<Thumbnail>) -> bool {
        match &self.media {
            Some(media) if media.id == media_id => {
                self.thumbnails = thumbnails;
                true
            }
            _ => {
                tracing::debug!(%media_id, "discarding thumbnails for stale media");
                false
            }
        }
    }

    // -- playback -----------------------------------------------------------

    pub fn seek(&mut self, t: f64) {
        self.current_time = clamp_time(t, self.duration);
    }

    /// Time reported by the player while it runs.
    pub fn on_player_time(&mut self, t: f64) {
        self.seek(t);
    }

    /// Whether the player has drifted far enough from the session time that
    /// it should be re-seeked.
    pub fn needs_player_resync(&self, player_time: f64) -> bool {
        (player_time - self.current_time).abs() >= self.config.playback_resync_threshold
    }

    /// Start playback. A refusal from the environment leaves the session
    /// paused and is not reported as an error.
    pub fn play(&mut self, player: &mut impl Player) {
        if self.media.is_none() {
            return;
        }
        self.is_playing = true;
        match player.play() {
            Ok(()) => {}
            Err(CoreError::AutoplayRejected) => {
                tracing::debug!("playback rejected, staying paused");
                self.is_playing = false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "playback failed");
                self.is_playing = false;
            }
        }
    }

    pub fn pause(&mut self, player: &mut impl Player) {
        if self.is_playing {
            player.pause();
        }
        self.is_playing = false;
    }

    /// Jump back to the trim in-point, or to 0 without a trim range.
    pub fn reset_to_start(&mut self) {
        let start = self.trim_range.map_or(0.0, |r| r.start_time);
        self.seek(start);
    }

    // -- overlays -----------------------------------------------------------

    /// Add an overlay at the playhead.
    pub fn add_overlay(&mut self, text: &str, style: OverlayStyle) -> Result<OverlayId> {
        if self.media.is_none() {
            return Err(CoreError::NoMedia);
        }
        let overlay = TextOverlay::new(text, self.current_time, self.duration, style)?;
        let id = overlay.id;
        tracing::info!(overlay_id = %id, start = overlay.start_time, end = overlay.end_time, "text overlay added");
        self.overlays.push(overlay);
        Ok(id)
    }

    /// Add an overlay with the configured default style.
    pub fn add_overlay_with_defaults(&mut self, text: &str) -> Result<OverlayId> {
        let style = self.config.default_overlay_style;
        self.add_overlay(text, style)
    }

    /// Merge `patch` into an overlay. Unknown ids are ignored.
    pub fn update_overlay(&mut self, id: OverlayId, patch: OverlayPatch) {
        if !self.overlays.update(id, patch, self.duration) {
            tracing::debug!(overlay_id = %id, "update for unknown overlay ignored");
        }
    }

    /// Remove an overlay. Unknown ids are ignored.
    pub fn delete_overlay(&mut self, id: OverlayId) {
        if self.overlays.remove(id).is_some() {
            tracing::info!(overlay_id = %id, "text overlay removed");
        }
    }

    pub fn set_overlay_start_to_current(&mut self, id: OverlayId) {
        if let Some(updated) = self.overlays.get(id).map(|o| o.with_start_at(self.current_time)) {
            self.overlays.replace(updated);
        }
    }

    pub fn set_overlay_end_to_current(&mut self, id: OverlayId) {
        if let Some(updated) = self.overlays.get(id).map(|o| o.with_end_at(self.current_time)) {
            self.overlays.replace(updated);
        }
    }

    /// Overlays showing at the playhead. Nothing shows until the duration
    /// has been resolved.
    pub fn visible_overlays(&self) -> impl Iterator<Item = &TextOverlay> {
        let ready = self.duration > 0.0;
        self.overlays
            .visible_at(self.current_time)
            .filter(move |_| ready)
    }

    // -- trim ---------------------------------------------------------------

    /// Replace the trim range. When the in-point changes (or a range appears)
    /// the playhead moves to it in the same step.
    pub fn set_trim_range(&mut self, range: Option<TrimRange>) {
        let previous = self.trim_range;
        self.trim_range = range;
        if let Some(new) = range {
            if previous.map_or(true, |p| p.start_time != new.start_time) {
                self.seek(new.start_time);
            }
        }
    }

    /// Enter trim mode with a range seeded around the playhead. Does nothing
    /// until the media is known to be at least `MIN_SPAN` long.
    pub fn begin_trim(&mut self) {
        if self.media.is_none() || self.duration < MIN_SPAN {
            return;
        }
        let range = TrimRange::begin(self.current_time, self.duration);
        self.set_trim_range(Some(range));
        self.trim_editing = true;
    }

    /// Leave trim mode and discard the range.
    pub fn cancel_trim(&mut self) {
        self.set_trim_range(None);
        self.trim_editing = false;
    }

    /// Leave trim mode keeping the range. Nothing is applied to the media.
    pub fn confirm_trim(&mut self) {
        self.trim_editing = false;
    }

    pub fn set_trim_start_to_current(&mut self) {
        if let Some(range) = self.trim_range {
            self.set_trim_range(Some(range.with_start(self.current_time)));
        }
    }

    pub fn set_trim_end_to_current(&mut self) {
        if let Some(range) = self.trim_range {
            self.set_trim_range(Some(range.with_end(self.current_time)));
        }
    }

    /// Route a timeline pointer event to the matching mutation.
    pub fn apply_timeline_event(&mut self, event: TimelineEvent) {
        match event {
            TimelineEvent::Seek { time } => self.seek(time),
            TimelineEvent::TrimChanged { range } => self.set_trim_range(Some(range)),
        }
    }

    // -- export -------------------------------------------------------------

    /// Snapshot for the exporter.
    ///
    /// The export writes the original media bytes unchanged: trim and
    /// overlays are recorded in the job but not burned into the output.
    pub fn export_job(&self) -> Result<ExportJob> {
        let media = self.media.as_ref().ok_or(CoreError::NoMedia)?;
        Ok(ExportJob {
            media_id: media.id,
            source_name: media.name.clone(),
            mime_type: media.mime_type.clone(),
            bytes: media.bytes.clone(),
            trim_range: self.trim_range,
            overlays: self.overlays.to_vec(),
        })
    }

    // -- view ---------------------------------------------------------------

    /// Everything the front end needs to render the editor.
    pub fn view(&self) -> SessionView {
        let (trim_start_percent, trim_end_percent) =
            timeline::trim_percents(self.trim_range, self.duration);
        SessionView {
            media: self.media.as_ref().map(MediaHandle::info),
            duration: self.duration,
            current_time: self.current_time,
            is_playing: self.is_playing,
            overlays: self.overlays.to_vec(),
            visible_overlay_ids: self.visible_overlays().map(|o| o.id).collect(),
            trim_range: self.trim_range,
            trim_editing: self.trim_editing,
            trim_summary: self.trim_range.map(|r| TrimSummary {
                start_label: format_coarse(r.start_time),
                end_label: format_coarse(r.end_time),
                selected_label: format_coarse(r.length()),
                original_label: format_coarse(self.duration),
            }),
            progress_percent: timeline::progress_percent(self.current_time, self.duration),
            trim_start_percent,
            trim_end_percent,
            markers: timeline::time_markers(self.duration),
            thumbnail_count: self.thumbnails.len(),
            current_label: format_coarse(self.current_time),
            duration_label: format_coarse(self.duration),
        }
    }

    fn reset_state(&mut self) {
        // Dropping the old handle releases it.
        self.media = None;
        self.duration = 0.0;
        self.current_time = 0.0;
        self.is_playing = false;
        self.overlays.clear();
        self.trim_range = None;
        self.trim_editing = false;
        self.thumbnails.clear();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrimSummary {
    pub start_label: String,
    pub end_label: String,
    pub selected_label: String,
    pub original_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionView {
    pub media: Option<MediaInfo>,
    pub duration: f64,
    pub current_time: f64,
    pub is_playing: bool,
    pub overlays: Vec<TextOverlay>,
    pub visible_overlay_ids: Vec<OverlayId>,
    pub trim_range: Option<TrimRange>,
    pub trim_editing: bool,
    pub trim_summary: Option<TrimSummary>,
    pub progress_percent: f64,
    pub trim_start_percent: f64,
    pub trim_end_percent: f64,
    pub markers: Vec<TimeMarker>,
    pub thumbnail_count: usize,
    pub current_label: String,
    pub duration_label: String,
}
