mod state;

pub use state::{AppState, DocumentListeners};

use anyhow::Context;
use clipcut_core::overlay::layout_for;
use clipcut_core::timeline::{TrackGeometry, TrimHandle};
use clipcut_core::types::{MediaSource, OverlayId, OverlayPatch, OverlayStyle};
use clipcut_core::{CoreError, EditorConfig, EditorSession, Player};
use clipcut_media::thumbnails::{generate_thumbnails, to_data_url, FfmpegFrameExtractor};
use clipcut_media::MediaError;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

const THUMBNAIL_WIDTH: u32 = 160;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// `info` level.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .try_init()
        .ok();
}

/// Build the host state. `config_json` may override any editor setting.
pub fn setup(config_json: Option<&str>, download_dir: impl Into<PathBuf>) -> anyhow::Result<AppState> {
    let config = match config_json {
        Some(json) => EditorConfig::from_json(json).context("invalid editor config")?,
        None => EditorConfig::default(),
    };
    let download_dir = download_dir.into();
    anyhow::ensure!(
        download_dir.is_dir(),
        "download directory {} does not exist",
        download_dir.display()
    );
    tracing::info!(download_dir = %download_dir.display(), "clipcut host ready");
    Ok(AppState::new(config, download_dir))
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, String> {
    m.lock().map_err(|e| e.to_string())
}

fn view(session: &EditorSession) -> Result<serde_json::Value, String> {
    serde_json::to_value(session.view()).map_err(|e| e.to_string())
}

fn parse_overlay_id(id: &str) -> Result<OverlayId, String> {
    id.parse().map_err(|e: uuid::Error| e.to_string())
}

fn load_error(e: CoreError) -> String {
    match e {
        CoreError::InvalidMediaType(_) => "Please select a valid video file".to_string(),
        other => other.to_string(),
    }
}

/// Playback outcome as reported by the webview's video element.
struct ReportedPlayback {
    rejected: bool,
}

impl Player for ReportedPlayback {
    fn play(&mut self) -> clipcut_core::Result<()> {
        if self.rejected {
            Err(CoreError::AutoplayRejected)
        } else {
            Ok(())
        }
    }

    fn pause(&mut self) {}
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

pub fn load_video(path: String, state: &AppState) -> Result<serde_json::Value, String> {
    tracing::info!(%path, "load_video called");
    let source = clipcut_media::source::read_source(&path).map_err(|e| e.to_string())?;
    let mut session = lock(&state.session)?;
    session.load_media(source).map_err(load_error)?;
    lock(&state.timeline)?.pointer_up();
    view(&session)
}

pub fn load_video_bytes(
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
    state: &AppState,
) -> Result<serde_json::Value, String> {
    tracing::info!(%name, %mime_type, "load_video_bytes called");
    let mut session = lock(&state.session)?;
    session
        .load_media(MediaSource::new(name, mime_type, bytes))
        .map_err(load_error)?;
    lock(&state.timeline)?.pointer_up();
    view(&session)
}

/// Called once the player knows the duration. Fills the thumbnail strip when
/// the video lives on disk; extraction failures leave the strip empty.
pub async fn resolve_duration(duration: f64, state: &AppState) -> Result<serde_json::Value, String> {
    let (plan, source_path, quality) = {
        let mut session = lock(&state.session)?;
        let plan = session.resolve_duration(duration);
        let path = session.media().and_then(|m| m.path.clone());
        (plan, path, session.config().jpeg_quality)
    };

    if let (Some(plan), Some(path)) = (plan, source_path) {
        let mut extractor = FfmpegFrameExtractor::new(path, THUMBNAIL_WIDTH, quality);
        match generate_thumbnails(&mut extractor, &plan).await {
            Ok(thumbnails) => {
                lock(&state.session)?.set_thumbnails(plan.media_id, thumbnails);
            }
            Err(e) => tracing::warn!(error = %e, "thumbnail generation failed"),
        }
    }

    view(&*lock(&state.session)?)
}

pub fn get_thumbnails(state: &AppState) -> Result<Vec<String>, String> {
    let session = lock(&state.session)?;
    Ok(session.thumbnails().iter().map(to_data_url).collect())
}

pub fn close_session(state: &AppState) -> Result<serde_json::Value, String> {
    let mut session = lock(&state.session)?;
    session.close();
    lock(&state.timeline)?.pointer_up();
    view(&session)
}

pub fn get_session(state: &AppState) -> Result<serde_json::Value, String> {
    view(&*lock(&state.session)?)
}

// ---------------------------------------------------------------------------
// Playback
// ---------------------------------------------------------------------------

pub fn seek(time: f64, state: &AppState) -> Result<serde_json::Value, String> {
    let mut session = lock(&state.session)?;
    session.seek(time);
    view(&session)
}

/// Player `timeupdate`. Returns whether the player should be re-seeked to the
/// session time instead.
pub fn player_time_update(time: f64, state: &AppState) -> Result<bool, String> {
    let mut session = lock(&state.session)?;
    let resync = session.is_playing() && session.needs_player_resync(time);
    if !resync {
        session.on_player_time(time);
    }
    Ok(resync)
}

pub fn play(autoplay_rejected: bool, state: &AppState) -> Result<serde_json::Value, String> {
    let mut session = lock(&state.session)?;
    session.play(&mut ReportedPlayback {
        rejected: autoplay_rejected,
    });
    view(&session)
}

pub fn pause(state: &AppState) -> Result<serde_json::Value, String> {
    let mut session = lock(&state.session)?;
    session.pause(&mut ReportedPlayback { rejected: false });
    view(&session)
}

pub fn reset_to_start(state: &AppState) -> Result<serde_json::Value, String> {
    let mut session = lock(&state.session)?;
    session.reset_to_start();
    view(&session)
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

pub fn timeline_pointer_down(
    client_x: f64,
    track: TrackGeometry,
    state: &AppState,
) -> Result<serde_json::Value, String> {
    let mut session = lock(&state.session)?;
    let event = lock(&state.timeline)?.pointer_down_track(client_x, track, session.duration());
    session.apply_timeline_event(event);
    view(&session)
}

pub fn timeline_handle_down(handle: TrimHandle, state: &AppState) -> Result<(), String> {
    lock(&state.timeline)?.pointer_down_handle(handle);
    Ok(())
}

pub fn timeline_pointer_move(
    client_x: f64,
    track: TrackGeometry,
    state: &AppState,
) -> Result<serde_json::Value, String> {
    let mut session = lock(&state.session)?;
    let event = lock(&state.timeline)?.pointer_move(
        client_x,
        track,
        session.duration(),
        session.trim_range(),
    );
    if let Some(event) = event {
        session.apply_timeline_event(event);
    }
    view(&session)
}

pub fn timeline_pointer_up(state: &AppState) -> Result<(), String> {
    lock(&state.timeline)?.pointer_up();
    Ok(())
}

/// Whether document-level pointer events should currently be forwarded.
pub fn timeline_listening(state: &AppState) -> Result<bool, String> {
    Ok(lock(&state.timeline)?.listeners().is_attached())
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

pub fn add_text_overlay(
    text: String,
    style: Option<OverlayStyle>,
    state: &AppState,
) -> Result<serde_json::Value, String> {
    let mut session = lock(&state.session)?;
    let style = style.unwrap_or(session.config().default_overlay_style);
    session.add_overlay(&text, style).map_err(|e| e.to_string())?;
    view(&session)
}

pub fn update_text_overlay(
    id: String,
    patch: OverlayPatch,
    state: &AppState,
) -> Result<serde_json::Value, String> {
    let id = parse_overlay_id(&id)?;
    let mut session = lock(&state.session)?;
    session.update_overlay(id, patch);
    view(&session)
}

pub fn delete_text_overlay(id: String, state: &AppState) -> Result<serde_json::Value, String> {
    let id = parse_overlay_id(&id)?;
    let mut session = lock(&state.session)?;
    session.delete_overlay(id);
    view(&session)
}

pub fn set_overlay_start_to_current(id: String, state: &AppState) -> Result<serde_json::Value, String> {
    let id = parse_overlay_id(&id)?;
    let mut session = lock(&state.session)?;
    session.set_overlay_start_to_current(id);
    view(&session)
}

pub fn set_overlay_end_to_current(id: String, state: &AppState) -> Result<serde_json::Value, String> {
    let id = parse_overlay_id(&id)?;
    let mut session = lock(&state.session)?;
    session.set_overlay_end_to_current(id);
    view(&session)
}

/// Style declarations for drawing an overlay over the player.
pub fn get_overlay_layout(id: String, state: &AppState) -> Result<serde_json::Value, String> {
    let id = parse_overlay_id(&id)?;
    let session = lock(&state.session)?;
    let overlay = session.overlays().get(id).ok_or("Overlay not found")?;
    let mut css: serde_json::Map<String, serde_json::Value> = layout_for(overlay.position)
        .css()
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.into()))
        .collect();
    css.insert("fontSize".into(), format!("{}px", overlay.font_size).into());
    css.insert("color".into(), overlay.color.to_string().into());
    Ok(serde_json::Value::Object(css))
}

// ---------------------------------------------------------------------------
// Trim
// ---------------------------------------------------------------------------

pub fn begin_trim(state: &AppState) -> Result<serde_json::Value, String> {
    let mut session = lock(&state.session)?;
    session.begin_trim();
    view(&session)
}

pub fn cancel_trim(state: &AppState) -> Result<serde_json::Value, String> {
    let mut session = lock(&state.session)?;
    session.cancel_trim();
    view(&session)
}

pub fn confirm_trim(state: &AppState) -> Result<serde_json::Value, String> {
    let mut session = lock(&state.session)?;
    session.confirm_trim();
    view(&session)
}

pub fn set_trim_start_to_current(state: &AppState) -> Result<serde_json::Value, String> {
    let mut session = lock(&state.session)?;
    session.set_trim_start_to_current();
    view(&session)
}

pub fn set_trim_end_to_current(state: &AppState) -> Result<serde_json::Value, String> {
    let mut session = lock(&state.session)?;
    session.set_trim_end_to_current();
    view(&session)
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Save the video into the download directory and return its path.
///
/// The saved file is the original upload: trim and overlays are not applied.
pub async fn export_video(state: &AppState) -> Result<String, String> {
    let job = lock(&state.session)?
        .export_job()
        .map_err(|_| "No video to download".to_string())?;

    match state.exporter.export_to(job, &state.download_dir).await {
        Ok(path) => Ok(path.to_string_lossy().into_owned()),
        Err(MediaError::ExportInProgress) => Err("Export already in progress".into()),
        Err(_) => Err("Failed to process video".into()),
    }
}

pub fn is_exporting(state: &AppState) -> bool {
    state.exporter.is_processing()
}
