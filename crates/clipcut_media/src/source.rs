use clipcut_core::types::MediaSource;
use std::path::Path;

use crate::error::{MediaError, Result};

/// Read a file from disk into a `MediaSource`, classifying it by extension.
///
/// No check is made that the file is a video; the session does that so a
/// rejected file never touches its state.
pub fn read_source(path: impl AsRef<Path>) -> Result<MediaSource> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string());
    let mime = mime_for_path(path);

    tracing::debug!(path = %path.display(), mime, size = bytes.len(), "read media source");
    Ok(MediaSource::new(name, mime, bytes).with_path(path))
}

/// MIME type from a file extension, `application/octet-stream` when unknown.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "ogv" => "video/ogg",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// File extension to use for a download of `source_name`.
pub fn extension_for(source_name: &str) -> String {
    Path::new(source_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "mp4".to_string())
}
