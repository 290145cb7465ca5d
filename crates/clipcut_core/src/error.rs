use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not a video file: {0}")]
    InvalidMediaType(String),

    #[error("No video loaded")]
    NoMedia,

    #[error("Video duration is not known yet")]
    DurationUnknown,

    #[error("Overlay text must not be empty")]
    EmptyOverlayText,

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Playback was rejected by the environment")]
    AutoplayRejected,

    #[error("Export failed: {0}")]
    ExportFailure(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
