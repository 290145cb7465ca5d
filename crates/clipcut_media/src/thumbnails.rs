use async_trait::async_trait;
use base64::Engine;
use clipcut_core::types::{Thumbnail, ThumbnailPlan};
use std::path::{Path, PathBuf};

use crate::error::{MediaError, Result};

/// Seeks a decoding surface to a timestamp and rasterizes the frame shown.
///
/// Takes `&mut self`: one surface serves every request, so frames are
/// extracted strictly one after another.
#[async_trait]
pub trait FrameExtractor: Send {
    async fn extract_frame(&mut self, time_seconds: f64) -> Result<Vec<u8>>;
}

/// Extracts JPEG frames by piping a single frame out of `ffmpeg`.
#[derive(Debug, Clone)]
pub struct FfmpegFrameExtractor {
    source_path: PathBuf,
    width: u32,
    quality: f64,
}

impl FfmpegFrameExtractor {
    pub fn new(source_path: impl Into<PathBuf>, width: u32, quality: f64) -> Self {
        Self {
            source_path: source_path.into(),
            width,
            quality,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    fn args(&self, time_seconds: f64) -> Vec<String> {
        vec![
            "-ss".into(),
            format!("{time_seconds:.3}"),
            "-i".into(),
            self.source_path.to_string_lossy().into_owned(),
            "-vframes".into(),
            "1".into(),
            "-vf".into(),
            format!("scale={}:-1", self.width),
            "-q:v".into(),
            jpeg_qscale(self.quality).to_string(),
            "-f".into(),
            "image2pipe".into(),
            "-vcodec".into(),
            "mjpeg".into(),
            "pipe:1".into(),
        ]
    }
}

#[async_trait]
impl FrameExtractor for FfmpegFrameExtractor {
    async fn extract_frame(&mut self, time_seconds: f64) -> Result<Vec<u8>> {
        use std::process::Stdio;
        use tokio::process::Command;

        let output = Command::new("ffmpeg")
            .args(self.args(time_seconds))
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MediaError::FfmpegNotFound
                } else {
                    MediaError::Io(e)
                }
            })?;

        if !output.status.success() || output.stdout.is_empty() {
            return Err(MediaError::FfmpegFailed(format!(
                "frame extraction at {time_seconds:.3}s failed"
            )));
        }
        Ok(output.stdout)
    }
}

/// Map a 0.0..=1.0 JPEG quality onto ffmpeg's mjpeg qscale (2 best, 31 worst).
pub fn jpeg_qscale(quality: f64) -> u32 {
    let q = if quality.is_finite() {
        quality.clamp(0.0, 1.0)
    } else {
        1.0
    };
    (2.0 + (1.0 - q) * 29.0).round() as u32
}

/// Run a thumbnail plan, one frame at a time, in plan order.
pub async fn generate_thumbnails<E: FrameExtractor + ?Sized>(
    extractor: &mut E,
    plan: &ThumbnailPlan,
) -> Result<Vec<Thumbnail>> {
    let mut thumbnails = Vec::with_capacity(plan.times.len());
    for &time in &plan.times {
        let jpeg = extractor.extract_frame(time).await?;
        thumbnails.push(Thumbnail { time, jpeg });
    }
    tracing::debug!(media_id = %plan.media_id, count = thumbnails.len(), "thumbnails generated");
    Ok(thumbnails)
}

/// `data:` URL for showing a thumbnail in an `<img>`.
pub fn to_data_url(thumbnail: &Thumbnail) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(&thumbnail.jpeg);
    format!("data:image/jpeg;base64,{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use uuid::Uuid;

    /// Records call order and fails loudly if two extractions overlap.
    struct ScriptedExtractor {
        busy: Arc<AtomicBool>,
        calls: Vec<f64>,
        fail_at: Option<f64>,
    }

    impl ScriptedExtractor {
        fn new() -> Self {
            Self {
                busy: Arc::new(AtomicBool::new(false)),
                calls: Vec::new(),
                fail_at: None,
            }
        }
    }

    #[async_trait]
    impl FrameExtractor for ScriptedExtractor {
        async fn extract_frame(&mut self, time_seconds: f64) -> Result<Vec<u8>> {
            assert!(!self.busy.swap(true, Ordering::SeqCst), "overlapping extraction");
            tokio::task::yield_now().await;
            self.calls.push(time_seconds);
            self.busy.store(false, Ordering::SeqCst);
            if self.fail_at == Some(time_seconds) {
                return Err(MediaError::FfmpegFailed("scripted".into()));
            }
            Ok(vec![0xff, 0xd8, time_seconds as u8])
        }
    }

    fn plan(times: Vec<f64>) -> ThumbnailPlan {
        ThumbnailPlan {
            media_id: Uuid::new_v4(),
            times,
        }
    }

    #[tokio::test]
    async fn frames_are_extracted_in_plan_order() {
        let mut extractor = ScriptedExtractor::new();
        let thumbs = generate_thumbnails(&mut extractor, &plan(vec![0.0, 5.0, 10.0]))
            .await
            .unwrap();
        assert_eq!(extractor.calls, vec![0.0, 5.0, 10.0]);
        assert_eq!(thumbs.len(), 3);
        assert_eq!(thumbs[1].time, 5.0);
        assert_eq!(thumbs[2].jpeg, vec![0xff, 0xd8, 10]);
    }

    #[tokio::test]
    async fn a_failed_frame_stops_generation() {
        let mut extractor = ScriptedExtractor::new();
        extractor.fail_at = Some(5.0);
        let result = generate_thumbnails(&mut extractor, &plan(vec![0.0, 5.0, 10.0])).await;
        assert!(matches!(result, Err(MediaError::FfmpegFailed(_))));
        assert_eq!(extractor.calls, vec![0.0, 5.0]);
    }

    #[tokio::test]
    async fn empty_plan_yields_no_thumbnails() {
        let mut extractor = ScriptedExtractor::new();
        let thumbs = generate_thumbnails(&mut extractor, &plan(vec![])).await.unwrap();
        assert!(thumbs.is_empty());
    }

    #[test]
    fn qscale_mapping() {
        assert_eq!(jpeg_qscale(1.0), 2);
        assert_eq!(jpeg_qscale(0.8), 8);
        assert_eq!(jpeg_qscale(0.0), 31);
        assert_eq!(jpeg_qscale(7.0), 2);
        assert_eq!(jpeg_qscale(f64::NAN), 2);
    }

    #[test]
    fn ffmpeg_args_pipe_a_single_jpeg() {
        let extractor = FfmpegFrameExtractor::new("/media/clip.mp4", 160, 0.8);
        let args = extractor.args(12.5);
        assert_eq!(args[0..2], ["-ss".to_string(), "12.500".to_string()]);
        assert!(args.contains(&"/media/clip.mp4".to_string()));
        assert!(args.contains(&"scale=160:-1".to_string()));
        assert_eq!(args.last().unwrap(), "pipe:1");
    }

    #[test]
    fn data_url_is_base64_jpeg() {
        let thumb = Thumbnail {
            time: 0.0,
            jpeg: vec![0xff, 0xd8, 0xff],
        };
        assert_eq!(to_data_url(&thumb), "data:image/jpeg;base64,/9j/");
    }
}
