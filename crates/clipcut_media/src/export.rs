//! Producing the download.
//!
//! There is no processing backend: after an artificial delay the exporter
//! hands back the original media bytes. The trim range and overlays in the
//! job are NOT applied to the output.

use clipcut_core::types::ExportJob;
use clipcut_core::CoreError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{MediaError, Result};
use crate::source::extension_for;

/// The file a finished export produces.
#[derive(Debug, Clone)]
pub struct ExportedVideo {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl ExportedVideo {
    /// Write the video into `dir` under its generated name.
    pub async fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.bytes[..]).await?;
        tracing::info!(path = %path.display(), size = self.bytes.len(), "video saved");
        Ok(path)
    }
}

/// `edited_video_<unix_epoch_ms>.<ext>`
pub fn export_file_name(source_name: &str, epoch_ms: u128) -> String {
    format!("edited_video_{epoch_ms}.{}", extension_for(source_name))
}

/// Runs one export at a time and tracks whether one is in flight.
#[derive(Debug)]
pub struct Exporter {
    delay: Duration,
    processing: AtomicBool,
}

/// Clears the processing flag however the export ends.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Exporter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            processing: AtomicBool::new(false),
        }
    }

    pub fn from_delay_ms(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// Wait out the simulated processing time and return the original bytes.
    ///
    /// The job is a snapshot, so edits made while this runs do not reach it.
    /// There is no cancellation.
    pub async fn export(&self, job: ExportJob) -> Result<ExportedVideo> {
        let _guard = self.begin()?;
        self.run(job).await
    }

    /// Export and perform the download into `dir`.
    ///
    /// Any failure along the way is reported as `ExportFailure`.
    pub async fn export_to(&self, job: ExportJob, dir: &Path) -> Result<PathBuf> {
        let _guard = self.begin()?;
        let result = match self.run(job).await {
            Ok(video) => video.save_to(dir).await,
            Err(e) => Err(e),
        };
        result.map_err(|e| {
            tracing::warn!(error = %e, "export failed");
            MediaError::Core(CoreError::ExportFailure(e.to_string()))
        })
    }

    fn begin(&self) -> Result<ProcessingGuard<'_>> {
        if self.processing.swap(true, Ordering::SeqCst) {
            return Err(MediaError::ExportInProgress);
        }
        Ok(ProcessingGuard(&self.processing))
    }

    async fn run(&self, job: ExportJob) -> Result<ExportedVideo> {
        tracing::info!(
            media_id = %job.media_id,
            trimmed = job.trim_range.is_some(),
            overlays = job.overlays.len(),
            "exporting original media; edits are not applied"
        );
        tokio::time::sleep(self.delay).await;

        let epoch_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        Ok(ExportedVideo {
            file_name: export_file_name(&job.source_name, epoch_ms),
            mime_type: job.mime_type,
            bytes: job.bytes,
        })
    }
}
