use clipcut_core::timeline::{PointerListeners, TimelineInteraction};
use clipcut_core::{EditorConfig, EditorSession};
use clipcut_media::export::Exporter;
use std::path::PathBuf;
use std::sync::Mutex;

/// Tracks whether the webview should be forwarding document-level pointer
/// move/up events.
#[derive(Debug, Default)]
pub struct DocumentListeners {
    attached: bool,
}

impl DocumentListeners {
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

impl PointerListeners for DocumentListeners {
    fn attach(&mut self) {
        tracing::debug!("document pointer listeners attached");
        self.attached = true;
    }

    fn detach(&mut self) {
        tracing::debug!("document pointer listeners detached");
        self.attached = false;
    }
}

pub struct AppState {
    pub session: Mutex<EditorSession>,
    pub timeline: Mutex<TimelineInteraction<DocumentListeners>>,
    pub exporter: Exporter,
    pub download_dir: PathBuf,
}

impl AppState {
    pub fn new(config: EditorConfig, download_dir: impl Into<PathBuf>) -> Self {
        let exporter = Exporter::from_delay_ms(config.export_delay_ms);
        Self {
            session: Mutex::new(EditorSession::new(config)),
            timeline: Mutex::new(TimelineInteraction::new(DocumentListeners::default())),
            exporter,
            download_dir: download_dir.into(),
        }
    }
}
