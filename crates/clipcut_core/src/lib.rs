//! Editing-session model for a browser video editor: timed text overlays,
//! a trim range, and the timeline drag interaction that edits them.
//!
//! Nothing here touches pixels. Trim and overlays are annotations on the
//! session; the export produced from an [`types::ExportJob`] is the original
//! media, unmodified.

pub mod config;
pub mod error;
pub mod overlay;
pub mod session;
pub mod time;
pub mod timeline;
pub mod trim;
pub mod types;

pub use config::EditorConfig;
pub use error::{CoreError, Result};
pub use session::{EditorSession, Player, SessionView};
