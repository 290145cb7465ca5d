//! Host-side collaborators for the editing session: reading user files,
//! extracting thumbnail frames, and producing the download.

pub mod error;
pub mod export;
pub mod source;
pub mod thumbnails;

pub use error::{MediaError, Result};
