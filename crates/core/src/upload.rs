//! Upload candidates and their local validation.
//!
//! An [`UploadJob`] is created when the operator picks or drops a file
//! and is discarded once the transfer settles. Validation happens before
//! any network call.

use std::path::{Path, PathBuf};

/// Declared MIME types the backend accepts.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "video/mp4",
    "video/avi",
    "video/mov",
    "video/mkv",
    "video/webm",
    "video/x-flv",
];

/// Largest accepted upload: 500 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Why a candidate file was refused before upload.
///
/// The `Display` text is the exact message shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("File format not supported!")]
    UnsupportedFormat { mime: String },

    #[error("File too large! Maximum 500MB.")]
    TooLarge { size: u64 },
}

/// A file chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    /// Declared MIME type, as a browser would report it for the file.
    pub mime: String,
}

impl UploadJob {
    pub fn new(path: impl Into<PathBuf>, size: u64, mime: impl Into<String>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            file_name,
            size,
            mime: mime.into(),
        }
    }

    /// Build a job for `path`, declaring the MIME type from its extension.
    pub fn with_declared_type(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let mime = declared_mime(&path);
        Self::new(path, size, mime)
    }

    /// Check format first, then size.
    pub fn validate(&self) -> Result<(), UploadRejection> {
        if !ALLOWED_MIME_TYPES.contains(&self.mime.as_str()) {
            return Err(UploadRejection::UnsupportedFormat {
                mime: self.mime.clone(),
            });
        }
        if self.size > MAX_UPLOAD_BYTES {
            return Err(UploadRejection::TooLarge { size: self.size });
        }
        Ok(())
    }
}

/// MIME type a browser would declare for a file with this extension.
pub fn declared_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" => "video/mp4",
        "avi" => "video/avi",
        "mov" => "video/mov",
        "mkv" => "video/mkv",
        "webm" => "video/webm",
        "flv" => "video/x-flv",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
