//! Video library records and the processing status lifecycle.

use serde::{Deserialize, Serialize};

/// Server-side processing stage of an uploaded video.
///
/// Unknown values coming from the backend are preserved in
/// [`VideoStatus::Other`] so that rendering never fails on a status the
/// client does not know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VideoStatus {
    Pending,
    Processing,
    Completed,
    Error,
    Other(String),
}

impl VideoStatus {
    /// Wire value as sent by the backend.
    pub fn as_str(&self) -> &str {
        match self {
            VideoStatus::Pending => "pending",
            VideoStatus::Processing => "processing",
            VideoStatus::Completed => "completed",
            VideoStatus::Error => "error",
            VideoStatus::Other(raw) => raw,
        }
    }

    /// Display label for the status badge. Unrecognised values pass
    /// through verbatim.
    pub fn label(&self) -> &str {
        match self {
            VideoStatus::Completed => "Completed",
            VideoStatus::Processing => "Processing",
            VideoStatus::Error => "Error",
            VideoStatus::Pending => "Pending",
            VideoStatus::Other(raw) => raw,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, VideoStatus::Completed)
    }
}

impl From<String> for VideoStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => VideoStatus::Pending,
            "processing" => VideoStatus::Processing,
            "completed" => VideoStatus::Completed,
            "error" => VideoStatus::Error,
            _ => VideoStatus::Other(raw),
        }
    }
}

impl From<VideoStatus> for String {
    fn from(status: VideoStatus) -> Self {
        status.as_str().to_string()
    }
}

/// One entry of the video library. `filename` is the unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub filename: String,
    pub size_mb: f64,
    #[serde(rename = "pizza_count", default)]
    pub detected_count: u64,
    pub status: VideoStatus,
    #[serde(default)]
    pub processed_at: Option<String>,
}

impl VideoRecord {
    /// The stream action is only offered for fully processed videos.
    pub fn can_stream(&self) -> bool {
        self.status.is_completed()
    }
}

/// Envelope returned by `GET /api/videos`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub videos: Vec<VideoRecord>,
}
