use serde::{Deserialize, Serialize};

/// Tracker-assigned identifier of a detected object.
pub type TrackId = i64;

/// A detection awaiting human correctness feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub track_id: TrackId,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
    /// Backend timestamp, kept verbatim; formatting is a view concern.
    pub timestamp: String,
}

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Icon name shown next to the toast message.
    pub fn icon(self) -> &'static str {
        match self {
            Severity::Success => "check-circle",
            Severity::Error => "exclamation-circle",
            Severity::Warning => "exclamation-triangle",
            Severity::Info => "info-circle",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
