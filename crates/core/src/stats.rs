use serde::{Deserialize, Serialize};

/// Default threshold shown when the backend omits it.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

fn default_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

/// Summary figures returned by `GET /api/stats`.
///
/// Missing fields default to zero (threshold to 0.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(rename = "total_pizzas", default)]
    pub total_detections: u64,
    #[serde(rename = "today_pizzas", default)]
    pub today_detections: u64,
    #[serde(default)]
    pub accuracy_percentage: f64,
    #[serde(default)]
    pub processing_videos: u64,
    #[serde(default = "default_threshold")]
    pub confidence_threshold: f64,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            total_detections: 0,
            today_detections: 0,
            accuracy_percentage: 0.0,
            processing_videos: 0,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Process-wide model settings mirrored from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub confidence_threshold: f64,
}
