//! The backend surface consumed by the dashboard.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::Deserialize;
use tokio::sync::mpsc;

use pizzawatch_core::{
    DetectionClasses, DetectionRecord, ModelSettings, Statistics, TrackId, UploadJob, VideoRecord,
};

use crate::error::ApiError;
use crate::progress::TransferProgress;

/// A live stream of annotated JPEG frames. Ends when the backend closes
/// the stream; an `Err` item is a stream error and is always last.
pub type FrameStream = BoxStream<'static, Result<Bytes, ApiError>>;

/// Body of a successful upload response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Request/response calls against the detection backend.
///
/// Every method is a single, independent call with no retries. Callers
/// own deadlines (see [`crate::deadline`]).
#[async_trait]
pub trait DashboardBackend: Send + Sync + 'static {
    /// `POST /api/upload_video` with the file in the `video` field.
    ///
    /// Progress signals are sent on `progress` while the body is being
    /// transmitted; the future resolves once the backend responds.
    async fn upload_video(
        &self,
        job: &UploadJob,
        progress: mpsc::UnboundedSender<TransferProgress>,
    ) -> Result<UploadReceipt, ApiError>;

    /// `GET /api/stats`
    async fn get_stats(&self) -> Result<Statistics, ApiError>;

    /// `GET /api/videos`
    async fn get_videos(&self) -> Result<Vec<VideoRecord>, ApiError>;

    /// `GET /api/detections`
    async fn get_detections(&self) -> Result<Vec<DetectionRecord>, ApiError>;

    /// `POST /api/feedback`
    async fn submit_feedback(&self, track_id: TrackId, is_correct: bool) -> Result<(), ApiError>;

    /// `GET /api/model_settings`
    async fn get_model_settings(&self) -> Result<ModelSettings, ApiError>;

    /// `POST /api/model_settings`
    async fn set_model_settings(&self, settings: ModelSettings) -> Result<(), ApiError>;

    /// `GET /api/detection_classes`
    async fn get_detection_classes(&self) -> Result<DetectionClasses, ApiError>;

    /// `POST /api/detection_classes`
    async fn set_detection_classes(&self, classes: &[u32]) -> Result<(), ApiError>;

    /// `GET /api/stream_video/{filename}`; resolves once the response
    /// headers arrive.
    async fn open_stream(&self, filename: &str) -> Result<FrameStream, ApiError>;
}
