//! [`reqwest`] implementation of [`DashboardBackend`].

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Url};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;

use pizzawatch_core::{
    DetectionClasses, DetectionRecord, ModelSettings, Statistics, TrackId, UploadJob, VideoList,
    VideoRecord,
};

use crate::backend::{DashboardBackend, FrameStream, UploadReceipt};
use crate::error::ApiError;
use crate::mjpeg;
use crate::progress::{report_progress, TransferProgress};

/// Multipart field the backend reads the upload from.
const UPLOAD_FIELD: &str = "video";

/// HTTP client for one backend instance.
pub struct DashboardApi {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Serialize)]
struct FeedbackBody {
    track_id: TrackId,
    is_correct: bool,
}

#[derive(Debug, Serialize)]
struct ClassesBody<'a> {
    classes: &'a [u32],
}

impl DashboardApi {
    /// Create a client for the backend at `base_url`, e.g.
    /// `http://host:5000`.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/api/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    // ---- private helpers ----

    /// Return the response unchanged on 2xx, otherwise an
    /// [`ApiError::Application`] built from the status and body.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::from_response_body(status.as_u16(), &body));
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let response = self.client.get(self.endpoint(segments)).send().await?;
        Self::parse_response(response).await
    }

    async fn post_json<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint(segments))
            .json(body)
            .send()
            .await?;
        Self::check_status(response).await
    }
}

#[async_trait]
impl DashboardBackend for DashboardApi {
    async fn upload_video(
        &self,
        job: &UploadJob,
        progress: mpsc::UnboundedSender<TransferProgress>,
    ) -> Result<UploadReceipt, ApiError> {
        let file = tokio::fs::File::open(&job.path).await?;
        let body = report_progress(ReaderStream::new(file), Some(job.size), progress);

        let part = Part::stream_with_length(Body::wrap_stream(body), job.size)
            .file_name(job.file_name.clone())
            .mime_str(&job.mime)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        tracing::info!(file = %job.file_name, size = job.size, "Uploading video");

        let response = self
            .client
            .post(self.endpoint(&["upload_video"]))
            .multipart(form)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        // The receipt is informational; an unexpected body is not a failure.
        let receipt = response.json::<UploadReceipt>().await.unwrap_or_default();
        Ok(receipt)
    }

    async fn get_stats(&self) -> Result<Statistics, ApiError> {
        self.get_json(&["stats"]).await
    }

    async fn get_videos(&self) -> Result<Vec<VideoRecord>, ApiError> {
        let list: VideoList = self.get_json(&["videos"]).await?;
        Ok(list.videos)
    }

    async fn get_detections(&self) -> Result<Vec<DetectionRecord>, ApiError> {
        self.get_json(&["detections"]).await
    }

    async fn submit_feedback(&self, track_id: TrackId, is_correct: bool) -> Result<(), ApiError> {
        self.post_json(&["feedback"], &FeedbackBody { track_id, is_correct })
            .await
    }

    async fn get_model_settings(&self) -> Result<ModelSettings, ApiError> {
        self.get_json(&["model_settings"]).await
    }

    async fn set_model_settings(&self, settings: ModelSettings) -> Result<(), ApiError> {
        self.post_json(&["model_settings"], &settings).await
    }

    async fn get_detection_classes(&self) -> Result<DetectionClasses, ApiError> {
        self.get_json(&["detection_classes"]).await
    }

    async fn set_detection_classes(&self, classes: &[u32]) -> Result<(), ApiError> {
        self.post_json(&["detection_classes"], &ClassesBody { classes })
            .await
    }

    async fn open_stream(&self, filename: &str) -> Result<FrameStream, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&["stream_video", filename]))
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let boundary = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(mjpeg::boundary_from_content_type)
            .unwrap_or_else(|| mjpeg::DEFAULT_BOUNDARY.to_string());

        tracing::debug!(filename, boundary = %boundary, "Stream response received");

        let body = response.bytes_stream().map_err(ApiError::from);
        Ok(mjpeg::frames(body, &boundary))
    }
}
