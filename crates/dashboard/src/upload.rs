//! Upload pipeline: validate a candidate file, stream it to the backend
//! while reporting progress, then hand off to the refresh scheduler.

use std::sync::Arc;

use tokio::sync::mpsc;

use pizzawatch_client::deadline::within;
use pizzawatch_client::{ApiError, TransferProgress};
use pizzawatch_core::{UploadJob, UploadRejection};

use crate::context::DashboardContext;
use crate::refresh::{Feed, RefreshHandle};
use crate::view;

pub const UPLOAD_SUCCESS: &str = "Upload successful! Processing video…";
pub const UPLOAD_CONNECTION_ERROR: &str = "Connection error! Please try again.";
pub const UPLOAD_FAILED: &str = "An error occurred during upload!";

/// How one call to [`UploadPipeline::upload`] settled.
#[derive(Debug)]
pub enum UploadOutcome {
    /// Refused locally; nothing was sent.
    Rejected(UploadRejection),
    /// The backend accepted the file.
    Accepted,
    /// The transfer was attempted and failed.
    Failed(ApiError),
}

pub struct UploadPipeline {
    ctx: Arc<DashboardContext>,
    refresh: RefreshHandle,
}

impl UploadPipeline {
    pub fn new(ctx: Arc<DashboardContext>, refresh: RefreshHandle) -> Self {
        Self { ctx, refresh }
    }

    /// Validate and transmit `job`.
    ///
    /// Progress is shown as it arrives and never moves backwards. On
    /// success the progress indicator stays up with the processing label
    /// until the grace delay elapses and the video library is invalidated.
    /// Nothing is retried.
    pub async fn upload(&self, job: UploadJob) -> UploadOutcome {
        let ctx = &self.ctx;

        if let Err(rejection) = job.validate() {
            tracing::info!(file = %job.file_name, mime = %job.mime, size = job.size, %rejection, "Upload rejected");
            ctx.notifications.error(rejection.to_string());
            return UploadOutcome::Rejected(rejection);
        }

        tracing::info!(file = %job.file_name, size = job.size, "Upload started");
        ctx.view.show_upload_progress(0.0, view::UPLOADING);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let transfer = within(ctx.config.upload_timeout, ctx.backend.upload_video(&job, tx));
        tokio::pin!(transfer);

        let mut shown = 0.0;
        let result = loop {
            tokio::select! {
                biased;
                Some(progress) = rx.recv() => self.show_progress(&mut shown, progress),
                result = &mut transfer => break result,
            }
        };
        // Signals queued before the response settled still precede completion.
        while let Ok(progress) = rx.try_recv() {
            self.show_progress(&mut shown, progress);
        }

        match result {
            Ok(receipt) => {
                tracing::info!(
                    file = %job.file_name,
                    stored_as = receipt.filename.as_deref().unwrap_or(&job.file_name),
                    "Upload accepted",
                );
                ctx.notifications.success(UPLOAD_SUCCESS);
                ctx.view.show_upload_progress(shown, view::PROCESSING);
                self.finish_after_grace();
                UploadOutcome::Accepted
            }
            Err(e) => {
                tracing::warn!(file = %job.file_name, error = %e, "Upload failed");
                ctx.notifications.error(failure_message(&e));
                ctx.view.hide_upload_progress();
                UploadOutcome::Failed(e)
            }
        }
    }

    fn show_progress(&self, shown: &mut f64, progress: TransferProgress) {
        let Some(percent) = progress.percent() else {
            return;
        };
        if percent < *shown {
            return;
        }
        *shown = percent;
        self.ctx
            .view
            .show_upload_progress(percent, &view::progress_label(percent));
    }

    fn finish_after_grace(&self) {
        let ctx = Arc::clone(&self.ctx);
        let refresh = self.refresh.clone();
        let grace = ctx.config.upload_grace;
        self.ctx.spawn(async move {
            tokio::time::sleep(grace).await;
            refresh.invalidate(Feed::Videos);
            ctx.view.hide_upload_progress();
            ctx.view.clear_file_input();
        });
    }
}

/// Operator-facing text for a failed transfer.
pub fn failure_message(error: &ApiError) -> String {
    if error.is_transport() {
        return UPLOAD_CONNECTION_ERROR.to_string();
    }
    match error {
        ApiError::Application { message: Some(message), .. } => format!("Upload error: {message}"),
        _ => UPLOAD_FAILED.to_string(),
    }
}
