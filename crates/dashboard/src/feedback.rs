//! Correctness judgments on pending detections.

use std::sync::Arc;

use pizzawatch_client::ApiError;
use pizzawatch_core::TrackId;

use crate::context::DashboardContext;
use crate::refresh::{Feed, RefreshHandle};

pub const FEEDBACK_SUBMITTED: &str = "Feedback submitted!";
pub const FEEDBACK_FAILED: &str = "Error submitting feedback!";
pub const CONNECTION_ERROR: &str = "Connection error!";

pub struct FeedbackSubmitter {
    ctx: Arc<DashboardContext>,
    refresh: RefreshHandle,
}

impl FeedbackSubmitter {
    pub fn new(ctx: Arc<DashboardContext>, refresh: RefreshHandle) -> Self {
        Self { ctx, refresh }
    }

    /// Post one judgment. The item is not removed locally; the
    /// detections and statistics feeds are invalidated instead.
    pub async fn submit(&self, track_id: TrackId, is_correct: bool) -> Result<(), ApiError> {
        let ctx = &self.ctx;
        match ctx
            .request(ctx.backend.submit_feedback(track_id, is_correct))
            .await
        {
            Ok(()) => {
                tracing::info!(track_id, is_correct, "Feedback submitted");
                ctx.notifications.success(FEEDBACK_SUBMITTED);
                self.refresh.invalidate(Feed::Detections);
                self.refresh.invalidate(Feed::Statistics);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(track_id, is_correct, error = %e, "Error submitting feedback");
                ctx.notifications.error(commit_failure_message(&e, FEEDBACK_FAILED));
                Err(e)
            }
        }
    }
}

/// Connection message for transport failures, `rejected` otherwise.
pub(crate) fn commit_failure_message(error: &ApiError, rejected: &'static str) -> &'static str {
    if error.is_transport() {
        CONNECTION_ERROR
    } else {
        rejected
    }
}
