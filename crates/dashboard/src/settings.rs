//! Confidence threshold and detection-class commits.
//!
//! The slider is local until committed. A commit never rolls the slider
//! back: after a failure it keeps the attempted value until the operator
//! moves it again or settings are reloaded.

use std::sync::{Arc, Mutex, PoisonError};

use pizzawatch_client::ApiError;
use pizzawatch_core::{
    clamp_threshold, validate_class_selection, CoreError, ModelSettings, DEFAULT_CONFIDENCE_THRESHOLD,
};

use crate::context::DashboardContext;
use crate::feedback::commit_failure_message;
use crate::refresh::{Feed, RefreshHandle};
use crate::view;

pub const SETTINGS_UPDATED: &str = "Model settings updated!";
pub const SETTINGS_FAILED: &str = "Error updating settings!";
pub const CLASSES_EMPTY: &str = "Select at least one class!";
pub const CLASSES_UPDATED: &str = "Detection classes updated!";
pub const CLASSES_FAILED: &str = "Error updating detection classes!";

/// Why a class update did not reach the backend or was refused by it.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error(transparent)]
    Invalid(#[from] CoreError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct SettingsPanel {
    ctx: Arc<DashboardContext>,
    refresh: RefreshHandle,
    slider: Mutex<f64>,
}

impl SettingsPanel {
    pub fn new(ctx: Arc<DashboardContext>, refresh: RefreshHandle) -> Self {
        Self {
            ctx,
            refresh,
            slider: Mutex::new(DEFAULT_CONFIDENCE_THRESHOLD),
        }
    }

    /// Current slider position.
    pub fn slider_value(&self) -> f64 {
        *self.slider.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_slider(&self, value: f64) {
        *self.slider.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Mirror the backend threshold into the slider. Failures are logged.
    pub async fn load(&self) {
        let ctx = &self.ctx;
        match ctx.request(ctx.backend.get_model_settings()).await {
            Ok(settings) => {
                let value = clamp_threshold(settings.confidence_threshold);
                self.set_slider(value);
                ctx.view.set_slider(value);
                ctx.view.set_slider_text(&value.to_string());
            }
            Err(e) => tracing::warn!(error = %e, "Error loading model settings"),
        }
    }

    /// Live slider movement: clamp and update the text only.
    pub fn slider_input(&self, value: f64) -> f64 {
        let value = clamp_threshold(value);
        self.set_slider(value);
        self.ctx.view.set_slider_text(&value.to_string());
        value
    }

    /// Commit the current slider value.
    pub async fn commit_threshold(&self) -> Result<(), ApiError> {
        self.update_threshold(self.slider_value()).await
    }

    /// Submit a new confidence threshold. On success the statistics feed,
    /// which displays the active threshold, is invalidated.
    pub async fn update_threshold(&self, value: f64) -> Result<(), ApiError> {
        let ctx = &self.ctx;
        let settings = ModelSettings {
            confidence_threshold: value,
        };
        match ctx.request(ctx.backend.set_model_settings(settings)).await {
            Ok(()) => {
                tracing::info!(threshold = value, "Model settings updated");
                ctx.notifications.success(SETTINGS_UPDATED);
                self.refresh.invalidate(Feed::Statistics);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(threshold = value, error = %e, "Error updating settings");
                ctx.notifications.error(commit_failure_message(&e, SETTINGS_FAILED));
                Err(e)
            }
        }
    }

    /// Fetch and render the detection class selection. Failures are logged.
    pub async fn load_detection_classes(&self) {
        let ctx = &self.ctx;
        match ctx.request(ctx.backend.get_detection_classes()).await {
            Ok(classes) => ctx.view.render_classes(&view::class_selection(&classes)),
            Err(e) => tracing::warn!(error = %e, "Error loading detection classes"),
        }
    }

    /// Replace the active detection classes, then reload the selection.
    pub async fn update_detection_classes(&self, ids: &[u32]) -> Result<(), CommitError> {
        let ctx = &self.ctx;
        if let Err(e) = validate_class_selection(ids) {
            ctx.notifications.warning(CLASSES_EMPTY);
            return Err(e.into());
        }

        match ctx.request(ctx.backend.set_detection_classes(ids)).await {
            Ok(()) => {
                tracing::info!(classes = ?ids, "Detection classes updated");
                ctx.notifications.success(CLASSES_UPDATED);
                self.load_detection_classes().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(classes = ?ids, error = %e, "Error updating detection classes");
                ctx.notifications.error(commit_failure_message(&e, CLASSES_FAILED));
                Err(e.into())
            }
        }
    }
}
