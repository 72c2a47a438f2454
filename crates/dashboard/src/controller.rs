//! Composition root and input wiring.
//!
//! [`Dashboard`] owns one [`DashboardContext`] and every component built
//! on it. Operator input arrives as [`DashboardInput`] values; anything
//! that touches the network is spawned so input handling never waits.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use pizzawatch_client::DashboardBackend;
use pizzawatch_core::{TrackId, UploadJob};

use crate::config::DashboardConfig;
use crate::context::DashboardContext;
use crate::feedback::FeedbackSubmitter;
use crate::notifications::{NotificationQueue, ToastId};
use crate::refresh::{Feed, RefreshHandle, RefreshScheduler};
use crate::settings::SettingsPanel;
use crate::stream::StreamSessionManager;
use crate::upload::{UploadPipeline, UPLOAD_FAILED};
use crate::view::DashboardView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// Operator input, as the page would deliver it.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardInput {
    DragOver,
    DragLeave,
    /// Files dropped on the upload area; only the first is uploaded.
    FilesDropped(Vec<PathBuf>),
    FileSelected(PathBuf),
    UploadAreaClicked,
    StreamRequested(String),
    ModalBackdropClicked,
    ModalCloseClicked,
    KeyPressed(Key),
    SliderMoved(f64),
    ThresholdSubmitted,
    FeedbackGiven { track_id: TrackId, is_correct: bool },
    ToastClicked(ToastId),
    ClassesRequested,
    ClassesSubmitted(Vec<u32>),
    PageHidden,
}

pub struct Dashboard {
    ctx: Arc<DashboardContext>,
    refresh: RefreshHandle,
    /// Taken by the scheduler on [`start`](Self::start).
    invalidations: Mutex<Option<mpsc::UnboundedReceiver<Feed>>>,
    scheduler: Arc<RefreshScheduler>,
    upload: Arc<UploadPipeline>,
    streams: StreamSessionManager,
    feedback: Arc<FeedbackSubmitter>,
    settings: Arc<SettingsPanel>,
}

impl Dashboard {
    pub fn new(
        backend: Arc<dyn DashboardBackend>,
        view: Arc<dyn DashboardView>,
        config: DashboardConfig,
    ) -> Self {
        let ctx = DashboardContext::new(backend, view, config);
        let (refresh, invalidations) = RefreshHandle::channel();

        Self {
            scheduler: RefreshScheduler::new(Arc::clone(&ctx)),
            upload: Arc::new(UploadPipeline::new(Arc::clone(&ctx), refresh.clone())),
            streams: StreamSessionManager::new(Arc::clone(&ctx)),
            feedback: Arc::new(FeedbackSubmitter::new(Arc::clone(&ctx), refresh.clone())),
            settings: Arc::new(SettingsPanel::new(Arc::clone(&ctx), refresh.clone())),
            invalidations: Mutex::new(Some(invalidations)),
            refresh,
            ctx,
        }
    }

    /// Populate every panel and start the polling loops.
    ///
    /// The three feeds and the model settings are fetched concurrently.
    /// Calling this twice has no effect.
    pub fn start(&self) {
        let Some(invalidations) = self
            .invalidations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            tracing::warn!("Dashboard already started");
            return;
        };

        tracing::info!(api_url = %self.ctx.config.api_url, "Dashboard starting");
        let scheduler = Arc::clone(&self.scheduler);
        self.ctx.spawn(scheduler.run(invalidations));

        let settings = Arc::clone(&self.settings);
        self.ctx.spawn(async move { settings.load().await });
    }

    /// Dispatch one operator input.
    pub fn handle(&self, input: DashboardInput) {
        let view = &self.ctx.view;
        match input {
            DashboardInput::DragOver => view.set_upload_highlight(true),
            DashboardInput::DragLeave => view.set_upload_highlight(false),
            DashboardInput::FilesDropped(files) => {
                view.set_upload_highlight(false);
                if let Some(path) = files.into_iter().next() {
                    self.spawn_upload(path);
                }
            }
            DashboardInput::FileSelected(path) => self.spawn_upload(path),
            DashboardInput::UploadAreaClicked => view.open_file_chooser(),
            DashboardInput::StreamRequested(filename) => self.streams.start_stream(&filename),
            DashboardInput::ModalBackdropClicked | DashboardInput::ModalCloseClicked => {
                self.streams.close_modal()
            }
            DashboardInput::KeyPressed(Key::Escape) => {
                if self.streams.is_modal_visible() {
                    self.streams.close_modal();
                }
            }
            DashboardInput::KeyPressed(Key::Other) => {}
            DashboardInput::SliderMoved(value) => {
                self.settings.slider_input(value);
            }
            DashboardInput::ThresholdSubmitted => {
                let settings = Arc::clone(&self.settings);
                self.ctx.spawn(async move {
                    let _ = settings.commit_threshold().await;
                });
            }
            DashboardInput::FeedbackGiven {
                track_id,
                is_correct,
            } => {
                let feedback = Arc::clone(&self.feedback);
                self.ctx.spawn(async move {
                    let _ = feedback.submit(track_id, is_correct).await;
                });
            }
            DashboardInput::ToastClicked(id) => {
                self.ctx.notifications.dismiss(id);
            }
            DashboardInput::ClassesRequested => {
                let settings = Arc::clone(&self.settings);
                self.ctx
                    .spawn(async move { settings.load_detection_classes().await });
            }
            DashboardInput::ClassesSubmitted(ids) => {
                let settings = Arc::clone(&self.settings);
                self.ctx.spawn(async move {
                    let _ = settings.update_detection_classes(&ids).await;
                });
            }
            DashboardInput::PageHidden => {
                if let Some(session) = self.streams.active_stream() {
                    tracing::debug!(filename = %session.filename, "Page hidden, stream may be paused");
                }
            }
        }
    }

    fn spawn_upload(&self, path: PathBuf) {
        let upload = Arc::clone(&self.upload);
        let notifications = self.ctx.notifications.clone();
        self.ctx.spawn(async move {
            match tokio::fs::metadata(&path).await {
                Ok(meta) => {
                    upload
                        .upload(UploadJob::with_declared_type(path, meta.len()))
                        .await;
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Cannot read upload file");
                    notifications.error(UPLOAD_FAILED);
                }
            }
        });
    }

    /// Stop the stream, cancel timers and wait for in-flight work.
    pub async fn shutdown(&self) {
        tracing::info!("Dashboard shutting down");
        self.streams.stop_stream();
        self.ctx.close().await;
        tracing::info!("Dashboard stopped");
    }

    pub fn context(&self) -> &Arc<DashboardContext> {
        &self.ctx
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.ctx.notifications
    }

    pub fn refresh_handle(&self) -> &RefreshHandle {
        &self.refresh
    }

    pub fn upload(&self) -> &UploadPipeline {
        &self.upload
    }

    pub fn streams(&self) -> &StreamSessionManager {
        &self.streams
    }

    pub fn feedback(&self) -> &FeedbackSubmitter {
        &self.feedback
    }

    pub fn settings(&self) -> &SettingsPanel {
        &self.settings
    }
}
