//! Exclusive live-stream session.
//!
//! At most one session exists at a time. Starting a new one first tears
//! down the previous session: its source is cleared, its connection task
//! is cancelled and its generation is retired, so any frame or end event
//! still in flight from it is ignored.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::context::DashboardContext;

pub const STREAM_ENDED: &str = "Stream ended";

/// Frame source path for `filename`.
pub fn stream_source(filename: &str) -> String {
    format!("/api/stream_video/{filename}")
}

/// Snapshot of the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSession {
    pub filename: String,
    pub generation: u64,
    /// Set once the first frame has been rendered.
    pub started: bool,
}

struct ActiveSession {
    session: StreamSession,
    cancel: CancellationToken,
}

#[derive(Default)]
struct StreamState {
    active: Option<ActiveSession>,
    modal_visible: bool,
    /// The view points at a stream source. Outlives `active` when a
    /// stream ends on its own.
    source_set: bool,
    /// Bumped on every start; a session task acts only while its own
    /// generation is current.
    generation: u64,
}

impl StreamState {
    fn is_current(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.session.generation == generation)
    }
}

#[derive(Clone)]
pub struct StreamSessionManager {
    ctx: Arc<DashboardContext>,
    state: Arc<Mutex<StreamState>>,
}

impl StreamSessionManager {
    pub fn new(ctx: Arc<DashboardContext>) -> Self {
        Self {
            ctx,
            state: Arc::new(Mutex::new(StreamState::default())),
        }
    }

    /// Show the viewer and begin streaming `filename`, replacing any
    /// existing session.
    pub fn start_stream(&self, filename: &str) {
        self.ctx.view.show_stream_modal(filename);

        let (generation, cancel) = {
            let mut state = self.lock();
            state.modal_visible = true;
            self.detach(&mut state);

            state.generation += 1;
            let generation = state.generation;
            let cancel = self.ctx.cancellation().child_token();
            state.active = Some(ActiveSession {
                session: StreamSession {
                    filename: filename.to_string(),
                    generation,
                    started: false,
                },
                cancel: cancel.clone(),
            });
            self.ctx.view.set_stream_source(Some(&stream_source(filename)));
            state.source_set = true;
            (generation, cancel)
        };

        tracing::info!(filename, generation, "Stream session started");
        let manager = self.clone();
        let filename = filename.to_string();
        self.ctx.spawn(async move {
            manager.run_session(filename, generation, cancel).await;
        });
    }

    /// Tear down the current session, if any. Safe to call repeatedly.
    pub fn stop_stream(&self) {
        let mut state = self.lock();
        self.detach(&mut state);
    }

    /// Stop the stream, then hide the viewer.
    pub fn close_modal(&self) {
        self.stop_stream();
        {
            let mut state = self.lock();
            state.modal_visible = false;
        }
        self.ctx.view.hide_stream_modal();

        let settle = self.ctx.config.modal_settle;
        self.ctx.spawn(async move {
            tokio::time::sleep(settle).await;
            tracing::debug!("Stream modal closed");
        });
    }

    pub fn active_stream(&self) -> Option<StreamSession> {
        self.lock().active.as_ref().map(|a| a.session.clone())
    }

    pub fn is_modal_visible(&self) -> bool {
        self.lock().modal_visible
    }

    /// Clear the source and retire the active session. Caller holds the
    /// state lock so no session task can observe a half-detached state.
    fn detach(&self, state: &mut StreamState) {
        if let Some(previous) = state.active.take() {
            previous.cancel.cancel();
            tracing::debug!(
                filename = %previous.session.filename,
                generation = previous.session.generation,
                "Stream session detached",
            );
        }
        if std::mem::take(&mut state.source_set) {
            self.ctx.view.set_stream_source(None);
        }
    }

    async fn run_session(&self, filename: String, generation: u64, cancel: CancellationToken) {
        let opened = tokio::select! {
            _ = cancel.cancelled() => return,
            opened = self.ctx.request(self.ctx.backend.open_stream(&filename)) => opened,
        };

        let mut frames = match opened {
            Ok(frames) => frames,
            Err(e) => {
                tracing::warn!(%filename, generation, error = %e, "Stream could not be opened");
                self.session_ended(generation);
                return;
            }
        };

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return,
                next = frames.next() => next,
            };
            match next {
                Some(Ok(frame)) => {
                    let mut state = self.lock();
                    let Some(active) = state
                        .active
                        .as_mut()
                        .filter(|a| a.session.generation == generation)
                    else {
                        return;
                    };
                    if !active.session.started {
                        active.session.started = true;
                        tracing::info!(%filename, generation, "Stream started successfully");
                    }
                    self.ctx.view.render_frame(&frame);
                }
                Some(Err(e)) => {
                    tracing::info!(%filename, generation, error = %e, "Stream ended or error occurred");
                    self.session_ended(generation);
                    return;
                }
                None => {
                    tracing::info!(%filename, generation, "Stream ended or error occurred");
                    self.session_ended(generation);
                    return;
                }
            }
        }
    }

    /// End-of-stream for `generation`. Only the current session reports,
    /// and only while the viewer is still open.
    fn session_ended(&self, generation: u64) {
        let mut state = self.lock();
        if !state.is_current(generation) {
            return;
        }
        state.active = None;
        if state.modal_visible {
            self.ctx.notifications.info(STREAM_ENDED);
        }
    }

    fn lock(&self) -> MutexGuard<'_, StreamState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
