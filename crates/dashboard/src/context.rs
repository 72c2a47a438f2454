//! The explicit context object shared by every dashboard component.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use pizzawatch_client::deadline::within;
use pizzawatch_client::{ApiError, DashboardBackend};

use crate::config::DashboardConfig;
use crate::notifications::NotificationQueue;
use crate::view::DashboardView;

/// Backend, view, notifications and configuration for one dashboard
/// instance, plus the task bookkeeping used for shutdown.
///
/// Built once per [`Dashboard`](crate::controller::Dashboard) and handed
/// to each component at construction.
pub struct DashboardContext {
    pub backend: Arc<dyn DashboardBackend>,
    pub view: Arc<dyn DashboardView>,
    pub notifications: NotificationQueue,
    pub config: DashboardConfig,
    /// Master cancellation token -- cancelled during shutdown.
    cancel: CancellationToken,
    tasks: TaskTracker,
}

impl DashboardContext {
    pub fn new(
        backend: Arc<dyn DashboardBackend>,
        view: Arc<dyn DashboardView>,
        config: DashboardConfig,
    ) -> Arc<Self> {
        let cancel = CancellationToken::new();
        let tasks = TaskTracker::new();
        let notifications = NotificationQueue::new(
            Arc::clone(&view),
            config.toast_ttl,
            cancel.child_token(),
            tasks.clone(),
        );
        Arc::new(Self {
            backend,
            view,
            notifications,
            config,
            cancel,
            tasks,
        })
    }

    /// Spawn a background task that is dropped at shutdown.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        self.tasks.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = task => {}
            }
        });
    }

    /// Run a request/response call under the configured deadline.
    pub async fn request<T, F>(&self, call: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        within(self.config.request_timeout, call).await
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_shutting_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel every spawned task and wait for them to exit, bounded by
    /// the configured shutdown timeout.
    pub(crate) async fn close(&self) {
        self.cancel.cancel();
        self.tasks.close();
        if tokio::time::timeout(self.config.shutdown_timeout, self.tasks.wait())
            .await
            .is_err()
        {
            tracing::warn!(remaining = self.tasks.len(), "Tasks still running after shutdown timeout");
        }
    }
}
