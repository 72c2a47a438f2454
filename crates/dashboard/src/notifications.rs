//! Self-expiring operator notifications ("toasts").
//!
//! [`NotificationQueue`] keeps the visible stack, re-renders it through
//! the [`DashboardView`] on every change, and broadcasts
//! [`NotificationEvent`]s for anyone observing. Each toast removes itself
//! after the configured TTL unless the operator dismisses it first.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use pizzawatch_core::Severity;

use crate::view::DashboardView;

/// Broadcast channel capacity for notification events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

pub type ToastId = Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

impl Toast {
    pub fn icon(&self) -> &'static str {
        self.severity.icon()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    Expired,
    Dismissed,
}

#[derive(Debug, Clone)]
pub enum NotificationEvent {
    Shown(Toast),
    Removed { id: ToastId, reason: RemovalReason },
}

/// Cheaply cloneable handle to the notification stack.
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    toasts: Mutex<Vec<Toast>>,
    view: Arc<dyn DashboardView>,
    ttl: Duration,
    events: broadcast::Sender<NotificationEvent>,
    /// Stops pending expiry timers on shutdown.
    cancel: CancellationToken,
    /// Expiry timers, awaited alongside the other dashboard tasks.
    tasks: TaskTracker,
}

impl NotificationQueue {
    pub fn new(
        view: Arc<dyn DashboardView>,
        ttl: Duration,
        cancel: CancellationToken,
        tasks: TaskTracker,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(QueueInner {
                toasts: Mutex::new(Vec::new()),
                view,
                ttl,
                events,
                cancel,
                tasks,
            }),
        }
    }

    /// Show a notification and schedule its expiry.
    pub fn push(&self, message: impl Into<String>, severity: Severity) -> ToastId {
        let toast = Toast {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
            created_at: Utc::now(),
        };
        let id = toast.id;
        tracing::debug!(%severity, message = %toast.message, "Notification shown");

        {
            let mut toasts = self.lock();
            toasts.push(toast.clone());
            self.inner.view.render_toasts(&toasts);
        }
        let _ = self.inner.events.send(NotificationEvent::Shown(toast));

        let queue = self.clone();
        let cancel = self.inner.cancel.clone();
        let ttl = self.inner.ttl;
        self.inner.tasks.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(ttl) => {
                    queue.remove(id, RemovalReason::Expired);
                }
            }
        });

        id
    }

    pub fn success(&self, message: impl Into<String>) -> ToastId {
        self.push(message, Severity::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> ToastId {
        self.push(message, Severity::Error)
    }

    pub fn warning(&self, message: impl Into<String>) -> ToastId {
        self.push(message, Severity::Warning)
    }

    pub fn info(&self, message: impl Into<String>) -> ToastId {
        self.push(message, Severity::Info)
    }

    /// Remove a toast at the operator's request. Returns `false` if it had
    /// already expired.
    pub fn dismiss(&self, id: ToastId) -> bool {
        self.remove(id, RemovalReason::Dismissed)
    }

    /// Toasts currently on screen, oldest first.
    pub fn active(&self) -> Vec<Toast> {
        self.lock().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }

    fn remove(&self, id: ToastId, reason: RemovalReason) -> bool {
        {
            let mut toasts = self.lock();
            let before = toasts.len();
            toasts.retain(|t| t.id != id);
            if toasts.len() == before {
                return false;
            }
            self.inner.view.render_toasts(&toasts);
        }
        tracing::trace!(%id, ?reason, "Notification removed");
        let _ = self
            .inner
            .events
            .send(NotificationEvent::Removed { id, reason });
        true
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Toast>> {
        self.inner
            .toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
