//! Async orchestration for the pizzawatch dashboard.
//!
//! [`Dashboard`] composes the notification queue, upload pipeline,
//! streaming session manager, refresh scheduler, feedback submitter and
//! settings panel around one shared [`DashboardContext`].

pub mod config;
pub mod context;
pub mod controller;
pub mod feedback;
pub mod notifications;
pub mod refresh;
pub mod settings;
pub mod stream;
pub mod upload;
pub mod view;

pub use config::{DashboardConfig, SequencePolicy};
pub use context::DashboardContext;
pub use controller::{Dashboard, DashboardInput, Key};
pub use notifications::{NotificationEvent, NotificationQueue, RemovalReason, Toast, ToastId};
pub use refresh::{Feed, RefreshHandle};
pub use upload::UploadOutcome;
pub use view::DashboardView;
