//! HTTP client for the pizzawatch detection backend.
//!
//! [`DashboardBackend`] is the request/response surface the dashboard
//! orchestrates against; [`DashboardApi`] implements it over
//! [`reqwest`]. Live streams are `multipart/x-mixed-replace` JPEG
//! bodies, split into frames by [`mjpeg`].

pub mod api;
pub mod backend;
pub mod deadline;
pub mod error;
pub mod mjpeg;
pub mod progress;

pub use api::DashboardApi;
pub use backend::{DashboardBackend, FrameStream, UploadReceipt};
pub use error::ApiError;
pub use progress::TransferProgress;
