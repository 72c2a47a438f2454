//! Shared domain types for the pizzawatch dashboard client.
//!
//! Everything here is a read-only snapshot of backend state or a
//! client-side value object. Nothing in this crate performs I/O.

pub mod classes;
pub mod error;
pub mod stats;
pub mod threshold;
pub mod types;
pub mod upload;
pub mod video;

pub use classes::{validate_class_selection, DetectionClasses};
pub use error::CoreError;
pub use stats::{ModelSettings, Statistics, DEFAULT_CONFIDENCE_THRESHOLD};
pub use threshold::clamp_threshold;
pub use types::{DetectionRecord, Severity, TrackId};
pub use upload::{UploadJob, UploadRejection};
pub use video::{VideoList, VideoRecord, VideoStatus};
