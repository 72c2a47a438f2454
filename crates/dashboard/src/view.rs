//! Presentation boundary.
//!
//! The functions in this module are pure: they turn backend snapshots
//! into view models and never touch state. [`DashboardView`] is the sink
//! the orchestration layer pushes those models into; a terminal, a GUI or
//! a test recorder can implement it.

use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, NaiveTime};

use pizzawatch_core::{DetectionClasses, DetectionRecord, Statistics, TrackId, VideoRecord};

use crate::notifications::Toast;

/// Render target for every dashboard panel.
///
/// Implementations must not block; every method is called from async
/// tasks.
pub trait DashboardView: Send + Sync + 'static {
    fn render_stats(&self, panel: &StatsPanel);
    fn render_videos(&self, grid: &VideoGrid);
    fn render_detections(&self, list: &DetectionList);
    fn render_classes(&self, selection: &ClassSelection);
    /// Replace the visible notification stack.
    fn render_toasts(&self, toasts: &[Toast]);

    /// Drag-over highlight on the upload area.
    fn set_upload_highlight(&self, active: bool);
    fn open_file_chooser(&self);
    /// Show the progress indicator at `percent` with a status label.
    fn show_upload_progress(&self, percent: f64, label: &str);
    fn hide_upload_progress(&self);
    /// Reset the file input so the same file can be chosen again.
    fn clear_file_input(&self);

    fn show_stream_modal(&self, filename: &str);
    fn hide_stream_modal(&self);
    /// Point the frame surface at `source`, or clear it with `None`.
    fn set_stream_source(&self, source: Option<&str>);
    fn render_frame(&self, frame: &Bytes);

    /// Move the threshold slider.
    fn set_slider(&self, value: f64);
    /// Text next to the slider, updated locally while dragging.
    fn set_slider_text(&self, text: &str);
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StatsPanel {
    pub total_detections: String,
    pub today_detections: String,
    pub accuracy: String,
    pub processing_videos: String,
    pub confidence_threshold: String,
    pub last_updated: String,
}

pub fn stats_panel(stats: &Statistics, now: NaiveTime) -> StatsPanel {
    StatsPanel {
        total_detections: stats.total_detections.to_string(),
        today_detections: stats.today_detections.to_string(),
        accuracy: format!("{}%", stats.accuracy_percentage),
        processing_videos: stats.processing_videos.to_string(),
        confidence_threshold: stats.confidence_threshold.to_string(),
        last_updated: now.format("%-I:%M:%S %p").to_string(),
    }
}

// ---------------------------------------------------------------------------
// Video library
// ---------------------------------------------------------------------------

pub const EMPTY_LIBRARY: &str = "No videos uploaded yet";

#[derive(Debug, Clone, PartialEq)]
pub enum VideoGrid {
    Empty { message: &'static str },
    Cards(Vec<VideoCard>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoCard {
    pub filename: String,
    pub size: String,
    pub detections: String,
    /// CSS-style class derived from the raw status value.
    pub status_class: String,
    pub status_label: String,
    pub processed: Option<String>,
    pub stream_enabled: bool,
}

pub fn video_grid(videos: &[VideoRecord]) -> VideoGrid {
    if videos.is_empty() {
        return VideoGrid::Empty {
            message: EMPTY_LIBRARY,
        };
    }
    VideoGrid::Cards(videos.iter().map(video_card).collect())
}

pub fn video_card(video: &VideoRecord) -> VideoCard {
    VideoCard {
        filename: video.filename.clone(),
        size: format!("Size: {} MB", video.size_mb),
        detections: format!("Pizzas detected: {}", video.detected_count),
        status_class: format!("status-{}", video.status.as_str()),
        status_label: video.status.label().to_string(),
        processed: video
            .processed_at
            .as_deref()
            .map(|at| format!("Processed: {}", format_timestamp(at))),
        stream_enabled: video.can_stream(),
    }
}

// ---------------------------------------------------------------------------
// Pending detections
// ---------------------------------------------------------------------------

pub const EMPTY_DETECTIONS: &str = "No detections need feedback";

#[derive(Debug, Clone, PartialEq)]
pub enum DetectionList {
    Empty { message: &'static str },
    Items(Vec<DetectionItem>),
}

/// A pending detection with its correct/incorrect actions.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionItem {
    pub track_id: TrackId,
    pub confidence: String,
    pub timestamp: String,
}

pub fn detection_list(detections: &[DetectionRecord]) -> DetectionList {
    if detections.is_empty() {
        return DetectionList::Empty {
            message: EMPTY_DETECTIONS,
        };
    }
    DetectionList::Items(
        detections
            .iter()
            .map(|d| DetectionItem {
                track_id: d.track_id,
                confidence: format!("{:.1}%", d.confidence * 100.0),
                timestamp: format_timestamp(&d.timestamp),
            })
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Detection classes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ClassOption {
    pub id: u32,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassSelection {
    pub options: Vec<ClassOption>,
    pub current: String,
}

pub fn class_selection(classes: &DetectionClasses) -> ClassSelection {
    ClassSelection {
        options: classes
            .options()
            .into_iter()
            .map(|(id, name)| ClassOption {
                id,
                label: format!("{id}: {name}"),
                selected: classes.is_selected(id),
            })
            .collect(),
        current: classes.current_class_names.join(", "),
    }
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

pub const UPLOADING: &str = "Uploading…";
pub const PROCESSING: &str = "Processing video…";

pub fn progress_label(percent: f64) -> String {
    format!("Uploading… {}%", percent.round() as u64)
}

/// Format a backend timestamp as `M/D/YYYY, h:mm:ss AM`.
///
/// Accepts RFC 3339 and naive ISO forms; anything else is shown verbatim.
pub fn format_timestamp(raw: &str) -> String {
    const DISPLAY: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.naive_local().format(DISPLAY).to_string();
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.format(DISPLAY).to_string())
        .unwrap_or_else(|| raw.to_string())
}
