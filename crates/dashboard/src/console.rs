//! Terminal rendering of the dashboard and parsing of operator commands.

use std::path::PathBuf;

use bytes::Bytes;

use pizzawatch_core::TrackId;
use pizzawatch_dashboard::view::{
    ClassSelection, DashboardView, DetectionList, StatsPanel, VideoGrid,
};
use pizzawatch_dashboard::{DashboardInput, Toast};

/// Prints each panel as it is rendered. Diagnostics go through `tracing`.
#[derive(Default)]
pub struct ConsoleView;

impl DashboardView for ConsoleView {
    fn render_stats(&self, panel: &StatsPanel) {
        println!(
            "[stats] total {} | today {} | accuracy {} | processing {} | threshold {} | updated {}",
            panel.total_detections,
            panel.today_detections,
            panel.accuracy,
            panel.processing_videos,
            panel.confidence_threshold,
            panel.last_updated,
        );
    }

    fn render_videos(&self, grid: &VideoGrid) {
        match grid {
            VideoGrid::Empty { message } => println!("[videos] {message}"),
            VideoGrid::Cards(cards) => {
                for card in cards {
                    println!(
                        "[videos] {} | {} | {} | {}{}{}",
                        card.filename,
                        card.size,
                        card.detections,
                        card.status_label,
                        card.processed
                            .as_deref()
                            .map(|p| format!(" | {p}"))
                            .unwrap_or_default(),
                        if card.stream_enabled { " | streamable" } else { "" },
                    );
                }
            }
        }
    }

    fn render_detections(&self, list: &DetectionList) {
        match list {
            DetectionList::Empty { message } => println!("[detections] {message}"),
            DetectionList::Items(items) => {
                for item in items {
                    println!(
                        "[detections] #{} | {} | {}",
                        item.track_id, item.confidence, item.timestamp
                    );
                }
            }
        }
    }

    fn render_classes(&self, selection: &ClassSelection) {
        for option in &selection.options {
            let mark = if option.selected { "x" } else { " " };
            println!("[classes] [{mark}] {}", option.label);
        }
        println!("[classes] current: {}", selection.current);
    }

    fn render_toasts(&self, toasts: &[Toast]) {
        if let Some(latest) = toasts.last() {
            println!("[{}] {}", latest.icon(), latest.message);
        }
    }

    fn set_upload_highlight(&self, _active: bool) {}

    fn open_file_chooser(&self) {
        println!("[upload] use `upload <path>` to choose a file");
    }

    fn show_upload_progress(&self, _percent: f64, label: &str) {
        println!("[upload] {label}");
    }

    fn hide_upload_progress(&self) {}

    fn clear_file_input(&self) {}

    fn show_stream_modal(&self, filename: &str) {
        println!("[stream] viewing {filename}");
    }

    fn hide_stream_modal(&self) {
        println!("[stream] closed");
    }

    fn set_stream_source(&self, source: Option<&str>) {
        if let Some(source) = source {
            tracing::debug!(source, "Stream source set");
        }
    }

    fn render_frame(&self, frame: &Bytes) {
        tracing::trace!(bytes = frame.len(), "Frame");
    }

    fn set_slider(&self, value: f64) {
        println!("[settings] confidence threshold {value}");
    }

    fn set_slider_text(&self, text: &str) {
        println!("[settings] slider {text}");
    }
}

/// One line of operator input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Input(DashboardInput),
    /// Dismiss the oldest visible notification.
    Dismiss,
    Quit,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (name, args.as_slice()) {
        ("upload", [path]) => Command::Input(DashboardInput::FileSelected(PathBuf::from(path))),
        ("upload", _) => return Err(CommandError::Usage("upload <path>")),
        ("stream", [file]) => Command::Input(DashboardInput::StreamRequested(file.to_string())),
        ("stream", _) => return Err(CommandError::Usage("stream <filename>")),
        ("close", []) => Command::Input(DashboardInput::ModalCloseClicked),
        ("feedback", [track, verdict]) => {
            let track_id: TrackId = track
                .parse()
                .map_err(|_| CommandError::Usage("feedback <track> <correct|incorrect>"))?;
            let is_correct = match *verdict {
                "correct" => true,
                "incorrect" => false,
                _ => return Err(CommandError::Usage("feedback <track> <correct|incorrect>")),
            };
            Command::Input(DashboardInput::FeedbackGiven {
                track_id,
                is_correct,
            })
        }
        ("feedback", _) => return Err(CommandError::Usage("feedback <track> <correct|incorrect>")),
        ("slider", [value]) => {
            let value = value
                .parse()
                .map_err(|_| CommandError::Usage("slider <0.0-1.0>"))?;
            Command::Input(DashboardInput::SliderMoved(value))
        }
        ("threshold", []) => Command::Input(DashboardInput::ThresholdSubmitted),
        ("classes", []) => Command::Input(DashboardInput::ClassesRequested),
        ("classes", ids) => {
            let ids = ids
                .iter()
                .map(|id| id.parse())
                .collect::<Result<Vec<u32>, _>>()
                .map_err(|_| CommandError::Usage("classes [id ...]"))?;
            Command::Input(DashboardInput::ClassesSubmitted(ids))
        }
        ("dismiss", []) => Command::Dismiss,
        ("quit" | "exit", []) => Command::Quit,
        (other, _) => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}
