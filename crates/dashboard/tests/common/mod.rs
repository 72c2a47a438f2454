//! Shared fixtures: a scriptable in-memory backend and a view that
//! records everything pushed into it.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::mpsc;

use pizzawatch_client::{ApiError, DashboardBackend, FrameStream, TransferProgress, UploadReceipt};
use pizzawatch_core::{
    DetectionClasses, DetectionRecord, ModelSettings, Severity, Statistics, TrackId, UploadJob,
    VideoRecord, VideoStatus,
};
use pizzawatch_dashboard::view::{
    ClassSelection, DashboardView, DetectionList, StatsPanel, VideoGrid,
};
use pizzawatch_dashboard::{Dashboard, DashboardConfig, Toast};

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Upload,
    Stats,
    Videos,
    Detections,
    Feedback,
    GetSettings,
    SetSettings,
    GetClasses,
    SetClasses,
    Stream,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Upload(String),
    Stats,
    Videos,
    Detections,
    Feedback { track_id: TrackId, is_correct: bool },
    GetSettings,
    SetSettings(f64),
    GetClasses,
    SetClasses(Vec<u32>),
    Stream(String),
}

impl Call {
    fn endpoint(&self) -> Endpoint {
        match self {
            Call::Upload(_) => Endpoint::Upload,
            Call::Stats => Endpoint::Stats,
            Call::Videos => Endpoint::Videos,
            Call::Detections => Endpoint::Detections,
            Call::Feedback { .. } => Endpoint::Feedback,
            Call::GetSettings => Endpoint::GetSettings,
            Call::SetSettings(_) => Endpoint::SetSettings,
            Call::GetClasses => Endpoint::GetClasses,
            Call::SetClasses(_) => Endpoint::SetClasses,
            Call::Stream(_) => Endpoint::Stream,
        }
    }
}

/// How an endpoint answers.
#[derive(Debug, Clone)]
pub enum Outcome {
    Ok,
    /// Connection refused before any response.
    Transport,
    /// Non-2xx with an optional `{"error": ...}` message.
    Rejected(Option<String>),
    /// Never settles.
    Hang,
}

impl Outcome {
    async fn settle(&self) -> Result<(), ApiError> {
        match self {
            Outcome::Ok => Ok(()),
            Outcome::Transport => Err(ApiError::Transport("connection refused".into())),
            Outcome::Rejected(message) => Err(ApiError::Application {
                status: 400,
                message: message.clone(),
            }),
            Outcome::Hang => futures::future::pending().await,
        }
    }
}

pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    outcomes: Mutex<HashMap<Endpoint, Outcome>>,
    stats: Mutex<Statistics>,
    /// Per-call `(delay, response)` for the stats endpoint, consumed in
    /// call order before falling back to `stats`.
    scripted_stats: Mutex<VecDeque<(Duration, Statistics)>>,
    videos: Mutex<Vec<VideoRecord>>,
    detections: Mutex<Vec<DetectionRecord>>,
    settings: Mutex<ModelSettings>,
    classes: Mutex<DetectionClasses>,
    /// Progress signals emitted by the upload; `None` means four equal
    /// chunks of the job size.
    upload_progress: Mutex<Option<Vec<TransferProgress>>>,
    upload_delay: Mutex<Duration>,
    streams: Mutex<Vec<(String, mpsc::UnboundedSender<Result<Bytes, ApiError>>)>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcomes: Mutex::new(HashMap::new()),
            stats: Mutex::new(Statistics::default()),
            scripted_stats: Mutex::new(VecDeque::new()),
            videos: Mutex::new(Vec::new()),
            detections: Mutex::new(Vec::new()),
            settings: Mutex::new(ModelSettings {
                confidence_threshold: 0.5,
            }),
            classes: Mutex::new(DetectionClasses::default()),
            upload_progress: Mutex::new(None),
            upload_delay: Mutex::new(Duration::from_millis(50)),
            streams: Mutex::new(Vec::new()),
        }
    }
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record(&self, call: Call) -> Outcome {
        let endpoint = call.endpoint();
        self.calls.lock().unwrap().push(call);
        self.outcomes
            .lock()
            .unwrap()
            .get(&endpoint)
            .cloned()
            .unwrap_or(Outcome::Ok)
    }

    pub fn set_outcome(&self, endpoint: Endpoint, outcome: Outcome) {
        self.outcomes.lock().unwrap().insert(endpoint, outcome);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.endpoint() == endpoint)
            .count()
    }

    pub fn set_stats(&self, stats: Statistics) {
        *self.stats.lock().unwrap() = stats;
    }

    pub fn script_stats(&self, delay: Duration, stats: Statistics) {
        self.scripted_stats.lock().unwrap().push_back((delay, stats));
    }

    pub fn set_videos(&self, videos: Vec<VideoRecord>) {
        *self.videos.lock().unwrap() = videos;
    }

    pub fn set_detections(&self, detections: Vec<DetectionRecord>) {
        *self.detections.lock().unwrap() = detections;
    }

    pub fn set_settings(&self, settings: ModelSettings) {
        *self.settings.lock().unwrap() = settings;
    }

    pub fn set_classes(&self, classes: DetectionClasses) {
        *self.classes.lock().unwrap() = classes;
    }

    pub fn set_upload_progress(&self, progress: Vec<TransferProgress>) {
        *self.upload_progress.lock().unwrap() = Some(progress);
    }

    pub fn set_upload_delay(&self, delay: Duration) {
        *self.upload_delay.lock().unwrap() = delay;
    }

    pub fn open_streams(&self) -> usize {
        self.streams.lock().unwrap().len()
    }

    /// Push a frame into the `index`-th opened stream.
    pub fn send_frame(&self, index: usize, frame: &'static [u8]) {
        let streams = self.streams.lock().unwrap();
        let _ = streams[index].1.send(Ok(Bytes::from_static(frame)));
    }

    /// Fail the `index`-th opened stream.
    pub fn fail_stream(&self, index: usize) {
        let streams = self.streams.lock().unwrap();
        let _ = streams[index]
            .1
            .send(Err(ApiError::Transport("stream reset".into())));
    }

    /// Close the `index`-th opened stream cleanly.
    pub fn end_stream(&self, index: usize) {
        let mut streams = self.streams.lock().unwrap();
        let filename = streams[index].0.clone();
        let (closed, _) = mpsc::unbounded_channel();
        streams[index] = (filename, closed);
    }
}

#[async_trait]
impl DashboardBackend for FakeBackend {
    async fn upload_video(
        &self,
        job: &UploadJob,
        progress: mpsc::UnboundedSender<TransferProgress>,
    ) -> Result<UploadReceipt, ApiError> {
        let outcome = self.record(Call::Upload(job.file_name.clone()));
        let signals = self.upload_progress.lock().unwrap().clone().unwrap_or_else(|| {
            (1..=4)
                .map(|i| TransferProgress {
                    loaded: job.size * i / 4,
                    total: Some(job.size),
                })
                .collect()
        });
        let delay = *self.upload_delay.lock().unwrap();

        if !matches!(outcome, Outcome::Transport) {
            for signal in signals {
                let _ = progress.send(signal);
                tokio::time::sleep(delay / 4).await;
            }
        }
        outcome.settle().await?;
        Ok(UploadReceipt {
            message: Some("Video uploaded successfully".into()),
            filename: Some(job.file_name.clone()),
        })
    }

    async fn get_stats(&self) -> Result<Statistics, ApiError> {
        let outcome = self.record(Call::Stats);
        let scripted = self.scripted_stats.lock().unwrap().pop_front();
        outcome.settle().await?;
        match scripted {
            Some((delay, stats)) => {
                tokio::time::sleep(delay).await;
                Ok(stats)
            }
            None => {
                let stats = self.stats.lock().unwrap().clone();
                Ok(stats)
            }
        }
    }

    async fn get_videos(&self) -> Result<Vec<VideoRecord>, ApiError> {
        self.record(Call::Videos).settle().await?;
        Ok(self.videos.lock().unwrap().clone())
    }

    async fn get_detections(&self) -> Result<Vec<DetectionRecord>, ApiError> {
        self.record(Call::Detections).settle().await?;
        Ok(self.detections.lock().unwrap().clone())
    }

    async fn submit_feedback(&self, track_id: TrackId, is_correct: bool) -> Result<(), ApiError> {
        self.record(Call::Feedback {
            track_id,
            is_correct,
        })
        .settle()
        .await
    }

    async fn get_model_settings(&self) -> Result<ModelSettings, ApiError> {
        self.record(Call::GetSettings).settle().await?;
        Ok(*self.settings.lock().unwrap())
    }

    async fn set_model_settings(&self, settings: ModelSettings) -> Result<(), ApiError> {
        self.record(Call::SetSettings(settings.confidence_threshold))
            .settle()
            .await
    }

    async fn get_detection_classes(&self) -> Result<DetectionClasses, ApiError> {
        self.record(Call::GetClasses).settle().await?;
        Ok(self.classes.lock().unwrap().clone())
    }

    async fn set_detection_classes(&self, classes: &[u32]) -> Result<(), ApiError> {
        self.record(Call::SetClasses(classes.to_vec())).settle().await
    }

    async fn open_stream(&self, filename: &str) -> Result<FrameStream, ApiError> {
        self.record(Call::Stream(filename.to_string())).settle().await?;
        let (tx, rx) = mpsc::unbounded_channel();
        self.streams.lock().unwrap().push((filename.to_string(), tx));
        Ok(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
        .boxed())
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Stats(StatsPanel),
    Videos(VideoGrid),
    Detections(DetectionList),
    Classes(ClassSelection),
    Highlight(bool),
    FileChooser,
    Progress(f64, String),
    HideProgress,
    ClearInput,
    ShowModal(String),
    HideModal,
    Source(Option<String>),
    Frame(Bytes),
    Slider(f64),
    SliderText(String),
}

#[derive(Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
    /// Every toast ever rendered, in order of first appearance.
    toasts: Mutex<Vec<Toast>>,
    visible_toasts: Mutex<Vec<Toast>>,
}

impl RecordingView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn toasts(&self) -> Vec<(String, Severity)> {
        self.toasts
            .lock()
            .unwrap()
            .iter()
            .map(|t| (t.message.clone(), t.severity))
            .collect()
    }

    pub fn toast_messages(&self) -> Vec<String> {
        self.toasts().into_iter().map(|(m, _)| m).collect()
    }

    pub fn visible_toasts(&self) -> Vec<Toast> {
        self.visible_toasts.lock().unwrap().clone()
    }

    /// Percentages shown while uploading, in order.
    pub fn progress_percents(&self) -> Vec<f64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Progress(p, _) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn stats_renders(&self) -> Vec<StatsPanel> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Stats(panel) => Some(panel),
                _ => None,
            })
            .collect()
    }

    pub fn frames(&self) -> Vec<Bytes> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Frame(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&ViewEvent) -> bool) -> usize {
        self.events().iter().filter(|e| matches(e)).count()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl DashboardView for RecordingView {
    fn render_stats(&self, panel: &StatsPanel) {
        self.push(ViewEvent::Stats(panel.clone()));
    }

    fn render_videos(&self, grid: &VideoGrid) {
        self.push(ViewEvent::Videos(grid.clone()));
    }

    fn render_detections(&self, list: &DetectionList) {
        self.push(ViewEvent::Detections(list.clone()));
    }

    fn render_classes(&self, selection: &ClassSelection) {
        self.push(ViewEvent::Classes(selection.clone()));
    }

    fn render_toasts(&self, toasts: &[Toast]) {
        let mut seen = self.toasts.lock().unwrap();
        for toast in toasts {
            if !seen.iter().any(|t| t.id == toast.id) {
                seen.push(toast.clone());
            }
        }
        *self.visible_toasts.lock().unwrap() = toasts.to_vec();
    }

    fn set_upload_highlight(&self, active: bool) {
        self.push(ViewEvent::Highlight(active));
    }

    fn open_file_chooser(&self) {
        self.push(ViewEvent::FileChooser);
    }

    fn show_upload_progress(&self, percent: f64, label: &str) {
        self.push(ViewEvent::Progress(percent, label.to_string()));
    }

    fn hide_upload_progress(&self) {
        self.push(ViewEvent::HideProgress);
    }

    fn clear_file_input(&self) {
        self.push(ViewEvent::ClearInput);
    }

    fn show_stream_modal(&self, filename: &str) {
        self.push(ViewEvent::ShowModal(filename.to_string()));
    }

    fn hide_stream_modal(&self) {
        self.push(ViewEvent::HideModal);
    }

    fn set_stream_source(&self, source: Option<&str>) {
        self.push(ViewEvent::Source(source.map(str::to_string)));
    }

    fn render_frame(&self, frame: &Bytes) {
        self.push(ViewEvent::Frame(frame.clone()));
    }

    fn set_slider(&self, value: f64) {
        self.push(ViewEvent::Slider(value));
    }

    fn set_slider_text(&self, text: &str) {
        self.push(ViewEvent::SliderText(text.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub dashboard: Dashboard,
    pub backend: Arc<FakeBackend>,
    pub view: Arc<RecordingView>,
}

pub fn harness() -> Harness {
    harness_with(DashboardConfig::default())
}

pub fn harness_with(config: DashboardConfig) -> Harness {
    let backend = FakeBackend::new();
    let view = RecordingView::new();
    let dashboard = Dashboard::new(backend.clone(), view.clone(), config);
    Harness {
        dashboard,
        backend,
        view,
    }
}

/// Let spawned tasks run to their next timer. With the clock paused this
/// advances time by only a millisecond.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

pub fn video(filename: &str, status: VideoStatus) -> VideoRecord {
    VideoRecord {
        filename: filename.into(),
        size_mb: 4.0,
        detected_count: 3,
        status,
        processed_at: None,
    }
}

pub fn stats_with_total(total: u64) -> Statistics {
    Statistics {
        total_detections: total,
        ..Statistics::default()
    }
}

/// Poll `condition` on the real clock, for tests that touch the
/// filesystem through blocking tasks.
pub async fn wait_until(condition: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
