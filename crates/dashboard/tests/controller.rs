//! Tests for `Dashboard` input wiring and lifecycle.

mod common;

use std::io::Write;
use std::time::Duration;

use common::{harness, settle, wait_until, Call, Endpoint, ViewEvent};
use pizzawatch_dashboard::{DashboardInput, Key};

fn video_file(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".mp4")
        .tempfile()
        .expect("temp file");
    file.write_all(bytes).expect("write temp file");
    file
}

// ---------------------------------------------------------------------------
// Test: drag highlight follows drag-over and drag-leave
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn drag_toggles_highlight() {
    let h = harness();

    h.dashboard.handle(DashboardInput::DragOver);
    h.dashboard.handle(DashboardInput::DragLeave);

    assert_eq!(
        h.view.events(),
        vec![ViewEvent::Highlight(true), ViewEvent::Highlight(false)]
    );
}

// ---------------------------------------------------------------------------
// Test: dropping several files uploads only the first
// ---------------------------------------------------------------------------

#[tokio::test]
async fn drop_uploads_first_file_only() {
    let h = harness();
    let first = video_file(b"first video");
    let second = video_file(b"second video");
    let first_name = first
        .path()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();

    h.dashboard.handle(DashboardInput::FilesDropped(vec![
        first.path().to_path_buf(),
        second.path().to_path_buf(),
    ]));

    assert!(wait_until(|| h.view.toast_messages().len() == 1).await);
    assert_eq!(h.backend.calls(), vec![Call::Upload(first_name)]);
    assert_eq!(h.view.events()[0], ViewEvent::Highlight(false));
    assert_eq!(
        h.view.toast_messages(),
        vec!["Upload successful! Processing video…"]
    );
}

// ---------------------------------------------------------------------------
// Test: an empty drop does nothing beyond clearing the highlight
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn empty_drop_is_ignored() {
    let h = harness();

    h.dashboard.handle(DashboardInput::FilesDropped(Vec::new()));
    settle().await;

    assert_eq!(h.view.events(), vec![ViewEvent::Highlight(false)]);
    assert!(h.backend.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Test: selecting a file that cannot be read reports a generic failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreadable_selection_reports_generic_error() {
    let h = harness();

    h.dashboard.handle(DashboardInput::FileSelected(
        "/definitely/not/here/demo.mp4".into(),
    ));

    assert!(wait_until(|| !h.view.toast_messages().is_empty()).await);
    assert_eq!(
        h.view.toast_messages(),
        vec!["An error occurred during upload!"]
    );
    assert!(h.backend.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Test: a selected file of the wrong type is rejected before upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn selected_image_is_rejected() {
    let h = harness();
    let image = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("temp file");

    h.dashboard
        .handle(DashboardInput::FileSelected(image.path().to_path_buf()));

    assert!(wait_until(|| !h.view.toast_messages().is_empty()).await);
    assert_eq!(h.view.toast_messages(), vec!["File format not supported!"]);
    assert_eq!(h.backend.count(Endpoint::Upload), 0);
}

// ---------------------------------------------------------------------------
// Test: clicking the upload area opens the chooser
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn upload_area_click_opens_chooser() {
    let h = harness();

    h.dashboard.handle(DashboardInput::UploadAreaClicked);

    assert_eq!(h.view.events(), vec![ViewEvent::FileChooser]);
}

// ---------------------------------------------------------------------------
// Test: Escape closes the viewer only while it is visible
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn escape_closes_visible_modal_only() {
    let h = harness();

    h.dashboard.handle(DashboardInput::KeyPressed(Key::Escape));
    assert!(h.view.events().is_empty());

    h.dashboard
        .handle(DashboardInput::StreamRequested("demo.mp4".into()));
    settle().await;
    h.dashboard.handle(DashboardInput::KeyPressed(Key::Other));
    assert!(h.dashboard.streams().is_modal_visible());

    h.dashboard.handle(DashboardInput::KeyPressed(Key::Escape));
    assert!(!h.dashboard.streams().is_modal_visible());
    assert_eq!(h.view.count(|e| *e == ViewEvent::HideModal), 1);
}

// ---------------------------------------------------------------------------
// Test: backdrop and close button both close the viewer silently
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn backdrop_and_button_close_the_modal() {
    let h = harness();

    for close in [
        DashboardInput::ModalBackdropClicked,
        DashboardInput::ModalCloseClicked,
    ] {
        h.dashboard
            .handle(DashboardInput::StreamRequested("demo.mp4".into()));
        settle().await;
        h.dashboard.handle(close);
        settle().await;
        assert!(!h.dashboard.streams().is_modal_visible());
    }

    assert_eq!(h.view.count(|e| *e == ViewEvent::HideModal), 2);
    assert!(h.view.toasts().is_empty());
}

// ---------------------------------------------------------------------------
// Test: clicking a toast dismisses it
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn toast_click_dismisses() {
    let h = harness();
    let id = h.dashboard.notifications().info("Stream ended");

    h.dashboard.handle(DashboardInput::ToastClicked(id));

    assert!(h.dashboard.notifications().active().is_empty());
    assert!(h.view.visible_toasts().is_empty());
}

// ---------------------------------------------------------------------------
// Test: slider, submit and feedback inputs reach their components
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn inputs_are_dispatched() {
    let h = harness();

    h.dashboard.handle(DashboardInput::SliderMoved(0.75));
    h.dashboard.handle(DashboardInput::ThresholdSubmitted);
    h.dashboard.handle(DashboardInput::FeedbackGiven {
        track_id: 42,
        is_correct: true,
    });
    h.dashboard.handle(DashboardInput::ClassesSubmitted(vec![53]));
    settle().await;

    let calls = h.backend.calls();
    assert!(calls.contains(&Call::SetSettings(0.75)));
    assert!(calls.contains(&Call::Feedback {
        track_id: 42,
        is_correct: true
    }));
    assert!(calls.contains(&Call::SetClasses(vec![53])));
    // The class update reloads the selection.
    assert!(calls.contains(&Call::GetClasses));
}

#[tokio::test(start_paused = true)]
async fn classes_requested_loads_selection() {
    let h = harness();

    h.dashboard.handle(DashboardInput::ClassesRequested);
    settle().await;

    assert_eq!(h.backend.calls(), vec![Call::GetClasses]);
    assert_eq!(h.view.count(|e| matches!(e, ViewEvent::Classes(_))), 1);
}

// ---------------------------------------------------------------------------
// Test: starting twice does not duplicate the polling loops
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn start_is_idempotent() {
    let h = harness();

    h.dashboard.start();
    h.dashboard.start();
    settle().await;
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(h.backend.count(Endpoint::Stats), 2);
    assert_eq!(h.backend.count(Endpoint::GetSettings), 1);
}

// ---------------------------------------------------------------------------
// Test: page hidden is diagnostic only
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn page_hidden_changes_nothing() {
    let h = harness();
    h.dashboard
        .handle(DashboardInput::StreamRequested("demo.mp4".into()));
    settle().await;
    let before = h.view.events();

    h.dashboard.handle(DashboardInput::PageHidden);

    assert_eq!(h.view.events(), before);
    assert!(h.dashboard.streams().active_stream().is_some());
}

// ---------------------------------------------------------------------------
// Test: shutdown tears down the stream and stops background work
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn shutdown_tears_everything_down() {
    let h = harness();
    h.dashboard.start();
    h.dashboard
        .handle(DashboardInput::StreamRequested("demo.mp4".into()));
    settle().await;

    h.dashboard.shutdown().await;
    h.backend.send_frame(0, b"late");
    tokio::time::sleep(Duration::from_secs(90)).await;

    assert!(h.dashboard.streams().active_stream().is_none());
    assert!(h.view.frames().is_empty());
    assert!(h.view.toasts().is_empty());
    assert_eq!(h.backend.count(Endpoint::Stats), 1);
}

// ---------------------------------------------------------------------------
// Test: shutdown does not wait out pending toast timers
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn shutdown_with_pending_toast_is_prompt() {
    let h = harness();
    let notifications = h.dashboard.notifications();
    notifications.info("Stream ended");

    let started = tokio::time::Instant::now();
    h.dashboard.shutdown().await;

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(notifications.active().len(), 1);
}
