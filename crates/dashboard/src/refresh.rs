//! Polling scheduler for the statistics, video library and detection
//! feeds.
//!
//! Each feed has its own repeating timer. Every tick (and every
//! invalidation signal) spawns an independent fetch-and-render task, so a
//! slow or failing feed never delays the others. Failures are logged,
//! never shown to the operator.
//!
//! Fetches for one feed may overlap. Each is tagged with a per-feed
//! sequence number; under [`SequencePolicy::DiscardStale`] a response
//! older than the last rendered one is dropped.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::SequencePolicy;
use crate::context::DashboardContext;
use crate::view;

/// One independently refreshed slice of backend state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    Statistics,
    Videos,
    Detections,
}

impl Feed {
    pub const ALL: [Feed; 3] = [Feed::Statistics, Feed::Videos, Feed::Detections];

    pub fn name(self) -> &'static str {
        match self {
            Feed::Statistics => "statistics",
            Feed::Videos => "videos",
            Feed::Detections => "detections",
        }
    }

    fn index(self) -> usize {
        match self {
            Feed::Statistics => 0,
            Feed::Videos => 1,
            Feed::Detections => 2,
        }
    }
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Sender side of the invalidation channel.
///
/// Components that mutate backend state call [`invalidate`](Self::invalidate)
/// instead of fetching themselves, keeping the scheduler the single
/// source of truth for each feed.
#[derive(Clone)]
pub struct RefreshHandle {
    tx: mpsc::UnboundedSender<Feed>,
}

impl RefreshHandle {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Feed>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Request an out-of-band refresh of `feed`.
    pub fn invalidate(&self, feed: Feed) {
        if self.tx.send(feed).is_err() {
            tracing::debug!(%feed, "Refresh scheduler stopped, invalidation dropped");
        }
    }
}

/// Issued/rendered sequence numbers for one feed.
#[derive(Default)]
struct FeedSequence {
    /// Last issued sequence number.
    issued: Mutex<u64>,
    /// Highest sequence number rendered so far.
    rendered: Mutex<u64>,
}

impl FeedSequence {
    fn issue(&self) -> u64 {
        let mut issued = self.issued.lock().unwrap_or_else(PoisonError::into_inner);
        *issued += 1;
        *issued
    }

    /// Render `seq` through `render` unless the policy says it is stale.
    ///
    /// The rendered lock is held across `render` so that two responses
    /// for the same feed cannot interleave their check and render.
    fn render_if_current(&self, seq: u64, policy: SequencePolicy, render: impl FnOnce()) -> bool {
        let mut rendered = self.rendered.lock().unwrap_or_else(PoisonError::into_inner);
        if policy == SequencePolicy::DiscardStale && seq < *rendered {
            return false;
        }
        *rendered = (*rendered).max(seq);
        render();
        true
    }
}

/// Runs the three polling loops and serves invalidations.
pub struct RefreshScheduler {
    ctx: Arc<DashboardContext>,
    sequences: [FeedSequence; 3],
}

impl RefreshScheduler {
    pub fn new(ctx: Arc<DashboardContext>) -> Arc<Self> {
        Arc::new(Self {
            ctx,
            sequences: Default::default(),
        })
    }

    fn period(&self, feed: Feed) -> Duration {
        let config = &self.ctx.config;
        match feed {
            Feed::Statistics => config.stats_interval,
            Feed::Videos => config.videos_interval,
            Feed::Detections => config.detections_interval,
        }
    }

    /// Fetch every feed once, then poll until shutdown.
    ///
    /// The initial fetches run in parallel; the first timer tick for each
    /// feed comes one full period later.
    pub async fn run(self: Arc<Self>, mut invalidations: mpsc::UnboundedReceiver<Feed>) {
        for feed in Feed::ALL {
            self.spawn_refresh(feed);
        }

        let ticker = |feed: Feed| {
            let period = self.period(feed);
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        };
        let mut stats = ticker(Feed::Statistics);
        let mut videos = ticker(Feed::Videos);
        let mut detections = ticker(Feed::Detections);

        tracing::info!(
            stats_secs = self.period(Feed::Statistics).as_secs(),
            videos_secs = self.period(Feed::Videos).as_secs(),
            detections_secs = self.period(Feed::Detections).as_secs(),
            "Refresh scheduler started",
        );

        let cancel = self.ctx.cancellation().clone();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Refresh scheduler stopping");
                    break;
                }
                _ = stats.tick() => self.spawn_refresh(Feed::Statistics),
                _ = videos.tick() => self.spawn_refresh(Feed::Videos),
                _ = detections.tick() => self.spawn_refresh(Feed::Detections),
                Some(feed) = invalidations.recv() => {
                    tracing::debug!(%feed, "Feed invalidated");
                    self.spawn_refresh(feed);
                }
            }
        }
    }

    /// Issue a sequence number and fetch `feed` in its own task.
    pub fn spawn_refresh(self: &Arc<Self>, feed: Feed) {
        let seq = self.sequences[feed.index()].issue();
        let scheduler = Arc::clone(self);
        self.ctx.spawn(async move {
            scheduler.refresh(feed, seq).await;
        });
    }

    /// Fetch one feed and render it if the response is still current.
    async fn refresh(&self, feed: Feed, seq: u64) {
        let ctx = &self.ctx;
        let sequence = &self.sequences[feed.index()];
        let policy = ctx.config.sequence_policy;

        let rendered = match feed {
            Feed::Statistics => match ctx.request(ctx.backend.get_stats()).await {
                Ok(stats) => sequence.render_if_current(seq, policy, || {
                    let now = chrono::Local::now().time();
                    ctx.view.render_stats(&view::stats_panel(&stats, now));
                }),
                Err(e) => {
                    tracing::warn!(%feed, seq, error = %e, "Error loading stats");
                    return;
                }
            },
            Feed::Videos => match ctx.request(ctx.backend.get_videos()).await {
                Ok(videos) => sequence.render_if_current(seq, policy, || {
                    ctx.view.render_videos(&view::video_grid(&videos));
                }),
                Err(e) => {
                    tracing::warn!(%feed, seq, error = %e, "Error loading video library");
                    return;
                }
            },
            Feed::Detections => match ctx.request(ctx.backend.get_detections()).await {
                Ok(detections) => sequence.render_if_current(seq, policy, || {
                    ctx.view.render_detections(&view::detection_list(&detections));
                }),
                Err(e) => {
                    tracing::warn!(%feed, seq, error = %e, "Error loading detections");
                    return;
                }
            },
        };

        if rendered {
            tracing::debug!(%feed, seq, "Feed rendered");
        } else {
            tracing::debug!(%feed, seq, "Discarded stale response");
        }
    }
}
