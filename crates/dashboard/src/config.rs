use std::time::Duration;

/// How a feed treats responses that arrive out of issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencePolicy {
    /// Drop a response older than the last one rendered for its feed.
    DiscardStale,
    /// Render every response in arrival order.
    RenderLatestReceived,
}

/// Dashboard configuration loaded from environment variables.
///
/// [`Default`] holds the production timings; tests override single
/// fields with struct update syntax.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend base URL.
    pub api_url: String,
    pub stats_interval: Duration,
    pub videos_interval: Duration,
    pub detections_interval: Duration,
    /// Lifetime of a notification before it expires.
    pub toast_ttl: Duration,
    /// Delay between a successful upload and the library refresh.
    pub upload_grace: Duration,
    /// Deadline for JSON request/response calls and stream connects.
    pub request_timeout: Duration,
    /// Deadline for the whole upload transfer.
    pub upload_timeout: Duration,
    /// Settle delay logged after the stream modal closes.
    pub modal_settle: Duration,
    /// How long shutdown waits for in-flight tasks.
    pub shutdown_timeout: Duration,
    pub sequence_policy: SequencePolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5000".into(),
            stats_interval: Duration::from_secs(30),
            videos_interval: Duration::from_secs(60),
            detections_interval: Duration::from_secs(45),
            toast_ttl: Duration::from_secs(5),
            upload_grace: Duration::from_millis(2000),
            request_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(1800),
            modal_settle: Duration::from_millis(100),
            shutdown_timeout: Duration::from_secs(5),
            sequence_policy: SequencePolicy::DiscardStale,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `PIZZAWATCH_API_URL`       | `http://127.0.0.1:5000` |
    /// | `STATS_INTERVAL_SECS`      | `30`                    |
    /// | `VIDEOS_INTERVAL_SECS`     | `60`                    |
    /// | `DETECTIONS_INTERVAL_SECS` | `45`                    |
    /// | `TOAST_TTL_SECS`           | `5`                     |
    /// | `UPLOAD_GRACE_MS`          | `2000`                  |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                    |
    /// | `UPLOAD_TIMEOUT_SECS`      | `1800`                  |
    /// | `DISCARD_STALE_RESPONSES`  | `true`                  |
    ///
    /// Unparseable values are logged and replaced by the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_url = lookup("PIZZAWATCH_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_url);

        let sequence_policy = if parse_or(&lookup, "DISCARD_STALE_RESPONSES", true) {
            SequencePolicy::DiscardStale
        } else {
            SequencePolicy::RenderLatestReceived
        };

        Self {
            api_url,
            stats_interval: secs(&lookup, "STATS_INTERVAL_SECS", defaults.stats_interval),
            videos_interval: secs(&lookup, "VIDEOS_INTERVAL_SECS", defaults.videos_interval),
            detections_interval: secs(&lookup, "DETECTIONS_INTERVAL_SECS", defaults.detections_interval),
            toast_ttl: secs(&lookup, "TOAST_TTL_SECS", defaults.toast_ttl),
            upload_grace: millis(&lookup, "UPLOAD_GRACE_MS", defaults.upload_grace),
            request_timeout: secs(&lookup, "REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            upload_timeout: secs(&lookup, "UPLOAD_TIMEOUT_SECS", defaults.upload_timeout),
            sequence_policy,
            ..defaults
        }
    }
}

/// Parse `key` if set; garbage falls back to `default`.
fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = %raw, default = %default, "Ignoring invalid configuration value");
            default
        }
    }
}

fn secs(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: Duration) -> Duration {
    match parse_or(lookup, key, default.as_secs()) {
        0 => {
            tracing::warn!(key, "Zero duration is not allowed, using default");
            default
        }
        n => Duration::from_secs(n),
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: Duration) -> Duration {
    Duration::from_millis(parse_or(lookup, key, default.as_millis() as u64))
}
