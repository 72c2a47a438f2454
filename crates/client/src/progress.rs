//! Upload transfer progress.

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use tokio::sync::mpsc;

/// One transfer-progress signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub loaded: u64,
    /// `None` when the total length is not computable.
    pub total: Option<u64>,
}

impl TransferProgress {
    /// Completion percentage in `[0, 100]`, if the total is known.
    pub fn percent(&self) -> Option<f64> {
        let total = self.total?;
        if total == 0 {
            return Some(100.0);
        }
        Some((self.loaded as f64 / total as f64 * 100.0).min(100.0))
    }
}

/// Wrap a body stream so every chunk handed to the transport reports the
/// cumulative byte count on `progress`.
///
/// Send failures are ignored: a dropped receiver only means nobody is
/// watching.
pub fn report_progress<S>(
    body: S,
    total: Option<u64>,
    progress: mpsc::UnboundedSender<TransferProgress>,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static,
{
    let mut loaded = 0u64;
    body.inspect_ok(move |chunk| {
        loaded += chunk.len() as u64;
        let _ = progress.send(TransferProgress { loaded, total });
    })
}
