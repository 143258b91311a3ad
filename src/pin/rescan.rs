use std::sync::Arc;
use std::time::Duration;
use futures_util::future::BoxFuture;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::debug;

/// Quiet period after the last content change before fields are re-scanned.
pub const DEFAULT_RESCAN_DELAY: Duration = Duration::from_millis(100);

type RescanFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Coalesces "content changed" notifications into a single delayed re-scan.
///
/// Each [`notify`](Self::notify) restarts the quiet period; the callback runs
/// once the period elapses with no further notifications. Dropping the
/// debouncer stops its worker task.
pub struct RescanDebouncer {
    changes: mpsc::UnboundedSender<()>,
    worker: JoinHandle<()>,
}

impl RescanDebouncer {
    /// Starts the worker on the current tokio runtime.
    pub fn new<F>(delay: Duration, rescan: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run(rx, delay, Arc::new(rescan)));
        Self { changes: tx, worker }
    }

    pub fn with_default_delay<F>(rescan: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        Self::new(DEFAULT_RESCAN_DELAY, rescan)
    }

    /// Reports that new content (possibly new PIN fields) appeared.
    pub fn notify(&self) {
        // Only fails once the worker is gone, at which point nobody is listening.
        let _ = self.changes.send(());
    }
}

impl Drop for RescanDebouncer {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run(mut rx: mpsc::UnboundedReceiver<()>, delay: Duration, rescan: RescanFn) {
    while rx.recv().await.is_some() {
        let mut merged = 1usize;
        loop {
            match timeout(delay, rx.recv()).await {
                Ok(Some(())) => merged += 1,
                Ok(None) => return,
                Err(_) => break,
            }
        }

        debug!("Re-scanning PIN fields after {} change notification(s)", merged);
        rescan().await;
    }
}
