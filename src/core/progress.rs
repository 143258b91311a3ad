//! Upload progress driven by the bytes actually handed to the transport.

use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use serde::Serialize;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::watch;
use tracing::debug;
use crate::core::OptimizedImage;

/// Progress message type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgressStatus {
    Pending,
    Uploading,
    Complete,
}

/// Snapshot published after every read from the wrapped body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgress {
    pub bytes_sent: u64,
    pub total_bytes: u64,
    /// Progress percentage (0-100)
    pub percentage: u8,
    pub status: ProgressStatus,
}

impl UploadProgress {
    pub fn new(bytes_sent: u64, total_bytes: u64, status: ProgressStatus) -> Self {
        let percentage = match (status, total_bytes) {
            (ProgressStatus::Complete, _) => 100,
            (_, 0) => 0,
            _ => ((bytes_sent.min(total_bytes) * 100) / total_bytes) as u8,
        };

        Self {
            bytes_sent,
            total_bytes,
            percentage,
            status,
        }
    }
}

/// Wraps an upload body and reports how much of it has been consumed.
///
/// Progress is observed through the [`watch::Receiver`] returned by
/// [`ProgressReader::new`]; intermediate values may be skipped by slow
/// observers, the latest one never is.
pub struct ProgressReader<R> {
    inner: R,
    bytes_sent: u64,
    total_bytes: u64,
    tx: watch::Sender<UploadProgress>,
}

impl<R> ProgressReader<R> {
    pub fn new(inner: R, total_bytes: u64) -> (Self, watch::Receiver<UploadProgress>) {
        let (tx, rx) = watch::channel(UploadProgress::new(0, total_bytes, ProgressStatus::Pending));
        let reader = Self {
            inner,
            bytes_sent: 0,
            total_bytes,
            tx,
        };
        (reader, rx)
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn publish(&self, status: ProgressStatus) {
        self.tx
            .send_replace(UploadProgress::new(self.bytes_sent, self.total_bytes, status));
    }
}

impl ProgressReader<Cursor<Arc<[u8]>>> {
    /// Upload body over an optimized image's bytes.
    pub fn for_image(image: &OptimizedImage) -> (Self, watch::Receiver<UploadProgress>) {
        debug!("Preparing upload body for '{}' ({} bytes)", image.name, image.size_bytes());
        Self::new(Cursor::new(Arc::clone(&image.data)), image.size_bytes())
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let had_room = buf.remaining() > 0;
        let before = buf.filled().len();

        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                let read = buf.filled().len() - before;
                if read > 0 {
                    this.bytes_sent += read as u64;
                    this.publish(ProgressStatus::Uploading);
                } else if had_room {
                    // Zero-length read into a non-empty buffer means EOF
                    this.publish(ProgressStatus::Complete);
                }
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}
