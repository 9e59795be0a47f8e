//! Bounded output streams.
//!
//! Scripts running on their own tasks write into ring-buffer-backed
//! streams that:
//! - Bound memory usage (a runaway script can't exhaust memory)
//! - Evict oldest data when capacity is exceeded
//! - Support concurrent writes from many tasks

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Default maximum size for bounded streams (1MB).
pub const DEFAULT_STREAM_MAX_SIZE: usize = 1024 * 1024;

/// A bounded stream backed by a ring buffer.
///
/// When writes exceed capacity, the oldest data is evicted to make room.
/// Clones share the same buffer.
///
/// # Example
///
/// ```ignore
/// use mythos_kernel::scheduler::BoundedStream;
///
/// let stream = BoundedStream::new(100); // 100 byte max
///
/// stream.write(b"hello ").await;
/// stream.write(b"world").await;
///
/// assert_eq!(stream.take_string().await, "hello world");
/// assert!(stream.is_empty().await);
/// ```
#[derive(Clone)]
pub struct BoundedStream {
    inner: Arc<RwLock<BoundedStreamInner>>,
}

struct BoundedStreamInner {
    buffer: VecDeque<u8>,
    max_size: usize,
}

impl BoundedStream {
    /// Create a new bounded stream with the specified maximum size.
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(BoundedStreamInner {
                buffer: VecDeque::with_capacity(max_size.min(8192)),
                max_size,
            })),
        }
    }

    /// Create a new bounded stream with the default max size.
    pub fn default_size() -> Self {
        Self::new(DEFAULT_STREAM_MAX_SIZE)
    }

    /// Append data, evicting the oldest bytes if the buffer would overflow.
    pub async fn write(&self, data: &[u8]) {
        let mut inner = self.inner.write().await;

        // Oversized writes keep only their tail
        if data.len() >= inner.max_size {
            let start = data.len() - inner.max_size;
            inner.buffer.clear();
            inner.buffer.extend(&data[start..]);
            return;
        }

        let available = inner.max_size.saturating_sub(inner.buffer.len());
        if data.len() > available {
            let evict = (data.len() - available).min(inner.buffer.len());
            inner.buffer.drain(..evict);
        }
        inner.buffer.extend(data);
    }

    pub async fn write_str(&self, text: &str) {
        self.write(text.as_bytes()).await;
    }

    /// Drain the buffer, returning what it held.
    pub async fn take_string(&self) -> String {
        let mut inner = self.inner.write().await;
        let data: Vec<u8> = inner.buffer.drain(..).collect();
        String::from_utf8_lossy(&data).into_owned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.buffer.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl std::fmt::Debug for BoundedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedStream")
            .field("inner", &"<locked>")
            .finish()
    }
}

/// Paired out/err streams a stage writes into.
#[derive(Debug, Clone)]
pub struct OutputSink {
    pub out: BoundedStream,
    pub err: BoundedStream,
}

impl Default for OutputSink {
    fn default() -> Self {
        Self {
            out: BoundedStream::default_size(),
            err: BoundedStream::default_size(),
        }
    }
}
