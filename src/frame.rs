use bytes::Bytes;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tracing::trace;

/// A single captured screen frame: already-encoded JPEG bytes plus metadata.
///
/// The pixel data is opaque to this crate; the capture producer hands us
/// encoded bytes and we fan them out as-is. `Bytes` keeps the clone handed
/// to each streaming connection cheap.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Monotonically increasing frame identifier
    pub id: u64,
    /// Timestamp when the frame was stored
    pub timestamp: SystemTime,
    /// Encoded JPEG data
    pub data: Bytes,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get frame age in milliseconds
    pub fn age_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(self.timestamp)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Statistics for frame cache monitoring
#[derive(Debug)]
pub struct FrameCacheStats {
    /// Total frames stored by the capture producer
    pub frames_stored: AtomicU64,
    /// Total reads served to streaming connections
    pub frames_read: AtomicU64,
}

impl FrameCacheStats {
    fn new() -> Self {
        Self {
            frames_stored: AtomicU64::new(0),
            frames_read: AtomicU64::new(0),
        }
    }

    /// Get current statistics as a snapshot
    pub fn snapshot(&self) -> FrameCacheStatsSnapshot {
        FrameCacheStatsSnapshot {
            frames_stored: self.frames_stored.load(Ordering::Relaxed),
            frames_read: self.frames_read.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of frame cache statistics
#[derive(Debug, Clone)]
pub struct FrameCacheStatsSnapshot {
    pub frames_stored: u64,
    pub frames_read: u64,
}

/// Single-slot cache holding the most recently captured frame.
///
/// One writer (the capture producer) and any number of readers (streaming
/// connections) operate concurrently. Storing always replaces the previous
/// frame, never queues it, and never blocks on slow consumers; readers see
/// either the previous or the new frame, never a partial one. Intermediate
/// frames are deliberately dropped when consumers are slower than the
/// producer: freshness over completeness.
pub struct FrameCache {
    slot: RwLock<Option<Frame>>,
    frame_counter: AtomicU64,
    stats: FrameCacheStats,
}

impl FrameCache {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
            frame_counter: AtomicU64::new(0),
            stats: FrameCacheStats::new(),
        }
    }

    /// Store a new frame, replacing whatever was in the slot.
    ///
    /// Returns the id assigned to the stored frame.
    pub fn store(&self, data: Bytes) -> u64 {
        let id = self.frame_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let frame = Frame {
            id,
            timestamp: SystemTime::now(),
            data,
        };

        trace!("Storing frame {} ({} bytes)", frame.id, frame.len());

        {
            let mut slot = self.slot.write();
            *slot = Some(frame);
        }

        self.stats.frames_stored.fetch_add(1, Ordering::Relaxed);
        id
    }

    /// Get the most recently stored frame without blocking.
    ///
    /// Returns `None` until the first `store`. A reader polling faster than
    /// the producer simply sees the same frame id again.
    pub fn latest(&self) -> Option<Frame> {
        let frame = self.slot.read().clone();
        if frame.is_some() {
            self.stats.frames_read.fetch_add(1, Ordering::Relaxed);
        }
        frame
    }

    /// Whether any frame has been stored yet
    pub fn has_frame(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Get current cache statistics
    pub fn stats(&self) -> FrameCacheStatsSnapshot {
        self.stats.snapshot()
    }
}

impl Default for FrameCache {
    fn default() -> Self {
        Self::new()
    }
}
