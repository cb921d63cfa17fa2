use crate::error::Result;
use crate::frame::FrameCache;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Capture stand-in that re-stores the bytes of one JPEG file at the
/// capture cadence.
///
/// The real producer is a platform screen-capture pipeline outside this
/// crate; it just calls `FrameCache::store`. This source exists so the
/// streaming path can be exercised end-to-end without that pipeline, from
/// the `--frame-file` flag or from tests.
pub struct FileFrameSource {
    data: Bytes,
    cache: Arc<FrameCache>,
    frame_interval: Duration,
}

impl FileFrameSource {
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        cache: Arc<FrameCache>,
        fps: u32,
    ) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        info!(
            "Loaded test frame from {} ({} bytes)",
            path.as_ref().display(),
            data.len()
        );

        Ok(Self::from_bytes(Bytes::from(data), cache, fps))
    }

    pub fn from_bytes(data: Bytes, cache: Arc<FrameCache>, fps: u32) -> Self {
        Self {
            data,
            cache,
            frame_interval: Duration::from_micros(1_000_000u64 / fps.max(1) as u64),
        }
    }

    /// Spawn the producer loop; it runs until the token is cancelled
    pub fn spawn(self, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.frame_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        debug!("Frame source stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.cache.store(self.data.clone());
                    }
                }
            }
        })
    }
}
