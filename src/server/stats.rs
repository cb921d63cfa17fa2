use std::sync::atomic::{AtomicU64, Ordering};

/// Server-wide counters for monitoring, updated from connection tasks
#[derive(Debug, Default)]
pub struct ServerStats {
    /// Total connections accepted since startup
    pub connections_accepted: AtomicU64,
    /// Viewers currently in the multipart loop
    pub active_streams: AtomicU64,
    /// Frame parts written across all viewers
    pub frames_streamed: AtomicU64,
    /// Frame payload bytes written across all viewers
    pub bytes_streamed: AtomicU64,
    /// Control requests answered
    pub requests_served: AtomicU64,
    /// Connections terminated by an error
    pub connection_errors: AtomicU64,
}

impl ServerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_accepted(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stream_started(&self) {
        self.active_streams.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stream_ended(&self) {
        self.active_streams.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn frame_streamed(&self, bytes: usize) {
        self.frames_streamed.fetch_add(1, Ordering::Relaxed);
        self.bytes_streamed.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn request_served(&self) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_error(&self) {
        self.connection_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics as a snapshot
    pub fn snapshot(&self) -> ServerStatsSnapshot {
        ServerStatsSnapshot {
            connections_accepted: self.connections_accepted.load(Ordering::Relaxed),
            active_streams: self.active_streams.load(Ordering::Relaxed),
            frames_streamed: self.frames_streamed.load(Ordering::Relaxed),
            bytes_streamed: self.bytes_streamed.load(Ordering::Relaxed),
            requests_served: self.requests_served.load(Ordering::Relaxed),
            connection_errors: self.connection_errors.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of server statistics
#[derive(Debug, Clone)]
pub struct ServerStatsSnapshot {
    pub connections_accepted: u64,
    pub active_streams: u64,
    pub frames_streamed: u64,
    pub bytes_streamed: u64,
    pub requests_served: u64,
    pub connection_errors: u64,
}
