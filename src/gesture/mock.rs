use super::dispatch::{GestureDispatch, GestureRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

/// Mock gesture dispatcher for testing without real injection hardware.
///
/// Records every dispatched request so tests can assert on what reached the
/// collaborator seam.
pub struct MockGestureDispatch {
    supported: bool,
    dispatched: Mutex<Vec<GestureRequest>>,
}

impl MockGestureDispatch {
    pub fn new() -> Self {
        Self::with_support(true)
    }

    /// Create a mock that reports the given platform capability
    pub fn with_support(supported: bool) -> Self {
        Self {
            supported,
            dispatched: Mutex::new(Vec::new()),
        }
    }

    /// Requests dispatched so far, in order
    pub fn dispatched(&self) -> Vec<GestureRequest> {
        self.dispatched.lock().clone()
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatched.lock().len()
    }
}

impl Default for MockGestureDispatch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GestureDispatch for MockGestureDispatch {
    fn supports_gestures(&self) -> bool {
        self.supported
    }

    async fn dispatch(&self, request: GestureRequest) {
        debug!("Mock gesture dispatched: {:?}", request);
        self.dispatched.lock().push(request);
    }
}
