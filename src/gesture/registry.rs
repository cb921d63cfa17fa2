use super::dispatch::GestureDispatch;
use crate::error::GestureError;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

/// Registration slot for the gesture-dispatch collaborator.
///
/// The collaborator owns its own lifecycle; the server only observes whether
/// one is currently registered. This replaces an ambient global singleton
/// with an explicit reference handed to the control handler at construction
/// time.
pub struct GestureRegistry {
    dispatcher: RwLock<Option<Arc<dyn GestureDispatch>>>,
}

impl GestureRegistry {
    pub fn new() -> Self {
        Self {
            dispatcher: RwLock::new(None),
        }
    }

    /// Register a dispatcher, replacing any previous registration.
    ///
    /// A dispatcher whose platform cannot inject gestures is rejected and
    /// the previous registration (if any) stays in place.
    pub fn register(
        &self,
        dispatcher: Arc<dyn GestureDispatch>,
    ) -> Result<(), GestureError> {
        if !dispatcher.supports_gestures() {
            warn!("Gesture dispatcher rejected: platform does not support gesture injection");
            return Err(GestureError::Unsupported);
        }

        *self.dispatcher.write() = Some(dispatcher);
        info!("Gesture dispatcher registered");
        Ok(())
    }

    /// Remove the current registration, if any
    pub fn deregister(&self) {
        let previous = self.dispatcher.write().take();
        if previous.is_some() {
            info!("Gesture dispatcher deregistered");
        }
    }

    /// Get the currently registered dispatcher
    pub fn current(&self) -> Option<Arc<dyn GestureDispatch>> {
        self.dispatcher.read().clone()
    }

    /// Whether gesture requests can currently be serviced
    pub fn is_available(&self) -> bool {
        self.dispatcher.read().is_some()
    }
}

impl Default for GestureRegistry {
    fn default() -> Self {
        Self::new()
    }
}
