use async_trait::async_trait;
use std::time::Duration;

/// Fixed stroke duration for swipes
pub const SWIPE_DURATION: Duration = Duration::from_millis(300);

/// Fixed hold duration for long presses
pub const LONG_PRESS_DURATION: Duration = Duration::from_millis(1000);

/// A pointer gesture to inject on the device.
///
/// Coordinates are in capture space when a request is built from a control
/// endpoint and in device space after `CoordinateMapper::map_request`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureRequest {
    Tap {
        x: f32,
        y: f32,
    },
    Swipe {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        duration: Duration,
    },
    LongPress {
        x: f32,
        y: f32,
    },
}

impl GestureRequest {
    pub fn tap(x: f32, y: f32) -> Self {
        Self::Tap { x, y }
    }

    pub fn swipe(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::Swipe {
            x1,
            y1,
            x2,
            y2,
            duration: SWIPE_DURATION,
        }
    }

    pub fn long_press(x: f32, y: f32) -> Self {
        Self::LongPress { x, y }
    }

    /// Gesture kind as a string for logging
    pub fn kind(&self) -> &'static str {
        match self {
            GestureRequest::Tap { .. } => "tap",
            GestureRequest::Swipe { .. } => "swipe",
            GestureRequest::LongPress { .. } => "long_press",
        }
    }
}

/// Contract for the external gesture-injection collaborator.
///
/// Dispatch is fire-and-forget: no return value, no delivery confirmation.
/// `supports_gestures` reports whether the platform can inject at all; it is
/// checked once when the dispatcher is registered rather than on every call.
#[async_trait]
pub trait GestureDispatch: Send + Sync {
    /// Whether gesture injection is supported on this platform/version
    fn supports_gestures(&self) -> bool;

    /// Inject one gesture. Coordinates are in device space.
    async fn dispatch(&self, request: GestureRequest);
}
