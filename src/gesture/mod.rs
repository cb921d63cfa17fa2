mod dispatch;
mod mock;
mod registry;

pub use dispatch::{GestureDispatch, GestureRequest, LONG_PRESS_DURATION, SWIPE_DURATION};
pub use mock::MockGestureDispatch;
pub use registry::GestureRegistry;
