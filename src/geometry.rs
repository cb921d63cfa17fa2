use crate::gesture::GestureRequest;
use serde::{Deserialize, Serialize};

/// Capture and device resolutions for one capture session.
///
/// The capture producer scales the screen down before encoding, so incoming
/// gesture coordinates arrive in capture space and must be remapped to the
/// real device resolution before injection. Geometry is fixed for the
/// lifetime of a session; a resolution change means a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenGeometry {
    /// Width of the scaled-down capture image in pixels
    pub capture_width: u32,
    /// Height of the scaled-down capture image in pixels
    pub capture_height: u32,
    /// Real device screen width in pixels
    pub device_width: u32,
    /// Real device screen height in pixels
    pub device_height: u32,
}

impl ScreenGeometry {
    pub fn new(
        capture_width: u32,
        capture_height: u32,
        device_width: u32,
        device_height: u32,
    ) -> Self {
        Self {
            capture_width,
            capture_height,
            device_width,
            device_height,
        }
    }
}

/// Maps pointer coordinates from capture space into device space.
///
/// Independent X and Y scales are applied for every gesture kind, so a
/// non-uniform aspect change between capture and device keeps taps on
/// target.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    scale_x: f32,
    scale_y: f32,
}

impl CoordinateMapper {
    pub fn new(geometry: ScreenGeometry) -> Self {
        Self {
            scale_x: geometry.device_width as f32 / geometry.capture_width as f32,
            scale_y: geometry.device_height as f32 / geometry.capture_height as f32,
        }
    }

    pub fn scale_x(&self) -> f32 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f32 {
        self.scale_y
    }

    /// Map one coordinate pair from capture space to device space
    pub fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale_x, y * self.scale_y)
    }

    /// Map every coordinate pair in a gesture request
    pub fn map_request(&self, request: GestureRequest) -> GestureRequest {
        match request {
            GestureRequest::Tap { x, y } => {
                let (x, y) = self.map(x, y);
                GestureRequest::Tap { x, y }
            }
            GestureRequest::Swipe {
                x1,
                y1,
                x2,
                y2,
                duration,
            } => {
                let (x1, y1) = self.map(x1, y1);
                let (x2, y2) = self.map(x2, y2);
                GestureRequest::Swipe {
                    x1,
                    y1,
                    x2,
                    y2,
                    duration,
                }
            }
            GestureRequest::LongPress { x, y } => {
                let (x, y) = self.map(x, y);
                GestureRequest::LongPress { x, y }
            }
        }
    }
}
