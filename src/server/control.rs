use super::request::{float_param, RequestLine};
use super::response::ControlResponse;
use crate::geometry::{CoordinateMapper, ScreenGeometry};
use crate::gesture::{GestureRegistry, GestureRequest};
use crate::volume::VolumeControl;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Stateless request handlers for the volume and gesture endpoints.
///
/// Holds explicit references to the shared state it touches; nothing here
/// reaches for globals. One instance serves every control connection.
pub struct ControlHandler {
    volume: Arc<VolumeControl>,
    registry: Arc<GestureRegistry>,
    mapper: CoordinateMapper,
    geometry: ScreenGeometry,
}

impl ControlHandler {
    pub fn new(
        volume: Arc<VolumeControl>,
        registry: Arc<GestureRegistry>,
        geometry: ScreenGeometry,
    ) -> Self {
        Self {
            volume,
            registry,
            mapper: CoordinateMapper::new(geometry),
            geometry,
        }
    }

    /// Route one control request to its handler. Unknown paths get 404.
    pub async fn handle(&self, request: &RequestLine) -> ControlResponse {
        let route = request.route();
        debug!("Control request: {} {}", request.method, request.path);

        match route {
            "/status" => self.handle_status(),
            "/volume/up" => {
                self.volume.up();
                ControlResponse::ok_text()
            }
            "/volume/down" => {
                self.volume.down();
                ControlResponse::ok_text()
            }
            "/volume/mute" => {
                self.volume.toggle_mute();
                ControlResponse::ok_text()
            }
            "/touch" => self.handle_tap(&request.query_params()).await,
            "/swipe" => self.handle_swipe(&request.query_params()).await,
            "/longpress" => self.handle_long_press(&request.query_params()).await,
            _ if route.starts_with("/volume/set/") => self.handle_volume_set(route),
            _ => ControlResponse::not_found(),
        }
    }

    fn handle_status(&self) -> ControlResponse {
        let volume = self.volume.state();
        ControlResponse::json(
            200,
            json!({
                "volume": volume.current,
                "max": volume.max,
                "width": self.geometry.capture_width,
                "height": self.geometry.capture_height,
                "touchEnabled": self.registry.is_available(),
                "realWidth": self.geometry.device_width,
                "realHeight": self.geometry.device_height,
            }),
        )
    }

    fn handle_volume_set(&self, route: &str) -> ControlResponse {
        let level = route.rsplit('/').next().unwrap_or("");
        match level.parse::<i32>() {
            Ok(level) => {
                let state = self.volume.set(level);
                info!("Volume set to {}/{}", state.current, state.max);
                ControlResponse::ok_text()
            }
            Err(_) => ControlResponse::json(400, json!({"error": "Invalid volume level"})),
        }
    }

    async fn handle_tap(&self, params: &HashMap<String, String>) -> ControlResponse {
        let Some(dispatcher) = self.registry.current() else {
            return unavailable();
        };

        let (Some(x), Some(y)) = (float_param(params, "x"), float_param(params, "y")) else {
            return ControlResponse::json(400, json!({"error": "Missing x or y parameter"}));
        };

        let (mapped_x, mapped_y) = self.mapper.map(x, y);
        dispatcher
            .dispatch(GestureRequest::tap(mapped_x, mapped_y))
            .await;

        ControlResponse::json(200, json!({"ok": true, "x": mapped_x, "y": mapped_y}))
    }

    async fn handle_swipe(&self, params: &HashMap<String, String>) -> ControlResponse {
        let Some(dispatcher) = self.registry.current() else {
            return unavailable();
        };

        let coords = (
            float_param(params, "x1"),
            float_param(params, "y1"),
            float_param(params, "x2"),
            float_param(params, "y2"),
        );
        let (Some(x1), Some(y1), Some(x2), Some(y2)) = coords else {
            return ControlResponse::json(400, json!({"error": "Missing coordinates"}));
        };

        let request = self.mapper.map_request(GestureRequest::swipe(x1, y1, x2, y2));
        dispatcher.dispatch(request).await;

        ControlResponse::json(200, json!({"ok": true}))
    }

    async fn handle_long_press(&self, params: &HashMap<String, String>) -> ControlResponse {
        let Some(dispatcher) = self.registry.current() else {
            return unavailable();
        };

        let (Some(x), Some(y)) = (float_param(params, "x"), float_param(params, "y")) else {
            return ControlResponse::json(400, json!({"error": "Missing x or y parameter"}));
        };

        let request = self.mapper.map_request(GestureRequest::long_press(x, y));
        dispatcher.dispatch(request).await;

        ControlResponse::json(200, json!({"ok": true}))
    }
}

fn unavailable() -> ControlResponse {
    ControlResponse::json(
        503,
        json!({"error": crate::error::GestureError::Unavailable.to_string()}),
    )
}
