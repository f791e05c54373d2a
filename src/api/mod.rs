// HTTP and WebSocket APIs

pub mod sensors;
pub mod websocket;

pub use sensors::{create_sensor_router, ApiError, SensorAppState};
pub use websocket::{create_ws_router, ws_handler, WsAppState};

use crate::sensor::SensorStore;
use axum::Router;
use std::sync::Arc;

/// Full application router over one store
pub fn create_router(store: Arc<SensorStore>) -> Router {
    let sensor_state = Arc::new(SensorAppState {
        store: Arc::clone(&store),
    });
    let ws_state = Arc::new(WsAppState { store });

    create_sensor_router(sensor_state).merge(create_ws_router(ws_state))
}
