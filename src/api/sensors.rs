use crate::map::{
    sidebar_entries, validate_draft, PinLocation, PlacementError, SensorFeatureCollection,
    SensorPopup, SidebarEntry,
};
use crate::sensor::{Sensor, SensorStore, SensorType, UnknownSensorType};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Shared state for the sensor API
pub struct SensorAppState {
    pub store: Arc<SensorStore>,
}

/// Query parameters for sensor listing
#[derive(Debug, Default, Deserialize)]
pub struct SensorQueryParams {
    /// Filter by type display name (e.g., ?type=pH)
    #[serde(rename = "type")]
    pub sensor_type: Option<String>,
    /// Filter by operational state
    pub operational: Option<bool>,
}

/// Sensor with its unit suffix
#[derive(Debug, Serialize)]
pub struct SensorResponse {
    #[serde(flatten)]
    pub sensor: Sensor,
    pub unit: &'static str,
}

impl From<Sensor> for SensorResponse {
    fn from(sensor: Sensor) -> Self {
        let unit = sensor.unit();
        Self { sensor, unit }
    }
}

/// Body of POST /api/sensors, as filled in by the pin-drop form
#[derive(Debug, Deserialize)]
pub struct CreateSensorRequest {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub sensor_type: SensorType,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct OperationalRequest {
    pub operational: bool,
}

#[derive(Debug, Serialize)]
pub struct UnitResponse {
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub unit: &'static str,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create sensor API router
pub fn create_sensor_router(state: Arc<SensorAppState>) -> Router {
    Router::new()
        .route("/api/sensors", get(list_sensors).post(create_sensor))
        .route("/api/sensors/features", get(sensor_features))
        .route("/api/sensors/:id", get(get_sensor))
        .route("/api/sensors/:id/popup", get(sensor_popup))
        .route("/api/sensors/:id/operational", put(set_operational))
        .route("/api/sidebar", get(sidebar))
        .route("/api/units/:type", get(unit_for_type))
        .with_state(state)
}

/// GET /api/sensors - List sensors in insertion order
///
/// Query parameters:
/// - `type`: only sensors of this type (e.g., ?type=Soil%20NPK)
/// - `operational`: only sensors in this state (e.g., ?operational=true)
async fn list_sensors(
    State(state): State<Arc<SensorAppState>>,
    Query(params): Query<SensorQueryParams>,
) -> Result<Json<Vec<SensorResponse>>, ApiError> {
    let type_filter = params
        .sensor_type
        .as_deref()
        .map(str::parse::<SensorType>)
        .transpose()?;

    let response = state
        .store
        .list_sensors()
        .into_iter()
        .filter(|s| type_filter.map_or(true, |t| s.sensor_type == t))
        .filter(|s| params.operational.map_or(true, |op| s.is_operational == op))
        .map(SensorResponse::from)
        .collect();

    Ok(Json(response))
}

/// GET /api/sensors/:id - Get specific sensor
async fn get_sensor(
    State(state): State<Arc<SensorAppState>>,
    Path(id): Path<String>,
) -> Result<Json<SensorResponse>, ApiError> {
    let sensor = state
        .store
        .get_sensor_by_id(&id)
        .ok_or(ApiError::NotFound)?;

    Ok(Json(sensor.into()))
}

/// POST /api/sensors - Register a sensor from the pin-drop form
async fn create_sensor(
    State(state): State<Arc<SensorAppState>>,
    Json(req): Json<CreateSensorRequest>,
) -> Result<(StatusCode, Json<SensorResponse>), ApiError> {
    let pin = req
        .lat
        .zip(req.lng)
        .map(|(lat, lng)| PinLocation { lat, lng });
    let pin = validate_draft(&req.name, pin)?;

    let sensor = state
        .store
        .add_sensor(&req.name, req.sensor_type, pin.lat, pin.lng);

    Ok((StatusCode::CREATED, Json(sensor.into())))
}

/// PUT /api/sensors/:id/operational - Take a sensor in or out of service
async fn set_operational(
    State(state): State<Arc<SensorAppState>>,
    Path(id): Path<String>,
    Json(req): Json<OperationalRequest>,
) -> Result<Json<SensorResponse>, ApiError> {
    let sensor = state
        .store
        .set_operational(&id, req.operational)
        .ok_or(ApiError::NotFound)?;

    Ok(Json(sensor.into()))
}

/// GET /api/sensors/features - GeoJSON marker set
async fn sensor_features(State(state): State<Arc<SensorAppState>>) -> Json<SensorFeatureCollection> {
    let now = state.store.clock().now();
    Json(SensorFeatureCollection::from_sensors(
        &state.store.list_sensors(),
        now,
    ))
}

/// GET /api/sensors/:id/popup - Marker popup content
async fn sensor_popup(
    State(state): State<Arc<SensorAppState>>,
    Path(id): Path<String>,
) -> Result<Json<SensorPopup>, ApiError> {
    let sensor = state
        .store
        .get_sensor_by_id(&id)
        .ok_or(ApiError::NotFound)?;

    Ok(Json(SensorPopup::from_sensor(&sensor, state.store.clock().now())))
}

/// GET /api/sidebar - Sensor list rows
async fn sidebar(State(state): State<Arc<SensorAppState>>) -> Json<Vec<SidebarEntry>> {
    let now = state.store.clock().now();
    Json(sidebar_entries(&state.store.list_sensors(), now))
}

/// GET /api/units/:type - Unit suffix for a sensor type
async fn unit_for_type(Path(type_name): Path<String>) -> Result<Json<UnitResponse>, ApiError> {
    let sensor_type: SensorType = type_name.parse()?;
    Ok(Json(UnitResponse {
        sensor_type,
        unit: sensor_type.unit(),
    }))
}

/// Sensor API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Placement(PlacementError),
    UnknownType(UnknownSensorType),
}

impl From<PlacementError> for ApiError {
    fn from(e: PlacementError) -> Self {
        ApiError::Placement(e)
    }
}

impl From<UnknownSensorType> for ApiError {
    fn from(e: UnknownSensorType) -> Self {
        ApiError::UnknownType(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Sensor not found".to_string()),
            ApiError::Placement(e) => {
                info!(error = %e, "Rejected sensor placement");
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::UnknownType(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}
