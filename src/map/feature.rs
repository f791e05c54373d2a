use crate::map::format::{iso_timestamp, sensor_color, NO_DATA};
use crate::sensor::Sensor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GeoJSON FeatureCollection of sensor markers
///
/// Built fresh from every snapshot; the map source replaces its data
/// wholesale rather than diffing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorFeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<SensorFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorFeature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: PointGeometry,
    pub properties: SensorProperties,
}

/// GeoJSON point; coordinates are `[lng, lat]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

/// Marker properties read by the map layers and popups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorProperties {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub sensor_type: String,
    /// Latitude with 4 decimals
    pub lat: String,
    /// Longitude with 4 decimals
    pub lng: String,
    /// Reading with 1 decimal, or "N/A"
    pub current_value: String,
    pub last_update: String,
    pub is_transmitting: bool,
    pub is_operational: bool,
    pub color: String,
}

impl SensorFeature {
    pub fn from_sensor(sensor: &Sensor, now: DateTime<Utc>) -> Self {
        let current_value = sensor
            .current_value
            .map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| NO_DATA.to_string());

        Self {
            kind: "Feature".to_string(),
            geometry: PointGeometry {
                kind: "Point".to_string(),
                coordinates: [sensor.lng, sensor.lat],
            },
            properties: SensorProperties {
                id: sensor.id.clone(),
                name: sensor.name.clone(),
                sensor_type: sensor.sensor_type.as_str().to_string(),
                lat: format!("{:.4}", sensor.lat),
                lng: format!("{:.4}", sensor.lng),
                current_value,
                last_update: iso_timestamp(sensor.last_update.unwrap_or(now)),
                is_transmitting: sensor.is_transmitting,
                is_operational: sensor.is_operational,
                color: sensor_color(sensor).to_string(),
            },
        }
    }
}

impl SensorFeatureCollection {
    pub fn from_sensors(sensors: &[Sensor], now: DateTime<Utc>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features: sensors
                .iter()
                .map(|s| SensorFeature::from_sensor(s, now))
                .collect(),
        }
    }

    /// Features currently drawn with the pulse ring
    pub fn transmitting(&self) -> impl Iterator<Item = &SensorFeature> {
        self.features.iter().filter(|f| f.properties.is_transmitting)
    }
}
