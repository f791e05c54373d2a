use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of agricultural sensor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorType {
    #[default]
    #[serde(rename = "Soil Moisture")]
    SoilMoisture,
    #[serde(rename = "Soil NPK")]
    SoilNpk,
    #[serde(rename = "pH")]
    Ph,
}

impl SensorType {
    pub const ALL: [SensorType; 3] = [SensorType::SoilMoisture, SensorType::SoilNpk, SensorType::Ph];

    /// Display name, also the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::SoilMoisture => "Soil Moisture",
            SensorType::SoilNpk => "Soil NPK",
            SensorType::Ph => "pH",
        }
    }

    /// Unit suffix for readings of this type (pH is unitless)
    pub fn unit(&self) -> &'static str {
        match self {
            SensorType::SoilMoisture => "%",
            SensorType::SoilNpk => "ppm",
            SensorType::Ph => "",
        }
    }

    /// Draw a simulated reading for this type
    ///
    /// Soil moisture is a percentage in [0, 100), NPK in [0, 500) ppm and
    /// pH in [4, 9).
    pub fn generate_value<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            SensorType::SoilMoisture => rng.gen_range(0.0..100.0),
            SensorType::SoilNpk => rng.gen_range(0.0..500.0),
            SensorType::Ph => rng.gen_range(4.0..9.0),
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known sensor type
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownSensorType(pub String);

impl fmt::Display for UnknownSensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown sensor type '{}': expected 'Soil Moisture', 'Soil NPK' or 'pH'",
            self.0
        )
    }
}

impl std::error::Error for UnknownSensorType {}

impl FromStr for SensorType {
    type Err = UnknownSensorType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownSensorType(s.to_string()))
    }
}

/// Unit suffix for a sensor type
pub fn value_unit(sensor_type: SensorType) -> &'static str {
    sensor_type.unit()
}

/// A field sensor and its latest simulated reading
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    /// Unique sensor identifier ("1".."4" for the demo set, UUIDv7 otherwise)
    pub id: String,

    pub name: String,

    #[serde(rename = "type")]
    pub sensor_type: SensorType,

    pub lat: f64,
    pub lng: f64,

    pub created_at: DateTime<Utc>,

    /// Latest reading; `None` until the first transmission
    pub current_value: Option<f64>,

    /// Time of the latest reading; present exactly when `current_value` is
    pub last_update: Option<DateTime<Utc>>,

    /// True while a simulated transmission is in flight
    pub is_transmitting: bool,

    /// Only operational sensors receive simulated readings
    pub is_operational: bool,
}

impl Sensor {
    pub fn unit(&self) -> &'static str {
        self.sensor_type.unit()
    }
}

/// Reading produced by a simulated transmission
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub sensor_id: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// The four sensors the dashboard starts with
pub fn demo_sensors(now: DateTime<Utc>) -> Vec<Sensor> {
    let seed = |id: &str,
                sensor_type: SensorType,
                lat: f64,
                lng: f64,
                value: f64,
                is_operational: bool| Sensor {
        id: id.to_string(),
        name: format!("Sensor {}", id),
        sensor_type,
        lat,
        lng,
        created_at: now,
        current_value: Some(value),
        last_update: Some(now),
        is_transmitting: false,
        is_operational,
    };

    vec![
        seed("1", SensorType::SoilMoisture, 53.270051, 6.564448, 45.2, true),
        seed("2", SensorType::SoilNpk, 53.268500, 6.562000, 320.0, false),
        seed("3", SensorType::Ph, 53.271500, 6.567000, 6.8, true),
        seed("4", SensorType::SoilMoisture, 53.269000, 6.565500, 52.7, true),
    ]
}
