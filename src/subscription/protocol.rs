use crate::map::SensorFeatureCollection;
use crate::sensor::{Sensor, SensorReading};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client → Server message types
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Receive readings for this sensor (all sensors while the set is empty)
    #[serde(rename = "subscribe")]
    Subscribe { sensor_id: String },
    #[serde(rename = "unsubscribe")]
    Unsubscribe { sensor_id: String },
}

/// Server → Client message types
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Full marker set; replaces whatever the client drew before
    #[serde(rename = "sensors")]
    Sensors {
        timestamp: DateTime<Utc>,
        features: SensorFeatureCollection,
    },
    #[serde(rename = "reading")]
    Reading(SensorReading),
}

impl ServerMessage {
    pub fn snapshot(sensors: &[Sensor], now: DateTime<Utc>) -> Self {
        ServerMessage::Sensors {
            timestamp: now,
            features: SensorFeatureCollection::from_sensors(sensors, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::demo_sensors;
    use chrono::TimeZone;

    #[test]
    fn test_snapshot_message_shape() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let msg = ServerMessage::snapshot(&demo_sensors(now), now);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "sensors");
        assert_eq!(json["features"]["type"], "FeatureCollection");
        assert_eq!(json["features"]["features"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_reading_message_shape() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let msg = ServerMessage::Reading(SensorReading {
            sensor_id: "3".to_string(),
            value: 6.1,
            timestamp: now,
        });
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "reading");
        assert_eq!(json["sensorId"], "3");
        assert_eq!(json["value"], 6.1);
    }

    #[test]
    fn test_client_message_parsing() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"subscribe","sensor_id":"4"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Subscribe { sensor_id } if sensor_id == "4"));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"unsubscribe","sensor_id":"4"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Unsubscribe { .. }));

        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"delete"}"#).is_err());
    }
}
