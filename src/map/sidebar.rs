use crate::map::format::{describe_last_update, format_sensor_value, sensor_color, type_color};
use crate::sensor::Sensor;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row of the sensor list next to the map
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub sensor_type: String,
    /// Type color; the list shows type even for offline sensors
    pub color: String,
    pub value: String,
    pub last_update: String,
    pub is_operational: bool,
    pub is_transmitting: bool,
}

impl SidebarEntry {
    pub fn from_sensor(sensor: &Sensor, now: DateTime<Utc>) -> Self {
        Self {
            id: sensor.id.clone(),
            name: sensor.name.clone(),
            sensor_type: sensor.sensor_type.as_str().to_string(),
            color: type_color(sensor.sensor_type.as_str()).to_string(),
            value: format_sensor_value(sensor),
            last_update: describe_last_update(sensor.last_update, now),
            is_operational: sensor.is_operational,
            is_transmitting: sensor.is_transmitting,
        }
    }
}

pub fn sidebar_entries(sensors: &[Sensor], now: DateTime<Utc>) -> Vec<SidebarEntry> {
    sensors
        .iter()
        .map(|s| SidebarEntry::from_sensor(s, now))
        .collect()
}

/// Content of the popup opened by clicking a marker
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorPopup {
    pub title: String,
    #[serde(rename = "type")]
    pub sensor_type: String,
    pub status: String,
    /// Set for offline sensors, which get a warning banner
    pub warning: bool,
    pub value: String,
    pub last_update: String,
    pub location: String,
    pub color: String,
}

impl SensorPopup {
    pub fn from_sensor(sensor: &Sensor, now: DateTime<Utc>) -> Self {
        let status = if sensor.is_operational {
            "Operational"
        } else {
            "Not Operational"
        };

        Self {
            title: sensor.name.clone(),
            sensor_type: sensor.sensor_type.as_str().to_string(),
            status: status.to_string(),
            warning: !sensor.is_operational,
            value: format_sensor_value(sensor),
            last_update: describe_last_update(sensor.last_update, now),
            location: format!("{:.4}, {:.4}", sensor.lat, sensor.lng),
            color: sensor_color(sensor).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::demo_sensors;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_sidebar_entries() {
        let sensors = demo_sensors(now() - Duration::seconds(75));
        let entries = sidebar_entries(&sensors, now());

        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].value, "45.2%");
        assert_eq!(entries[0].last_update, "1 minute ago");
        assert_eq!(entries[1].value, "320.0ppm");
        assert_eq!(entries[1].color, "#10B981");
        assert_eq!(entries[2].value, "6.8");
    }

    #[test]
    fn test_sidebar_never_updated() {
        let mut sensors = demo_sensors(now());
        sensors[0].current_value = None;
        sensors[0].last_update = None;

        let entry = SidebarEntry::from_sensor(&sensors[0], now());
        assert_eq!(entry.value, "N/A");
        assert_eq!(entry.last_update, "Never");
    }

    #[test]
    fn test_popup_for_offline_sensor() {
        let sensors = demo_sensors(now() - Duration::seconds(5));
        let popup = SensorPopup::from_sensor(&sensors[1], now());

        assert_eq!(popup.title, "Sensor 2");
        assert_eq!(popup.status, "Not Operational");
        assert!(popup.warning);
        assert_eq!(popup.value, "320.0ppm");
        assert_eq!(popup.last_update, "5 seconds ago");
        assert_eq!(popup.location, "53.2685, 6.5620");
        assert_eq!(popup.color, "#EF4444");
    }

    #[test]
    fn test_popup_for_operational_sensor() {
        let sensors = demo_sensors(now());
        let popup = SensorPopup::from_sensor(&sensors[2], now());

        assert_eq!(popup.status, "Operational");
        assert!(!popup.warning);
        assert_eq!(popup.sensor_type, "pH");
    }
}
