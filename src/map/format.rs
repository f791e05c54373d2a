use crate::sensor::{Sensor, SensorType};
use chrono::{DateTime, SecondsFormat, Utc};

/// Marker color for sensors that are out of service, regardless of type
pub const OFFLINE_COLOR: &str = "#EF4444";

/// Marker color for unrecognised type names
pub const DEFAULT_COLOR: &str = "#6B7280";

/// Shown in place of a value for sensors that never transmitted
pub const NO_DATA: &str = "N/A";

/// Marker color for a type name, as the map layer matches it
pub fn type_color(type_name: &str) -> &'static str {
    match type_name {
        "Soil Moisture" => "#3B82F6",
        "Soil NPK" => "#10B981",
        "pH" => "#F59E0B",
        _ => DEFAULT_COLOR,
    }
}

/// Marker color with the out-of-service override
pub fn marker_color(type_name: &str, operational: bool) -> &'static str {
    if !operational {
        return OFFLINE_COLOR;
    }
    type_color(type_name)
}

pub fn sensor_color(sensor: &Sensor) -> &'static str {
    marker_color(sensor.sensor_type.as_str(), sensor.is_operational)
}

/// "45.2%", "320.0ppm", "6.8" or "N/A"
pub fn format_sensor_value(sensor: &Sensor) -> String {
    format_value(sensor.current_value, sensor.sensor_type)
}

pub fn format_value(value: Option<f64>, sensor_type: SensorType) -> String {
    match value {
        Some(v) => format!("{:.1}{}", v, sensor_type.unit()),
        None => NO_DATA.to_string(),
    }
}

/// Human-readable age of a reading: seconds under a minute, whole minutes after
pub fn time_since_update(last_update: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - last_update).num_seconds().max(0);

    if secs < 60 {
        format!("{} second{} ago", secs, plural(secs))
    } else {
        let mins = secs / 60;
        format!("{} minute{} ago", mins, plural(mins))
    }
}

/// Like `time_since_update`, with "Never" for sensors without a reading
pub fn describe_last_update(last_update: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match last_update {
        Some(at) => time_since_update(at, now),
        None => "Never".to_string(),
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
