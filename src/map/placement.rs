use crate::sensor::{Sensor, SensorStore, SensorType};
use std::fmt;
use tracing::info;

/// Reasons a pin-drop submission is rejected
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementError {
    MissingName,
    MissingLocation,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::MissingName => write!(f, "Please enter a sensor name"),
            PlacementError::MissingLocation => write!(f, "Please select a location on the map"),
        }
    }
}

impl std::error::Error for PlacementError {}

/// Location picked on the map for a new sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinLocation {
    pub lat: f64,
    pub lng: f64,
}

/// Pin-drop workflow for registering a sensor
///
/// While the form is visible, map clicks move the provisional pin. Submit
/// validates the draft and hands it to the store.
#[derive(Debug, Clone, Default)]
pub struct PlacementSession {
    form_visible: bool,
    name: String,
    sensor_type: SensorType,
    pin: Option<PinLocation>,
}

impl PlacementSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter placement mode
    pub fn show_form(&mut self) {
        self.form_visible = true;
    }

    /// Leave placement mode and discard the draft
    pub fn hide_form(&mut self) {
        self.form_visible = false;
        self.reset();
    }

    pub fn is_placing(&self) -> bool {
        self.form_visible
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_type(&mut self, sensor_type: SensorType) {
        self.sensor_type = sensor_type;
    }

    /// Record a map click; ignored outside placement mode
    ///
    /// Returns whether the provisional pin moved.
    pub fn drop_pin(&mut self, lat: f64, lng: f64) -> bool {
        if !self.form_visible {
            return false;
        }
        self.pin = Some(PinLocation { lat, lng });
        true
    }

    /// Provisional marker, if one is shown
    pub fn pin(&self) -> Option<PinLocation> {
        if self.form_visible {
            self.pin
        } else {
            None
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    /// Check the draft without submitting it
    pub fn validate(&self) -> Result<PinLocation, PlacementError> {
        validate_draft(&self.name, self.pin)
    }

    /// Submit the draft to the store
    ///
    /// On error the draft is kept so the user can correct it.
    pub fn submit(&mut self, store: &SensorStore) -> Result<Sensor, PlacementError> {
        let pin = self.validate()?;
        let sensor = store.add_sensor(&self.name, self.sensor_type, pin.lat, pin.lng);
        info!(sensor_id = %sensor.id, "Pin-drop placement submitted");
        self.hide_form();
        Ok(sensor)
    }

    fn reset(&mut self) {
        self.name.clear();
        self.sensor_type = SensorType::default();
        self.pin = None;
    }
}

/// Name must be non-blank, then a location must be chosen
pub fn validate_draft(name: &str, pin: Option<PinLocation>) -> Result<PinLocation, PlacementError> {
    if name.trim().is_empty() {
        return Err(PlacementError::MissingName);
    }
    pin.ok_or(PlacementError::MissingLocation)
}
