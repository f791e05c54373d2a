// Sensor model and in-memory store

mod model;
mod store;

pub use model::{demo_sensors, value_unit, Sensor, SensorReading, SensorType, UnknownSensorType};
pub use store::SensorStore;
