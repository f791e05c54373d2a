// Map and sidebar projections of sensor snapshots, plus the pin-drop workflow

mod feature;
mod format;
mod placement;
mod sidebar;

pub use feature::{PointGeometry, SensorFeature, SensorFeatureCollection, SensorProperties};
pub use format::{
    describe_last_update, format_sensor_value, format_value, iso_timestamp, marker_color,
    sensor_color, time_since_update, type_color, DEFAULT_COLOR, NO_DATA, OFFLINE_COLOR,
};
pub use placement::{validate_draft, PinLocation, PlacementError, PlacementSession};
pub use sidebar::{sidebar_entries, SensorPopup, SidebarEntry};
