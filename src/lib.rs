// Wall-clock abstraction
pub mod clock;

// Configuration loading
pub mod config;

// Sensor model and store
pub mod sensor;

// Simulated telemetry
pub mod simulator;

// Map and sidebar projections, pin-drop workflow
pub mod map;

// HTTP and WebSocket APIs
pub mod api;

// WebSocket subscription management
pub mod subscription;
