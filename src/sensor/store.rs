use crate::clock::SharedClock;
use crate::sensor::model::{demo_sensors, Sensor, SensorReading, SensorType};
use rand::rngs::StdRng;
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

/// Sensor store owns the in-memory sensor collection
///
/// Every mutation publishes a full snapshot on a watch channel, so a new
/// subscriber always starts from the current collection.
pub struct SensorStore {
    /// Sensors in insertion order
    sensors: RwLock<Vec<Sensor>>,

    /// Latest published snapshot
    snapshot_tx: watch::Sender<Vec<Sensor>>,

    /// Readings produced by simulated transmissions
    reading_tx: broadcast::Sender<SensorReading>,

    /// Random source for initial readings of new sensors
    rng: Mutex<StdRng>,

    clock: SharedClock,
}

impl SensorStore {
    /// Create store from an initial collection
    pub fn new(sensors: Vec<Sensor>, rng: StdRng, clock: SharedClock) -> Self {
        let (snapshot_tx, _) = watch::channel(sensors.clone());
        let (reading_tx, _) = broadcast::channel(100);

        info!(sensors = sensors.len(), "Sensor store created");

        Self {
            sensors: RwLock::new(sensors),
            snapshot_tx,
            reading_tx,
            rng: Mutex::new(rng),
            clock,
        }
    }

    /// Create store seeded with the four demo sensors
    pub fn with_demo_sensors(rng: StdRng, clock: SharedClock) -> Self {
        let sensors = demo_sensors(clock.now());
        Self::new(sensors, rng, clock)
    }

    /// Current collection snapshot
    pub fn list_sensors(&self) -> Vec<Sensor> {
        self.read().clone()
    }

    /// Register a new operational sensor
    ///
    /// The store does not validate its inputs; callers check the name and
    /// location before calling.
    pub fn add_sensor(&self, name: &str, sensor_type: SensorType, lat: f64, lng: f64) -> Sensor {
        let now = self.clock.now();
        let value = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            sensor_type.generate_value(&mut *rng)
        };

        let mut sensors = self.write();
        let sensor = Sensor {
            id: self.next_id(&sensors),
            name: name.to_string(),
            sensor_type,
            lat,
            lng,
            created_at: now,
            current_value: Some(value),
            last_update: Some(now),
            is_transmitting: false,
            is_operational: true,
        };
        sensors.push(sensor.clone());
        self.publish(&sensors);

        info!(
            sensor_id = %sensor.id,
            name = %sensor.name,
            sensor_type = %sensor.sensor_type,
            "Sensor added"
        );

        sensor
    }

    /// Get sensor by ID
    pub fn get_sensor_by_id(&self, id: &str) -> Option<Sensor> {
        self.read().iter().find(|s| s.id == id).cloned()
    }

    /// Subscribe to collection snapshots (current snapshot is visible immediately)
    pub fn subscribe(&self) -> watch::Receiver<Vec<Sensor>> {
        self.snapshot_tx.subscribe()
    }

    /// Number of live snapshot subscribers
    pub fn snapshot_subscribers(&self) -> usize {
        self.snapshot_tx.receiver_count()
    }

    /// Subscribe to simulated readings
    pub fn subscribe_readings(&self) -> broadcast::Receiver<SensorReading> {
        self.reading_tx.subscribe()
    }

    /// IDs of sensors eligible for simulated readings
    pub fn operational_ids(&self) -> Vec<String> {
        self.read()
            .iter()
            .filter(|s| s.is_operational)
            .map(|s| s.id.clone())
            .collect()
    }

    /// Mark a sensor as operational or out of service
    pub fn set_operational(&self, id: &str, operational: bool) -> Option<Sensor> {
        let mut sensors = self.write();
        let sensor = sensors.iter_mut().find(|s| s.id == id)?;
        sensor.is_operational = operational;
        let updated = sensor.clone();
        self.publish(&sensors);

        info!(sensor_id = %id, operational, "Sensor operational state changed");
        Some(updated)
    }

    /// Start a simulated transmission carrying `value`
    ///
    /// Returns `None` without publishing when the sensor is unknown or not
    /// operational.
    pub fn begin_transmission(&self, id: &str, value: f64) -> Option<Sensor> {
        let now = self.clock.now();
        let mut sensors = self.write();
        let sensor = sensors
            .iter_mut()
            .find(|s| s.id == id)
            .filter(|s| s.is_operational)?;

        sensor.is_transmitting = true;
        sensor.last_update = Some(now);
        sensor.current_value = Some(value);
        let updated = sensor.clone();
        self.publish(&sensors);
        drop(sensors);

        // No reading subscribers is fine
        let _ = self.reading_tx.send(SensorReading {
            sensor_id: updated.id.clone(),
            value,
            timestamp: now,
        });

        debug!(sensor_id = %id, value, "Transmission started");
        Some(updated)
    }

    /// End the transmission pulse for one sensor, leaving its reading intact
    pub fn end_transmission(&self, id: &str) -> Option<Sensor> {
        let mut sensors = self.write();
        let sensor = sensors.iter_mut().find(|s| s.id == id)?;
        sensor.is_transmitting = false;
        let updated = sensor.clone();
        self.publish(&sensors);

        debug!(sensor_id = %id, "Transmission finished");
        Some(updated)
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Publish while the write guard is held so snapshots stay ordered
    fn publish(&self, sensors: &[Sensor]) {
        self.snapshot_tx.send_replace(sensors.to_vec());
    }

    fn next_id(&self, sensors: &[Sensor]) -> String {
        loop {
            let id = uuid::Uuid::now_v7().to_string();
            if !sensors.iter().any(|s| s.id == id) {
                return id;
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Sensor>> {
        self.sensors.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Sensor>> {
        self.sensors.write().unwrap_or_else(|e| e.into_inner())
    }
}
