// Simulated telemetry: periodically push a fresh reading from a random
// operational sensor

use crate::config::SimulationConfig;
use crate::sensor::{Sensor, SensorStore};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};


/// Pick one operational sensor uniformly at random
pub fn pick_operational<'a, R: Rng + ?Sized>(sensors: &'a [Sensor], rng: &mut R) -> Option<&'a Sensor> {
    let operational: Vec<&Sensor> = sensors.iter().filter(|s| s.is_operational).collect();
    operational.choose(rng).copied()
}

/// Run one simulation tick against the store
///
/// Returns the sensor whose transmission was started, or `None` when no
/// operational sensor exists.
pub fn simulate_tick<R: Rng + ?Sized>(store: &SensorStore, rng: &mut R) -> Option<Sensor> {
    let sensors = store.list_sensors();
    let chosen = pick_operational(&sensors, rng)?;
    let value = chosen.sensor_type.generate_value(rng);
    store.begin_transmission(&chosen.id, value)
}

/// Timer-driven telemetry simulator
pub struct Simulator {
    store: Arc<SensorStore>,
    tick_interval: Duration,
    transmission_window: Duration,
    rng: StdRng,
}

impl Simulator {
    pub fn new(store: Arc<SensorStore>, config: &SimulationConfig, rng: StdRng) -> Self {
        Self {
            store,
            tick_interval: config.tick_interval(),
            transmission_window: config.transmission_window(),
            rng,
        }
    }

    /// Start the periodic task on the current tokio runtime
    pub fn spawn(self) -> SimulatorHandle {
        info!(
            tick_interval = ?self.tick_interval,
            transmission_window = ?self.transmission_window,
            "Simulator started"
        );
        SimulatorHandle {
            task: tokio::spawn(self.run()),
        }
    }

    async fn run(mut self) {
        // First tick after one full interval, not immediately
        let mut ticker = interval_at(Instant::now() + self.tick_interval, self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let Some(sensor) = simulate_tick(&self.store, &mut self.rng) else {
                debug!("No operational sensors, skipping tick");
                continue;
            };

            // Stop timer is independent of the periodic task and outlives shutdown
            let store = Arc::clone(&self.store);
            let window = self.transmission_window;
            tokio::spawn(async move {
                tokio::time::sleep(window).await;
                store.end_transmission(&sensor.id);
            });
        }
    }
}

/// Handle to a running simulator
///
/// Dropping the handle leaves the simulator running for the life of the
/// runtime.
pub struct SimulatorHandle {
    task: JoinHandle<()>,
}

impl SimulatorHandle {
    /// Cancel the periodic task
    ///
    /// A stop timer already scheduled for an in-flight transmission still
    /// fires and clears that sensor's transmitting flag.
    pub fn shutdown(&self) {
        self.task.abort();
        info!("Simulator stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
