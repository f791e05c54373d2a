use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Complete fieldsense configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldsenseConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// HTTP/WebSocket server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Telemetry simulator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Time between simulated transmissions (milliseconds)
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// How long a sensor shows as transmitting (milliseconds)
    #[serde(default = "default_transmission")]
    pub transmission_ms: u64,
    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

fn default_tick_interval() -> u64 {
    3000
}

fn default_transmission() -> u64 {
    1000
}

impl SimulationConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn transmission_window(&self) -> Duration {
        Duration::from_millis(self.transmission_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            tick_interval_ms: default_tick_interval(),
            transmission_ms: default_transmission(),
            seed: None,
        }
    }
}

/// Sensor store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Start with the four demo sensors
    #[serde(default = "default_seed_demo_sensors")]
    pub seed_demo_sensors: bool,
}

fn default_seed_demo_sensors() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_demo_sensors: default_seed_demo_sensors(),
        }
    }
}

impl FieldsenseConfig {
    /// Apply FIELDSENSE_* environment overrides
    pub fn apply_env(mut self) -> Self {
        if let Ok(v) = std::env::var("FIELDSENSE_BIND_ADDR") {
            if !v.is_empty() {
                self.server.bind_addr = v;
            }
        }
        if let Ok(v) = std::env::var("FIELDSENSE_SEED") {
            if let Ok(seed) = v.parse::<u64>() {
                self.simulation.seed = Some(seed);
            }
        }
        self
    }
}

/// Load configuration from TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<FieldsenseConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: FieldsenseConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Load configuration, falling back to defaults when the file does not exist
pub fn load_or_default(path: impl AsRef<Path>) -> Result<FieldsenseConfig> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        Ok(FieldsenseConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = FieldsenseConfig::default();
        assert_eq!(config.server.bind_addr, "0.0.0.0:3000");
        assert!(config.simulation.enabled);
        assert_eq!(config.simulation.tick_interval(), Duration::from_secs(3));
        assert_eq!(config.simulation.transmission_window(), Duration::from_secs(1));
        assert_eq!(config.simulation.seed, None);
        assert!(config.store.seed_demo_sensors);
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [server]
            bind_addr = "127.0.0.1:8080"

            [simulation]
            enabled = false
            tick_interval_ms = 500
            transmission_ms = 250
            seed = 42

            [store]
            seed_demo_sensors = false
        "#;

        let config: FieldsenseConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert!(!config.simulation.enabled);
        assert_eq!(config.simulation.tick_interval_ms, 500);
        assert_eq!(config.simulation.transmission_ms, 250);
        assert_eq!(config.simulation.seed, Some(42));
        assert!(!config.store.seed_demo_sensors);
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [simulation]
            tick_interval_ms = 1500
        "#;

        let config: FieldsenseConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.simulation.tick_interval_ms, 1500);
        assert_eq!(config.simulation.transmission_ms, 1000); // Default
        assert_eq!(config.server.bind_addr, "0.0.0.0:3000"); // Default
    }

    #[test]
    fn test_zero_interval_clamped() {
        let config = SimulationConfig {
            tick_interval_ms: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbind_addr = \"127.0.0.1:9999\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:9999");
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[simulation\ntick_interval_ms = ").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.simulation.tick_interval_ms, 3000);
    }
}
