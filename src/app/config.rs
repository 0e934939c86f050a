//! Configuration Management

use crate::relay::bridge::DEFAULT_BRIDGE_CAPACITY;
use crate::relay::ring::DEFAULT_RING_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Staging ring slots (power of 2)
    pub ring_capacity: usize,
    /// Bound on queued-but-undelivered events; must stay below the ring
    pub bridge_capacity: usize,
    /// Enable the capture-library debug sink at startup
    pub debug: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            ring_capacity: DEFAULT_RING_CAPACITY,
            bridge_capacity: DEFAULT_BRIDGE_CAPACITY,
            debug: false,
        }
    }
}

impl RelayConfig {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.ring_capacity == 0 || !self.ring_capacity.is_power_of_two() {
            return Err(crate::Error::Config(format!(
                "ring_capacity must be a power of 2, got {}",
                self.ring_capacity
            )));
        }
        if self.bridge_capacity == 0 {
            return Err(crate::Error::Config(
                "bridge_capacity must be > 0".to_string(),
            ));
        }
        if self.bridge_capacity >= self.ring_capacity {
            return Err(crate::Error::Config(format!(
                "bridge_capacity ({}) must be smaller than ring_capacity ({})",
                self.bridge_capacity, self.ring_capacity
            )));
        }
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".hook_relay").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_validate() {
        let config = RelayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ring_capacity, 256);
        assert_eq!(config.bridge_capacity, 64);
        assert!(!config.debug);
    }

    #[test]
    fn test_rejects_non_power_of_two_ring() {
        let config = RelayConfig {
            ring_capacity: 100,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_bridge_capacity() {
        let config = RelayConfig {
            bridge_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bridge_at_or_above_ring() {
        let config = RelayConfig {
            ring_capacity: 64,
            bridge_capacity: 64,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RelayConfig {
            ring_capacity: 64,
            bridge_capacity: 128,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = RelayConfig {
            ring_capacity: 512,
            bridge_capacity: 32,
            debug: true,
        };
        config.save(&path).unwrap();

        let loaded = RelayConfig::load(&path).unwrap();
        assert_eq!(loaded.ring_capacity, 512);
        assert_eq!(loaded.bridge_capacity, 32);
        assert!(loaded.debug);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "ring_capacity = 100\nbridge_capacity = 8\ndebug = false\n").unwrap();

        assert!(RelayConfig::load(&path).is_err());
    }

    #[test]
    fn test_to_toml_contains_fields() {
        let toml = RelayConfig::default().to_toml().unwrap();
        assert!(toml.contains("ring_capacity"));
        assert!(toml.contains("bridge_capacity"));
    }
}
