use crate::error::{PolisError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub reconciler: ReconcilerConfig,
    pub defaults: DefaultsConfig,
    pub api: ApiConfig,
    pub log_level: LogLevel,
}

/// Tuning for the reconciler manager shared across all intents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    pub default_sync_interval_seconds: u64,
    pub external_call_timeout_seconds: u64,
    pub shutdown_grace_seconds: u64,
}

/// Defaults applied to an intent's `behavior` block when fields are absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub scale_up_max_delta: u32,
    pub scale_up_cooldown_seconds: u64,
    pub scale_down_max_delta: u32,
    pub scale_down_cooldown_seconds: u64,
}

/// Liveness/readiness surface the controller exposes; out of scope per
/// spec.md beyond "the controller needs no other external surface," kept
/// here only as the ambient health-port config every service of this shape
/// carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub health_port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            reconciler: ReconcilerConfig::default(),
            defaults: DefaultsConfig::default(),
            api: ApiConfig::default(),
            log_level: LogLevel::Info,
        }
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            default_sync_interval_seconds: 30,
            external_call_timeout_seconds: 10,
            shutdown_grace_seconds: 5,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            scale_up_max_delta: 4,
            scale_up_cooldown_seconds: 300,
            scale_down_max_delta: 4,
            scale_down_cooldown_seconds: 300,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            health_port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl ControllerConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(PolisError::Io)?;

        let config = if path.ends_with(".yaml") || path.ends_with(".yml") {
            serde_yaml::from_str(&content)
                .map_err(|e| PolisError::Config(format!("failed to parse YAML: {}", e)))?
        } else if path.ends_with(".toml") {
            toml::from_str(&content)
                .map_err(|e| PolisError::Config(format!("failed to parse TOML: {}", e)))?
        } else if path.ends_with(".json") {
            serde_json::from_str(&content).map_err(PolisError::Serialization)?
        } else {
            return Err(PolisError::Config(format!(
                "unsupported config file format: {}",
                path
            )));
        };

        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".yaml") || path.ends_with(".yml") {
            serde_yaml::to_string(self)
                .map_err(|e| PolisError::Config(format!("failed to serialize YAML: {}", e)))?
        } else if path.ends_with(".toml") {
            toml::to_string(self)
                .map_err(|e| PolisError::Config(format!("failed to serialize TOML: {}", e)))?
        } else if path.ends_with(".json") {
            serde_json::to_string_pretty(self).map_err(PolisError::Serialization)?
        } else {
            return Err(PolisError::Config(format!(
                "unsupported config file format: {}",
                path
            )));
        };

        std::fs::write(path, content).map_err(PolisError::Io)?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.reconciler.default_sync_interval_seconds == 0 {
            return Err(PolisError::Config(
                "default_sync_interval_seconds must be greater than 0".to_string(),
            ));
        }

        if self.reconciler.external_call_timeout_seconds == 0 {
            return Err(PolisError::Config(
                "external_call_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.api.health_port == 0 {
            return Err(PolisError::Config(
                "api.health_port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
