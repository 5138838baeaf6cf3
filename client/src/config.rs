// Host configuration: defaults, then an optional JSON file, then environment overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use telemetry_core::constants::DEMO_INTERVAL_MS;
use telemetry_core::DashboardSettings;
use thiserror::Error;

use crate::constants::{DEFAULT_ORIGIN, DEFAULT_TICK_HZ, ENV_CONFIG_PATH, ENV_DEMO, ENV_ORIGIN, ENV_TICK_HZ};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub origin: String,
    pub demo: bool,
    pub tick_hz: u32,
    pub demo_interval_ms: u64,
    pub dashboard: DashboardSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            demo: false,
            tick_hz: DEFAULT_TICK_HZ,
            demo_interval_ms: DEMO_INTERVAL_MS,
            dashboard: DashboardSettings::default(),
        }
    }
}

impl ClientConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var(ENV_CONFIG_PATH) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(&path))?,
            _ => Self::default(),
        };
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Unparsable values leave the current setting in place.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(origin) = lookup(ENV_ORIGIN).filter(|value| !value.trim().is_empty()) {
            self.origin = origin.trim().to_string();
        }
        if let Some(demo) = lookup(ENV_DEMO) {
            match demo.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.demo = true,
                "0" | "false" | "no" | "off" => self.demo = false,
                _ => {}
            }
        }
        if let Some(hz) = lookup(ENV_TICK_HZ)
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|hz| *hz > 0)
        {
            self.tick_hz = hz;
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_hz.max(1)))
    }

    pub fn demo_interval(&self) -> Duration {
        Duration::from_millis(self.demo_interval_ms.max(1))
    }
}
