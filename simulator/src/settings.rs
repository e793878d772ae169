//! Simulation settings consumed by the telescope model loaders.
//!
//! Settings are plain serde structures so they can be stored alongside a
//! telescope model as JSON. Every field has a default, so a settings file only
//! needs to name what differs from it.
//!
//! ```json
//! {
//!   "precision": "single",
//!   "observation": { "start_frequency_hz": 1.0e8, "num_channels": 4 },
//!   "interferometer": {
//!     "channel_bandwidth_hz": 1.0e5,
//!     "noise": {
//!       "enable": true,
//!       "frequencies": { "type": "range", "start_hz": 1.0e8, "end_hz": 2.0e8, "count": 5 },
//!       "values": { "type": "sensitivity", "source": { "type": "telescope_model" } }
//!     }
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::hardware::system_noise::Precision;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top level settings for a simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Precision of all telescope model arrays
    pub precision: Precision,
    pub observation: ObservationSettings,
    pub interferometer: InterferometerSettings,
}

impl SimulationSettings {
    /// Load settings from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save settings as pretty-printed JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}

/// Observation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationSettings {
    /// Centre frequency of the first channel
    pub start_frequency_hz: f64,
    pub num_channels: usize,
    /// Spacing between channel centres
    pub frequency_inc_hz: f64,
    /// Total observation length
    pub length_sec: f64,
    pub num_time_steps: usize,
}

impl Default for ObservationSettings {
    fn default() -> Self {
        Self {
            start_frequency_hz: 100e6,
            num_channels: 1,
            frequency_inc_hz: 0.0,
            length_sec: 43200.0,
            num_time_steps: 24,
        }
    }
}

impl ObservationSettings {
    /// Integration time of a single visibility dump
    pub fn integration_time_sec(&self) -> f64 {
        self.length_sec / self.num_time_steps.max(1) as f64
    }

    /// Frequency of the last channel
    pub fn end_frequency_hz(&self) -> f64 {
        self.start_frequency_hz
            + self.num_channels.saturating_sub(1) as f64 * self.frequency_inc_hz
    }
}

/// Correlator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterferometerSettings {
    pub channel_bandwidth_hz: f64,
    pub noise: SystemNoiseSettings,
}

impl Default for InterferometerSettings {
    fn default() -> Self {
        Self {
            channel_bandwidth_hz: 1e5,
            noise: SystemNoiseSettings::default(),
        }
    }
}

/// Uncorrelated system noise settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemNoiseSettings {
    /// Add noise to simulated visibilities
    pub enable: bool,
    /// Every station must end up with a noise model
    pub required: bool,
    pub frequencies: FrequencySpecification,
    pub values: NoiseSpecification,
}

/// How the noise frequency axis is obtained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrequencySpecification {
    /// Frequency file in the telescope model, else the observation channels
    #[default]
    TelescopeModel,
    /// Observation channel frequencies
    Observation,
    /// Explicit frequency file
    DataFile { path: PathBuf },
    /// `count` evenly spaced frequencies from `start_hz` to `end_hz`
    Range { start_hz: f64, end_hz: f64, count: usize },
}

/// How RMS noise values are obtained for each station.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoiseSpecification {
    /// Highest priority specification found in the telescope model
    #[default]
    TelescopeModel,
    /// RMS noise given directly
    Rms { source: ValueSource },
    /// System equivalent flux density (Jy)
    Sensitivity { source: ValueSource },
    /// System temperature (K) with effective area (m²) and efficiency
    SystemTemperature {
        t_sys: ValueSource,
        area: ValueSource,
        efficiency: ValueSource,
    },
}

/// Where a per-frequency quantity comes from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueSource {
    /// The matching file in the telescope model
    #[default]
    TelescopeModel,
    DataFile { path: PathBuf },
    /// Evenly spaced from `start` at the first frequency to `end` at the last
    Range { start: f64, end: f64 },
}
