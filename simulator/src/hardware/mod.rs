//! Hardware module for telescope and station models

pub mod station;
pub mod system_noise;

pub use station::{StationModel, TelescopeModel, TelescopeNode};
pub use system_noise::{NoiseFrequencyTable, Precision, PrecisionArray, SystemNoiseModel};
