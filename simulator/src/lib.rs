//! Radio telescope model for interferometer simulation
//!
//! This crate provides the in-memory telescope and station hierarchy, the
//! settings that drive a simulation run, and the loaders that populate
//! station properties from a telescope model directory.

pub mod hardware;
pub mod noise;
pub mod settings;
pub mod shared_args;

// Re-exports for easier access
pub use hardware::station::{StationModel, TelescopeModel};
pub use hardware::system_noise::SystemNoiseModel;
pub use noise::{NoiseError, NoiseLoader};
pub use settings::SimulationSettings;
