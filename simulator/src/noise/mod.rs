//! Uncorrelated system noise for telescope stations.
//!
//! Noise is described by text tables placed anywhere in the telescope model
//! directory tree. [`NoiseLoader`] merges the tables visible at each level,
//! [`NoiseSpecResolver`] picks the specification that applies to a station,
//! and [`radiometer`] converts it to RMS noise.

pub mod error;
pub mod file_map;
pub mod loader;
pub mod radiometer;
pub mod resolver;

pub use error::{status_of, NoiseError, STATUS_OK};
pub use file_map::{FileMap, NoiseFileRole};
pub use loader::NoiseLoader;
pub use resolver::NoiseSpecResolver;
