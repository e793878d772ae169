//! Errors raised while loading station noise models.

use std::path::PathBuf;

use shared::ascii_table::TableError;
use shared::range_arg::RangeError;
use shared::telescope_dir::DirError;
use thiserror::Error;

use crate::noise::file_map::NoiseFileRole;
use crate::settings::SettingsError;

/// Status code returned on success.
pub const STATUS_OK: i32 = 0;

#[derive(Debug, Error)]
pub enum NoiseError {
    /// Two tables that must align by frequency index differ in length
    #[error("Dimension mismatch for {what}: expected {expected} values, found {found}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        found: usize,
    },
    /// The chosen specification needs a file the telescope model does not provide
    #[error("No {role} file available for station '{station}'")]
    MissingFile {
        role: NoiseFileRole,
        station: String,
    },
    #[error(transparent)]
    InvalidRange(#[from] RangeError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Directory(#[from] DirError),
    /// Station sub-directories do not match the stations of the model
    #[error("Directory {path:?} has {subdirs} sub-directories but the model has {stations} stations")]
    StationLayout {
        path: PathBuf,
        subdirs: usize,
        stations: usize,
    },
    /// Noise is required but nothing in the model specifies it
    #[error("No noise specification found for station '{station}'")]
    NoSpecification { station: String },
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Failure while resolving a particular station
    #[error("Station '{station}': {source}")]
    Station {
        station: String,
        #[source]
        source: Box<NoiseError>,
    },
}

impl NoiseError {
    /// Integer status code for this error. Never [`STATUS_OK`].
    pub fn status_code(&self) -> i32 {
        match self {
            NoiseError::DimensionMismatch { .. } => 1,
            NoiseError::MissingFile { .. } => 2,
            NoiseError::InvalidRange(_) => 3,
            NoiseError::Table(_) | NoiseError::Directory(_) => 4,
            NoiseError::StationLayout { .. } => 5,
            NoiseError::NoSpecification { .. } => 6,
            NoiseError::Settings(_) => 7,
            NoiseError::Station { source, .. } => source.status_code(),
        }
    }

    pub(crate) fn at_station(self, station: &str) -> Self {
        match self {
            // Already attributed further down the tree
            err @ NoiseError::Station { .. } => err,
            err => NoiseError::Station {
                station: station.to_string(),
                source: Box::new(err),
            },
        }
    }

    pub(crate) fn dimension_mismatch(what: impl Into<String>, expected: usize, found: usize) -> Self {
        NoiseError::DimensionMismatch {
            what: what.into(),
            expected,
            found,
        }
    }
}

/// Collapse a load result into a status code.
pub fn status_of<T>(result: &Result<T, NoiseError>) -> i32 {
    match result {
        Ok(_) => STATUS_OK,
        Err(err) => err.status_code(),
    }
}
