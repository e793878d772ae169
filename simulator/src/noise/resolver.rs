//! Selection of the noise specification that applies to a station.
//!
//! With the default telescope-model specification the files visible to a
//! station are tried in a fixed priority order and the first one present
//! wins:
//!
//! 1. RMS table (checked against the frequency file when one is present)
//! 2. Sensitivity table, converted with the radiometer equation
//! 3. System temperature table, with area and efficiency tables
//!
//! Settings can instead force one of these methods, taking each quantity from
//! the telescope model, from an explicit file, or from a linear range.

use std::path::Path;

use log::debug;
use ndarray::Array1;
use shared::ascii_table::read_table;
use shared::range_arg::evaluate_range;

use crate::noise::error::NoiseError;
use crate::noise::file_map::{FileMap, NoiseFileRole};
use crate::noise::radiometer::{sensitivity_to_rms, t_sys_to_rms};
use crate::settings::{NoiseSpecification, ValueSource};

/// Resolves per-frequency RMS noise for stations of one telescope.
#[derive(Debug, Clone)]
pub struct NoiseSpecResolver<'a> {
    specification: &'a NoiseSpecification,
    num_freqs: usize,
    bandwidth_hz: f64,
    integration_time_sec: f64,
    check_frequency_files: bool,
}

impl<'a> NoiseSpecResolver<'a> {
    /// Create a resolver for one telescope.
    ///
    /// # Arguments
    /// * `specification` - Method selection from the noise settings
    /// * `num_freqs` - Length of the telescope frequency table
    /// * `bandwidth_hz` - Channel bandwidth used by the radiometer conversions
    /// * `integration_time_sec` - Integration time of one visibility dump
    pub fn new(
        specification: &'a NoiseSpecification,
        num_freqs: usize,
        bandwidth_hz: f64,
        integration_time_sec: f64,
    ) -> Self {
        Self {
            specification,
            num_freqs,
            bandwidth_hz,
            integration_time_sec,
            check_frequency_files: true,
        }
    }

    /// Skip the comparison against station frequency files.
    ///
    /// Used when the frequency table comes from the settings rather than the
    /// telescope model, so `noise_frequencies.txt` does not describe it.
    pub fn ignoring_frequency_files(mut self) -> Self {
        self.check_frequency_files = false;
        self
    }

    /// RMS noise (Jy) per frequency for a station.
    ///
    /// # Arguments
    /// * `file_map` - Noise files visible to the station, after all overrides
    /// * `station` - Station label used in error messages
    ///
    /// # Returns
    /// `Some` table holding exactly `num_freqs` values, or `None` when the
    /// telescope-model specification finds no noise file for the station.
    ///
    /// # Errors
    /// * [`NoiseError::DimensionMismatch`] if the table read for the chosen
    ///   method disagrees with the station's frequency file, or the result
    ///   does not hold `num_freqs` values
    /// * [`NoiseError::MissingFile`] if the method needs a file the station
    ///   does not see
    /// * [`NoiseError::Table`] or [`NoiseError::InvalidRange`] if a value
    ///   source cannot be read or evaluated
    pub fn resolve(
        &self,
        file_map: &FileMap,
        station: &str,
    ) -> Result<Option<Array1<f64>>, NoiseError> {
        let rms = match self.specification {
            NoiseSpecification::TelescopeModel => {
                return self.resolve_telescope_model(file_map, station)
            }
            NoiseSpecification::Rms { source } => {
                let rms = self.load_values(source, NoiseFileRole::Rms, file_map, station)?;
                self.check_frequency_file(file_map, &rms, "RMS")?;
                rms
            }
            NoiseSpecification::Sensitivity { source } => {
                let sensitivity =
                    self.load_values(source, NoiseFileRole::Sensitivity, file_map, station)?;
                self.check_frequency_file(file_map, &sensitivity, "sensitivity")?;
                self.convert_sensitivity(&sensitivity)?
            }
            NoiseSpecification::SystemTemperature {
                t_sys,
                area,
                efficiency,
            } => {
                let t_sys =
                    self.load_values(t_sys, NoiseFileRole::SystemTemperature, file_map, station)?;
                self.check_frequency_file(file_map, &t_sys, "system temperature")?;
                let area = self.load_values(area, NoiseFileRole::Area, file_map, station)?;
                let efficiency =
                    self.load_values(efficiency, NoiseFileRole::Efficiency, file_map, station)?;
                self.convert_t_sys(&t_sys, &area, &efficiency)?
            }
        };

        self.check_len(&rms, "RMS")?;
        Ok(Some(rms))
    }

    /// Priority chain over the files visible to the station.
    fn resolve_telescope_model(
        &self,
        file_map: &FileMap,
        station: &str,
    ) -> Result<Option<Array1<f64>>, NoiseError> {
        if let Some(rms_path) = file_map.get(NoiseFileRole::Rms) {
            debug!("Using RMS noise table {rms_path:?}");
            let rms = read_table(rms_path)?;
            self.check_frequency_file(file_map, &rms, &format!("RMS table {rms_path:?}"))?;
            self.check_len(&rms, "RMS")?;
            return Ok(Some(rms));
        }

        if let Some(sensitivity_path) = file_map.get(NoiseFileRole::Sensitivity) {
            debug!("Using sensitivity table {sensitivity_path:?}");
            let sensitivity = read_table(sensitivity_path)?;
            self.check_frequency_file(
                file_map,
                &sensitivity,
                &format!("sensitivity table {sensitivity_path:?}"),
            )?;
            return self.convert_sensitivity(&sensitivity).map(Some);
        }

        if let Some(t_sys_path) = file_map.get(NoiseFileRole::SystemTemperature) {
            debug!("Using system temperature table {t_sys_path:?}");
            let area_path = required(file_map, NoiseFileRole::Area, station)?;
            let efficiency_path = required(file_map, NoiseFileRole::Efficiency, station)?;

            let t_sys = read_table(t_sys_path)?;
            self.check_frequency_file(
                file_map,
                &t_sys,
                &format!("system temperature table {t_sys_path:?}"),
            )?;
            let area = read_table(area_path)?;
            let efficiency = read_table(efficiency_path)?;
            return self.convert_t_sys(&t_sys, &area, &efficiency).map(Some);
        }

        Ok(None)
    }

    fn load_values(
        &self,
        source: &ValueSource,
        role: NoiseFileRole,
        file_map: &FileMap,
        station: &str,
    ) -> Result<Array1<f64>, NoiseError> {
        match source {
            ValueSource::TelescopeModel => Ok(read_table(required(file_map, role, station)?)?),
            ValueSource::DataFile { path } => Ok(read_table(path)?),
            ValueSource::Range { start, end } => Ok(evaluate_range(self.num_freqs, *start, *end)?),
        }
    }

    fn convert_sensitivity(&self, sensitivity: &Array1<f64>) -> Result<Array1<f64>, NoiseError> {
        sensitivity_to_rms(
            sensitivity.view(),
            self.num_freqs,
            self.bandwidth_hz,
            self.integration_time_sec,
        )
    }

    fn convert_t_sys(
        &self,
        t_sys: &Array1<f64>,
        area: &Array1<f64>,
        efficiency: &Array1<f64>,
    ) -> Result<Array1<f64>, NoiseError> {
        t_sys_to_rms(
            t_sys.view(),
            area.view(),
            efficiency.view(),
            self.num_freqs,
            self.bandwidth_hz,
            self.integration_time_sec,
        )
    }

    /// Require a per-frequency table to match the station's frequency file, if
    /// the station sees one.
    fn check_frequency_file(
        &self,
        file_map: &FileMap,
        values: &Array1<f64>,
        what: &str,
    ) -> Result<(), NoiseError> {
        if !self.check_frequency_files {
            return Ok(());
        }
        let Some(freq_path) = file_map.get(NoiseFileRole::Frequency) else {
            return Ok(());
        };
        let freqs = read_table(freq_path)?;
        if freqs.len() != values.len() {
            return Err(NoiseError::dimension_mismatch(
                format!("{what} against frequency table {freq_path:?}"),
                freqs.len(),
                values.len(),
            ));
        }
        Ok(())
    }

    fn check_len(&self, values: &Array1<f64>, what: &str) -> Result<(), NoiseError> {
        if values.len() != self.num_freqs {
            return Err(NoiseError::dimension_mismatch(
                what,
                self.num_freqs,
                values.len(),
            ));
        }
        Ok(())
    }
}

/// Path for a role the chosen method cannot do without.
fn required<'m>(
    file_map: &'m FileMap,
    role: NoiseFileRole,
    station: &str,
) -> Result<&'m Path, NoiseError> {
    file_map.get(role).ok_or_else(|| NoiseError::MissingFile {
        role,
        station: station.to_string(),
    })
}
