//! Loading of station noise models from a telescope model directory.
//!
//! The loader walks the telescope hierarchy and the directory tree side by
//! side. At every level it collects the noise files present in the directory,
//! letting them override anything inherited from the levels above, and at
//! each leaf station it resolves the final RMS table.
//!
//! ```text
//! telescope/                 noise_frequencies.txt, sensitivity.txt
//! ├── core/                  (inherits both)
//! │   ├── station000/        rms.txt          -> RMS table
//! │   └── station001/                         -> sensitivity table
//! └── remote/                t_sys.txt, area.txt, efficiency.txt
//!     └── station002/                         -> sensitivity table (higher priority)
//! ```
//!
//! Sub-directories are matched to child stations in sorted-name order. A level
//! with no sub-directories passes its files on to every child station.

use std::sync::Arc;

use log::{debug, info, warn};
use ndarray::Array1;
use once_cell::unsync::OnceCell;
use shared::ascii_table::read_table;
use shared::range_arg::evaluate_range;
use shared::telescope_dir::TelescopeDir;

use crate::hardware::station::{TelescopeModel, TelescopeNode};
use crate::hardware::system_noise::{NoiseFrequencyTable, SystemNoiseModel};
use crate::noise::error::NoiseError;
use crate::noise::file_map::{FileMap, NoiseFileRole};
use crate::noise::resolver::NoiseSpecResolver;
use crate::settings::{FrequencySpecification, SimulationSettings};

/// Loads uncorrelated system noise into a telescope model.
///
/// One loader serves one telescope: the frequency table is fixed by the
/// first call that needs it and shared by every station loaded afterwards.
#[derive(Debug)]
pub struct NoiseLoader<'a> {
    settings: &'a SimulationSettings,
    frequencies: OnceCell<Arc<NoiseFrequencyTable>>,
}

impl<'a> NoiseLoader<'a> {
    pub fn new(settings: &'a SimulationSettings) -> Self {
        Self {
            settings,
            frequencies: OnceCell::new(),
        }
    }

    /// Frequency table shared by the loaded stations, once derived
    pub fn frequencies(&self) -> Option<&Arc<NoiseFrequencyTable>> {
        self.frequencies.get()
    }

    /// Load noise for every station of a telescope rooted at `dir`.
    ///
    /// Does nothing when noise is disabled in the settings. On error, stations
    /// processed before the failing one keep their models.
    pub fn load<D: TelescopeDir>(
        &self,
        telescope: &mut TelescopeModel,
        dir: &D,
    ) -> Result<(), NoiseError> {
        if !self.settings.interferometer.noise.enable {
            info!("System noise disabled, skipping noise for '{}'", telescope.name);
            return Ok(());
        }

        let mut file_map = FileMap::new();
        file_map.update_from_dir(dir)?;
        let frequencies = self.frequency_table(&file_map)?;
        info!(
            "Loading system noise for {} stations at {} frequencies from {:?}",
            telescope.num_leaf_stations(),
            frequencies.len(),
            dir.path()
        );

        self.load_children(telescope, Some(dir), &file_map, 0, "")
    }

    /// Load noise for a station (and its children) found in `dir`.
    ///
    /// `parent_map` holds the files inherited from the levels above and is
    /// not modified. `depth` is the station's depth below the telescope.
    pub fn load_station<N: TelescopeNode, D: TelescopeDir>(
        &self,
        station: &mut N,
        dir: &D,
        parent_map: &FileMap,
        depth: usize,
    ) -> Result<(), NoiseError> {
        let path = station.name().to_string();
        self.walk(station, Some(dir), parent_map, depth, &path)
    }

    fn walk<N: TelescopeNode, D: TelescopeDir>(
        &self,
        node: &mut N,
        dir: Option<&D>,
        parent_map: &FileMap,
        depth: usize,
        path: &str,
    ) -> Result<(), NoiseError> {
        let file_map = match dir {
            Some(dir) => parent_map.descend(dir)?,
            None => parent_map.clone(),
        };
        debug!(
            "Station '{path}' at depth {depth} sees {} noise files",
            file_map.len()
        );

        if node.is_leaf() {
            return self
                .resolve_leaf(node, &file_map, path)
                .map_err(|err| err.at_station(path));
        }
        self.load_children(node, dir, &file_map, depth + 1, path)
    }

    fn load_children<N: TelescopeNode, D: TelescopeDir>(
        &self,
        node: &mut N,
        dir: Option<&D>,
        file_map: &FileMap,
        depth: usize,
        path: &str,
    ) -> Result<(), NoiseError> {
        let subdirs = match dir {
            Some(dir) => dir.subdirs()?,
            None => Vec::new(),
        };
        let num_children = node.children().len();

        if let Some(dir) = dir {
            if !subdirs.is_empty() && subdirs.len() != num_children {
                return Err(NoiseError::StationLayout {
                    path: dir.path().to_path_buf(),
                    subdirs: subdirs.len(),
                    stations: num_children,
                });
            }
        }

        for (i, child) in node.children_mut().iter_mut().enumerate() {
            let child_path = if path.is_empty() {
                child.name().to_string()
            } else {
                format!("{path}/{}", child.name())
            };
            let child_dir = match (dir, subdirs.get(i)) {
                (Some(dir), Some(sub)) => Some(dir.child(sub)),
                _ => None,
            };
            self.walk(child, child_dir.as_ref(), file_map, depth, &child_path)?;
        }
        Ok(())
    }

    fn resolve_leaf<N: TelescopeNode>(
        &self,
        node: &mut N,
        file_map: &FileMap,
        path: &str,
    ) -> Result<(), NoiseError> {
        let (model, result) = match self.station_model(file_map, path) {
            Ok(model) => (model, Ok(())),
            Err(err) => (SystemNoiseModel::disabled(self.settings.precision), Err(err)),
        };
        if let Some(slot) = node.noise_model_mut() {
            *slot = model;
        }
        result
    }

    fn station_model(&self, file_map: &FileMap, path: &str) -> Result<SystemNoiseModel, NoiseError> {
        let frequencies = self.frequency_table(file_map)?;
        let noise = &self.settings.interferometer.noise;
        let mut resolver = NoiseSpecResolver::new(
            &noise.values,
            frequencies.len(),
            self.settings.interferometer.channel_bandwidth_hz,
            self.settings.observation.integration_time_sec(),
        );
        if noise.frequencies != FrequencySpecification::TelescopeModel {
            resolver = resolver.ignoring_frequency_files();
        }

        match resolver.resolve(file_map, path)? {
            Some(rms) => {
                let found = rms.len();
                let expected = frequencies.len();
                SystemNoiseModel::new(frequencies, rms)
                    .ok_or_else(|| NoiseError::dimension_mismatch("RMS", expected, found))
            }
            None if noise.required => Err(NoiseError::NoSpecification {
                station: path.to_string(),
            }),
            None => {
                warn!("No noise specification for station '{path}', noise disabled");
                Ok(SystemNoiseModel::disabled(self.settings.precision))
            }
        }
    }

    /// Shared frequency table, derived on first use from `file_map`.
    fn frequency_table(&self, file_map: &FileMap) -> Result<Arc<NoiseFrequencyTable>, NoiseError> {
        self.frequencies
            .get_or_try_init(|| {
                let values = self.noise_frequencies(file_map)?;
                debug!("Noise frequency table has {} entries", values.len());
                Ok::<_, NoiseError>(Arc::new(NoiseFrequencyTable::new(
                    self.settings.precision,
                    values,
                )))
            })
            .cloned()
    }

    fn noise_frequencies(&self, file_map: &FileMap) -> Result<Array1<f64>, NoiseError> {
        let observation = &self.settings.observation;
        let observation_channels = || {
            evaluate_range(
                observation.num_channels,
                observation.start_frequency_hz,
                observation.end_frequency_hz(),
            )
        };

        let values = match &self.settings.interferometer.noise.frequencies {
            FrequencySpecification::TelescopeModel => match file_map.get(NoiseFileRole::Frequency) {
                Some(path) => read_table(path)?,
                None => observation_channels()?,
            },
            FrequencySpecification::Observation => observation_channels()?,
            FrequencySpecification::DataFile { path } => read_table(path)?,
            FrequencySpecification::Range {
                start_hz,
                end_hz,
                count,
            } => evaluate_range(*count, *start_hz, *end_hz)?,
        };
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::station::StationModel;
    use crate::settings::{NoiseSpecification, ValueSource};
    use approx::assert_relative_eq;
    use shared::telescope_dir::FsTelescopeDir;
    use tempfile::TempDir;

    fn noise_settings() -> SimulationSettings {
        let mut settings = SimulationSettings::default();
        settings.interferometer.noise.enable = true;
        settings
    }

    #[test]
    fn test_disabled_noise_is_a_no_op() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("rms.txt"), "1.0").unwrap();

        let settings = SimulationSettings::default();
        let mut telescope = TelescopeModel::with_identical_stations("t", 2);
        let loader = NoiseLoader::new(&settings);
        loader
            .load(&mut telescope, &FsTelescopeDir::new(temp_dir.path()))
            .unwrap();

        assert!(loader.frequencies().is_none());
        assert!(telescope.stations.iter().all(|s| !s.noise.is_enabled()));
    }

    #[test]
    fn test_flat_telescope_inherits_root_files() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("noise_frequencies.txt"), "1e8\n2e8\n").unwrap();
        std::fs::write(temp_dir.path().join("RMS.txt"), "0.5\n0.25\n").unwrap();

        let settings = noise_settings();
        let mut telescope = TelescopeModel::with_identical_stations("t", 3);
        let loader = NoiseLoader::new(&settings);
        loader
            .load(&mut telescope, &FsTelescopeDir::new(temp_dir.path()))
            .unwrap();

        let freqs = loader.frequencies().unwrap();
        assert_eq!(freqs.to_f64().to_vec(), vec![1e8, 2e8]);
        for station in &telescope.stations {
            assert_eq!(station.noise.rms().to_f64().to_vec(), vec![0.5, 0.25]);
            assert!(Arc::ptr_eq(station.noise.frequencies().unwrap(), freqs));
        }
    }

    #[test]
    fn test_observation_channels_without_frequency_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("rms.txt"), "1 2 3").unwrap();

        let mut settings = noise_settings();
        settings.observation.start_frequency_hz = 100e6;
        settings.observation.frequency_inc_hz = 10e6;
        settings.observation.num_channels = 3;

        let mut telescope = TelescopeModel::with_identical_stations("t", 1);
        let loader = NoiseLoader::new(&settings);
        loader
            .load(&mut telescope, &FsTelescopeDir::new(temp_dir.path()))
            .unwrap();

        assert_eq!(
            loader.frequencies().unwrap().to_f64().to_vec(),
            vec![100e6, 110e6, 120e6]
        );
        assert!(telescope.stations[0].noise.is_enabled());
    }

    #[test]
    fn test_observation_frequencies_ignore_model_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("noise_frequencies.txt"), "5e8").unwrap();
        std::fs::write(temp_dir.path().join("rms.txt"), "1 2 3").unwrap();

        let mut settings = noise_settings();
        settings.interferometer.noise.frequencies = FrequencySpecification::Observation;
        settings.observation.start_frequency_hz = 100e6;
        settings.observation.frequency_inc_hz = 10e6;
        settings.observation.num_channels = 3;

        let mut telescope = TelescopeModel::with_identical_stations("t", 1);
        let loader = NoiseLoader::new(&settings);
        loader
            .load(&mut telescope, &FsTelescopeDir::new(temp_dir.path()))
            .unwrap();

        assert_eq!(
            loader.frequencies().unwrap().to_f64().to_vec(),
            vec![100e6, 110e6, 120e6]
        );
        assert_eq!(
            telescope.stations[0].noise.rms().to_f64().to_vec(),
            vec![1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn test_frequencies_from_data_file() {
        let model_dir = TempDir::new().unwrap();
        let data_dir = TempDir::new().unwrap();
        let freq_path = data_dir.path().join("freqs.txt");
        std::fs::write(&freq_path, "150e6, 160e6").unwrap();
        std::fs::write(model_dir.path().join("noise_frequencies.txt"), "1 2 3").unwrap();
        std::fs::write(model_dir.path().join("rms.txt"), "0.5 0.25").unwrap();

        let mut settings = noise_settings();
        settings.interferometer.noise.frequencies =
            FrequencySpecification::DataFile { path: freq_path };

        let mut telescope = TelescopeModel::with_identical_stations("t", 2);
        let loader = NoiseLoader::new(&settings);
        loader
            .load(&mut telescope, &FsTelescopeDir::new(model_dir.path()))
            .unwrap();

        assert_eq!(
            loader.frequencies().unwrap().to_f64().to_vec(),
            vec![150e6, 160e6]
        );
        assert!(telescope.stations.iter().all(|s| s.noise.is_enabled()));
    }

    #[test]
    fn test_missing_frequency_data_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("rms.txt"), "1").unwrap();

        let mut settings = noise_settings();
        settings.interferometer.noise.frequencies = FrequencySpecification::DataFile {
            path: temp_dir.path().join("no_such_file.txt"),
        };

        let mut telescope = TelescopeModel::with_identical_stations("t", 1);
        let loader = NoiseLoader::new(&settings);
        let err = loader
            .load(&mut telescope, &FsTelescopeDir::new(temp_dir.path()))
            .unwrap_err();

        assert!(matches!(err, NoiseError::Table(_)));
        assert_eq!(err.status_code(), 4);
        assert!(loader.frequencies().is_none());
        assert!(!telescope.stations[0].noise.is_enabled());
    }

    #[test]
    fn test_station_layout_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("station000")).unwrap();

        let settings = noise_settings();
        let mut telescope = TelescopeModel::with_identical_stations("t", 2);
        let err = NoiseLoader::new(&settings)
            .load(&mut telescope, &FsTelescopeDir::new(temp_dir.path()))
            .unwrap_err();

        assert!(matches!(
            err,
            NoiseError::StationLayout {
                subdirs: 1,
                stations: 2,
                ..
            }
        ));
        assert_eq!(err.status_code(), 5);
    }

    #[test]
    fn test_required_noise_without_specification() {
        let temp_dir = TempDir::new().unwrap();

        let mut settings = noise_settings();
        settings.interferometer.noise.required = true;
        let mut telescope = TelescopeModel::with_identical_stations("t", 1);
        let err = NoiseLoader::new(&settings)
            .load(&mut telescope, &FsTelescopeDir::new(temp_dir.path()))
            .unwrap_err();

        assert_eq!(err.status_code(), 6);
        assert!(err.to_string().contains("station000"));
    }

    #[test]
    fn test_load_station_directly() {
        let temp_dir = TempDir::new().unwrap();
        let station_dir = temp_dir.path().join("station");
        std::fs::create_dir(&station_dir).unwrap();
        std::fs::write(station_dir.join("sensitivity.txt"), "1000").unwrap();

        let mut settings = noise_settings();
        settings.interferometer.noise.frequencies = FrequencySpecification::Range {
            start_hz: 1e8,
            end_hz: 1e8,
            count: 1,
        };
        settings.interferometer.channel_bandwidth_hz = 1e5;
        settings.observation.length_sec = 10.0;
        settings.observation.num_time_steps = 1;

        let mut station = StationModel::new("station");
        let loader = NoiseLoader::new(&settings);
        loader
            .load_station(&mut station, &FsTelescopeDir::new(&station_dir), &FileMap::new(), 0)
            .unwrap();

        let rms = station.noise.rms().to_f64();
        assert_relative_eq!(rms[0], 0.707_106_781, max_relative = 1e-8);
    }

    #[test]
    fn test_failed_station_is_left_disabled() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("noise_frequencies.txt"), "1e8 2e8").unwrap();

        let mut settings = noise_settings();
        settings.interferometer.noise.values = NoiseSpecification::Rms {
            source: ValueSource::TelescopeModel,
        };

        let mut telescope = TelescopeModel::with_identical_stations("t", 1);
        let err = NoiseLoader::new(&settings)
            .load(&mut telescope, &FsTelescopeDir::new(temp_dir.path()))
            .unwrap_err();

        assert_eq!(err.status_code(), 2);
        assert!(!telescope.stations[0].noise.is_enabled());
    }
}
