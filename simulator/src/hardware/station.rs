//! Telescope and station hierarchy for interferometer simulation.
//!
//! A telescope owns a list of stations. A station is either a single receiving
//! element group or a sub-array that owns further child stations, so the
//! hierarchy can be arbitrarily deep. Loaders populate per-station properties
//! such as the system noise model; they never change the topology.
//!
//! # Examples
//!
//! ```rust
//! use simulator::hardware::station::{StationModel, TelescopeModel};
//!
//! let sub_array = StationModel::with_children(
//!     "core",
//!     vec![StationModel::new("core_a"), StationModel::new("core_b")],
//! );
//! let telescope = TelescopeModel::new("Demo", vec![sub_array, StationModel::new("remote")]);
//!
//! assert_eq!(telescope.stations.len(), 2);
//! assert_eq!(telescope.num_leaf_stations(), 3);
//! ```

use shared::telescope_dir::{DirError, TelescopeDir};

use crate::hardware::system_noise::SystemNoiseModel;

/// A node of the telescope hierarchy.
///
/// Implemented by both the telescope root and stations so a single recursive
/// routine can walk every level.
pub trait TelescopeNode {
    type Child: TelescopeNode;

    /// Human readable name of this node
    fn name(&self) -> &str;

    /// Child nodes, in declaration order
    fn children(&self) -> &[Self::Child];

    fn children_mut(&mut self) -> &mut [Self::Child];

    /// Noise model slot, if this kind of node carries one
    fn noise_model_mut(&mut self) -> Option<&mut SystemNoiseModel>;

    fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }
}

/// A station, or a sub-array of stations.
#[derive(Debug, Clone, Default)]
pub struct StationModel {
    pub name: String,
    /// Child stations when this node is a sub-array
    pub children: Vec<StationModel>,
    /// Uncorrelated system noise for this station
    pub noise: SystemNoiseModel,
}

impl StationModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            noise: SystemNoiseModel::default(),
        }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<StationModel>) -> Self {
        Self {
            name: name.into(),
            children,
            noise: SystemNoiseModel::default(),
        }
    }

    /// Build a station hierarchy mirroring a directory layout.
    ///
    /// Each sub-directory becomes a child station, recursively.
    pub fn from_directory<D: TelescopeDir>(name: &str, dir: &D) -> Result<Self, DirError> {
        let children = dir
            .subdirs()?
            .iter()
            .map(|sub| StationModel::from_directory(sub, &dir.child(sub)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::with_children(name, children))
    }

    /// Number of leaf stations at or below this node
    pub fn num_leaf_stations(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(|c| c.num_leaf_stations()).sum()
        }
    }

    /// Visit every leaf station with its slash-separated path
    pub fn for_each_leaf<'a, F>(&'a self, prefix: &str, f: &mut F)
    where
        F: FnMut(&str, &'a StationModel),
    {
        let path = if prefix.is_empty() {
            self.name.clone()
        } else {
            format!("{prefix}/{}", self.name)
        };

        if self.children.is_empty() {
            f(&path, self);
        } else {
            for child in &self.children {
                child.for_each_leaf(&path, f);
            }
        }
    }
}

impl TelescopeNode for StationModel {
    type Child = StationModel;

    fn name(&self) -> &str {
        &self.name
    }

    fn children(&self) -> &[StationModel] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [StationModel] {
        &mut self.children
    }

    fn noise_model_mut(&mut self) -> Option<&mut SystemNoiseModel> {
        Some(&mut self.noise)
    }
}

/// Complete telescope: the root of the station hierarchy.
#[derive(Debug, Clone, Default)]
pub struct TelescopeModel {
    pub name: String,
    pub stations: Vec<StationModel>,
}

impl TelescopeModel {
    pub fn new(name: impl Into<String>, stations: Vec<StationModel>) -> Self {
        Self {
            name: name.into(),
            stations,
        }
    }

    /// Flat array of `num_stations` stations named `station000`, `station001`, ...
    pub fn with_identical_stations(name: impl Into<String>, num_stations: usize) -> Self {
        let stations = (0..num_stations)
            .map(|i| StationModel::new(format!("station{i:03}")))
            .collect();
        Self::new(name, stations)
    }

    /// Build a telescope whose stations mirror the sub-directories of `dir`.
    pub fn from_directory<D: TelescopeDir>(name: &str, dir: &D) -> Result<Self, DirError> {
        let root = StationModel::from_directory(name, dir)?;
        Ok(Self::new(root.name, root.children))
    }

    pub fn num_leaf_stations(&self) -> usize {
        self.stations.iter().map(|s| s.num_leaf_stations()).sum()
    }

    /// Visit every leaf station with its path relative to the telescope
    pub fn for_each_leaf<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(&str, &'a StationModel),
    {
        for station in &self.stations {
            station.for_each_leaf("", &mut f);
        }
    }
}

impl TelescopeNode for TelescopeModel {
    type Child = StationModel;

    fn name(&self) -> &str {
        &self.name
    }

    fn children(&self) -> &[StationModel] {
        &self.stations
    }

    fn children_mut(&mut self) -> &mut [StationModel] {
        &mut self.stations
    }

    fn noise_model_mut(&mut self) -> Option<&mut SystemNoiseModel> {
        None
    }
}
