//! Noise specification files discovered in a telescope model directory.
//!
//! Each level of the telescope model may contain any of six noise files. A
//! [`FileMap`] records the most specific file seen for each role: descending
//! into a station directory copies the parent's map and then replaces any
//! role the station directory redefines.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use once_cell::sync::Lazy;
use shared::telescope_dir::{DirError, TelescopeDir};

/// The part a noise file plays in specifying station noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoiseFileRole {
    Frequency,
    Rms,
    Sensitivity,
    SystemTemperature,
    Area,
    Efficiency,
}

impl NoiseFileRole {
    pub const ALL: [NoiseFileRole; 6] = [
        NoiseFileRole::Frequency,
        NoiseFileRole::Rms,
        NoiseFileRole::Sensitivity,
        NoiseFileRole::SystemTemperature,
        NoiseFileRole::Area,
        NoiseFileRole::Efficiency,
    ];

    /// File name that carries this role in a telescope model directory
    pub fn file_name(self) -> &'static str {
        match self {
            NoiseFileRole::Frequency => "noise_frequencies.txt",
            NoiseFileRole::Rms => "rms.txt",
            NoiseFileRole::Sensitivity => "sensitivity.txt",
            NoiseFileRole::SystemTemperature => "t_sys.txt",
            NoiseFileRole::Area => "area.txt",
            NoiseFileRole::Efficiency => "efficiency.txt",
        }
    }

    /// Role of a file name, ignoring case
    pub fn from_file_name(name: &str) -> Option<NoiseFileRole> {
        ROLES_BY_FILE_NAME.get(name.to_ascii_lowercase().as_str()).copied()
    }
}

impl fmt::Display for NoiseFileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NoiseFileRole::Frequency => "frequency",
            NoiseFileRole::Rms => "RMS",
            NoiseFileRole::Sensitivity => "sensitivity",
            NoiseFileRole::SystemTemperature => "system temperature",
            NoiseFileRole::Area => "area",
            NoiseFileRole::Efficiency => "efficiency",
        };
        write!(f, "{label}")
    }
}

static ROLES_BY_FILE_NAME: Lazy<HashMap<&'static str, NoiseFileRole>> = Lazy::new(|| {
    NoiseFileRole::ALL
        .iter()
        .map(|&role| (role.file_name(), role))
        .collect()
});

/// Most specific noise file path for each role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMap {
    files: BTreeMap<NoiseFileRole, PathBuf>,
}

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, role: NoiseFileRole) -> Option<&Path> {
        self.files.get(&role).map(PathBuf::as_path)
    }

    pub fn contains(&self, role: NoiseFileRole) -> bool {
        self.files.contains_key(&role)
    }

    /// Set the file for a role, replacing any inherited one
    pub fn insert(&mut self, role: NoiseFileRole, path: impl Into<PathBuf>) -> Option<PathBuf> {
        self.files.insert(role, path.into())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NoiseFileRole, &Path)> {
        self.files.iter().map(|(role, path)| (*role, path.as_path()))
    }

    /// Override roles with the noise files found directly in `dir`.
    ///
    /// Returns the number of roles set at this level. Files that match no
    /// role are ignored. When several files at one level name the same role
    /// (e.g. `rms.txt` and `RMS.txt`), the last in sorted order is used and a
    /// warning is logged.
    pub fn update_from_dir<D: TelescopeDir>(&mut self, dir: &D) -> Result<usize, DirError> {
        let mut seen = BTreeSet::new();
        for name in dir.files()? {
            if let Some(role) = NoiseFileRole::from_file_name(&name) {
                let path = dir.file_path(&name);
                debug!("Found {role} noise file {path:?}");
                if !seen.insert(role) {
                    warn!(
                        "Several {role} noise files in {:?}, using {name}",
                        dir.path()
                    );
                }
                self.files.insert(role, path);
            }
        }
        Ok(seen.len())
    }

    /// Copy of this map with the overrides found in `dir` applied.
    ///
    /// The receiver is left untouched, so sibling directories each start from
    /// the same inherited state.
    pub fn descend<D: TelescopeDir>(&self, dir: &D) -> Result<FileMap, DirError> {
        let mut child = self.clone();
        child.update_from_dir(dir)?;
        Ok(child)
    }
}
