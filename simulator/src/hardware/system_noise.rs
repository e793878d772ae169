//! Uncorrelated system noise model for telescope stations.
//!
//! Each station carries a lookup table of RMS noise against frequency. The
//! frequency axis is common to all stations in a telescope and is shared
//! between them, while the RMS values belong to the station alone.

use std::fmt;
use std::sync::Arc;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Numeric precision used for the arrays of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    Single,
    #[default]
    Double,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Single => write!(f, "single"),
            Precision::Double => write!(f, "double"),
        }
    }
}

/// One-dimensional array stored at the precision of the run.
#[derive(Debug, Clone, PartialEq)]
pub enum PrecisionArray {
    Single(Array1<f32>),
    Double(Array1<f64>),
}

impl PrecisionArray {
    /// Store double precision values at the requested precision
    pub fn from_f64(precision: Precision, values: Array1<f64>) -> Self {
        match precision {
            Precision::Single => PrecisionArray::Single(values.mapv(|v| v as f32)),
            Precision::Double => PrecisionArray::Double(values),
        }
    }

    pub fn empty(precision: Precision) -> Self {
        Self::from_f64(precision, Array1::zeros(0))
    }

    pub fn precision(&self) -> Precision {
        match self {
            PrecisionArray::Single(_) => Precision::Single,
            PrecisionArray::Double(_) => Precision::Double,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PrecisionArray::Single(arr) => arr.len(),
            PrecisionArray::Double(arr) => arr.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values widened to double precision
    pub fn to_f64(&self) -> Array1<f64> {
        match self {
            PrecisionArray::Single(arr) => arr.mapv(f64::from),
            PrecisionArray::Double(arr) => arr.clone(),
        }
    }
}

/// Frequencies (Hz) at which station noise is tabulated.
///
/// Built once per telescope and shared by every station model.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseFrequencyTable {
    values: PrecisionArray,
}

impl NoiseFrequencyTable {
    pub fn new(precision: Precision, frequencies_hz: Array1<f64>) -> Self {
        Self {
            values: PrecisionArray::from_f64(precision, frequencies_hz),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn precision(&self) -> Precision {
        self.values.precision()
    }

    pub fn values(&self) -> &PrecisionArray {
        &self.values
    }

    pub fn to_f64(&self) -> Array1<f64> {
        self.values.to_f64()
    }
}

/// RMS noise against frequency for a single station.
///
/// A model with no RMS values is disabled: no noise is added to
/// visibilities involving the station.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemNoiseModel {
    frequencies: Option<Arc<NoiseFrequencyTable>>,
    rms: PrecisionArray,
}

impl Default for SystemNoiseModel {
    fn default() -> Self {
        Self::disabled(Precision::default())
    }
}

impl SystemNoiseModel {
    /// Model with noise switched off
    pub fn disabled(precision: Precision) -> Self {
        Self {
            frequencies: None,
            rms: PrecisionArray::empty(precision),
        }
    }

    /// Build an enabled model. Returns `None` if the RMS table does not have
    /// one entry per frequency.
    pub fn new(frequencies: Arc<NoiseFrequencyTable>, rms_jy: Array1<f64>) -> Option<Self> {
        if rms_jy.len() != frequencies.len() || rms_jy.is_empty() {
            return None;
        }
        let rms = PrecisionArray::from_f64(frequencies.precision(), rms_jy);
        Some(Self {
            frequencies: Some(frequencies),
            rms,
        })
    }

    pub fn is_enabled(&self) -> bool {
        !self.rms.is_empty()
    }

    pub fn frequencies(&self) -> Option<&Arc<NoiseFrequencyTable>> {
        self.frequencies.as_ref()
    }

    pub fn rms(&self) -> &PrecisionArray {
        &self.rms
    }

    pub fn num_frequencies(&self) -> usize {
        self.rms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_precision_array_single() {
        let arr = PrecisionArray::from_f64(Precision::Single, array![1.5, 2.5]);
        assert_eq!(arr.precision(), Precision::Single);
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.to_f64(), array![1.5, 2.5]);
    }

    #[test]
    fn test_disabled_model() {
        let model = SystemNoiseModel::disabled(Precision::Single);
        assert!(!model.is_enabled());
        assert!(model.frequencies().is_none());
        assert_eq!(model.rms().precision(), Precision::Single);
    }

    #[test]
    fn test_model_shares_frequency_table() {
        let freqs = Arc::new(NoiseFrequencyTable::new(
            Precision::Double,
            array![100e6, 200e6],
        ));
        let a = SystemNoiseModel::new(freqs.clone(), array![1.0, 2.0]).unwrap();
        let b = SystemNoiseModel::new(freqs.clone(), array![3.0, 4.0]).unwrap();

        assert!(a.is_enabled());
        assert!(Arc::ptr_eq(a.frequencies().unwrap(), b.frequencies().unwrap()));
        assert_eq!(Arc::strong_count(&freqs), 3);
    }

    #[test]
    fn test_model_rejects_length_mismatch() {
        let freqs = Arc::new(NoiseFrequencyTable::new(
            Precision::Double,
            array![100e6, 200e6],
        ));
        assert!(SystemNoiseModel::new(freqs, array![1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_model_follows_table_precision() {
        let freqs = Arc::new(NoiseFrequencyTable::new(Precision::Single, array![1e8]));
        let model = SystemNoiseModel::new(freqs, array![0.25]).unwrap();
        assert_eq!(model.rms(), &PrecisionArray::Single(array![0.25f32]));
    }
}
