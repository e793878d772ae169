//! Radiometer equation conversions to RMS visibility noise.
//!
//! # Physics
//!
//! The thermal noise on a single correlator product, in Jy, is
//!
//! ```text
//! σ = SEFD / sqrt(2 Δν τ)
//! ```
//!
//! where SEFD is the station's system equivalent flux density (its
//! "sensitivity"), Δν the channel bandwidth and τ the integration time.
//! When a station is described by its system temperature instead, the SEFD is
//!
//! ```text
//! SEFD = 2 k_B T_sys / (A_eff η)
//! ```
//!
//! with effective area A_eff (m²) and efficiency η, converted from
//! W m⁻² Hz⁻¹ to Jy.

use ndarray::{Array1, ArrayView1};

use crate::noise::error::NoiseError;

/// Boltzmann constant (J/K)
pub const BOLTZMANN_J_PER_K: f64 = 1.380_648_8e-23;

/// Jansky per W m⁻² Hz⁻¹
pub const JY_PER_SI_FLUX_DENSITY: f64 = 1.0e26;

/// Scale factor from SEFD to RMS noise for one correlator product.
pub fn radiometer_factor(bandwidth_hz: f64, integration_time_sec: f64) -> f64 {
    1.0 / (2.0 * bandwidth_hz * integration_time_sec).sqrt()
}

/// System equivalent flux density in Jy.
///
/// # Arguments
/// * `t_sys_k` - System temperature in K
/// * `area_m2` - Effective collecting area in m²
/// * `efficiency` - System efficiency (0-1)
pub fn system_equivalent_flux_density(t_sys_k: f64, area_m2: f64, efficiency: f64) -> f64 {
    2.0 * BOLTZMANN_J_PER_K * t_sys_k / (area_m2 * efficiency) * JY_PER_SI_FLUX_DENSITY
}

/// Convert per-frequency sensitivity (SEFD, Jy) to RMS noise (Jy).
///
/// Applies `σ = SEFD / sqrt(2 Δν τ)` to every entry. Non-finite inputs
/// propagate to the output unchanged.
///
/// # Arguments
/// * `sensitivity` - System equivalent flux density per frequency, in Jy
/// * `num_freqs` - Length of the telescope frequency table
/// * `bandwidth_hz` - Channel bandwidth Δν in Hz
/// * `integration_time_sec` - Integration time τ of one dump in seconds
///
/// # Returns
/// RMS noise per frequency in Jy, `num_freqs` values long.
///
/// # Errors
/// [`NoiseError::DimensionMismatch`] if `sensitivity` does not hold
/// `num_freqs` values.
pub fn sensitivity_to_rms(
    sensitivity: ArrayView1<f64>,
    num_freqs: usize,
    bandwidth_hz: f64,
    integration_time_sec: f64,
) -> Result<Array1<f64>, NoiseError> {
    if sensitivity.len() != num_freqs {
        return Err(NoiseError::dimension_mismatch(
            "sensitivity",
            num_freqs,
            sensitivity.len(),
        ));
    }
    let factor = radiometer_factor(bandwidth_hz, integration_time_sec);
    Ok(sensitivity.mapv(|s| s * factor))
}

/// Convert per-frequency system temperature (K) to RMS noise (Jy).
///
/// Each frequency's SEFD is computed with [`system_equivalent_flux_density`]
/// and then scaled as in [`sensitivity_to_rms`].
///
/// # Arguments
/// * `t_sys` - System temperature per frequency, in K
/// * `area` - Effective collecting area in m², one value or one per frequency
/// * `efficiency` - System efficiency (0-1), one value or one per frequency
/// * `num_freqs` - Length of the telescope frequency table
/// * `bandwidth_hz` - Channel bandwidth Δν in Hz
/// * `integration_time_sec` - Integration time τ of one dump in seconds
///
/// # Returns
/// RMS noise per frequency in Jy, `num_freqs` values long.
///
/// # Errors
/// [`NoiseError::DimensionMismatch`] if `t_sys` does not hold `num_freqs`
/// values, or `area`/`efficiency` hold neither 1 nor `num_freqs` values.
pub fn t_sys_to_rms(
    t_sys: ArrayView1<f64>,
    area: ArrayView1<f64>,
    efficiency: ArrayView1<f64>,
    num_freqs: usize,
    bandwidth_hz: f64,
    integration_time_sec: f64,
) -> Result<Array1<f64>, NoiseError> {
    if t_sys.len() != num_freqs {
        return Err(NoiseError::dimension_mismatch(
            "system temperature",
            num_freqs,
            t_sys.len(),
        ));
    }
    check_broadcast(area.len(), num_freqs, "area")?;
    check_broadcast(efficiency.len(), num_freqs, "efficiency")?;

    let sefd = Array1::from_shape_fn(num_freqs, |i| {
        system_equivalent_flux_density(t_sys[i], value_at(&area, i), value_at(&efficiency, i))
    });
    sensitivity_to_rms(sefd.view(), num_freqs, bandwidth_hz, integration_time_sec)
}

/// Accept a single value or one value per frequency.
fn check_broadcast(len: usize, num_freqs: usize, what: &str) -> Result<(), NoiseError> {
    if len == 1 || len == num_freqs {
        Ok(())
    } else {
        Err(NoiseError::dimension_mismatch(what, num_freqs, len))
    }
}

fn value_at(values: &ArrayView1<f64>, i: usize) -> f64 {
    if values.len() == 1 {
        values[0]
    } else {
        values[i]
    }
}
