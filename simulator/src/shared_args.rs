use std::path::PathBuf;

use clap::{Args, ValueEnum};
use shared::range_arg::RangeArg;

use crate::hardware::system_noise::Precision;
use crate::settings::{FrequencySpecification, SettingsError, SimulationSettings};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecisionArg {
    Single,
    Double,
}

impl From<PrecisionArg> for Precision {
    fn from(arg: PrecisionArg) -> Self {
        match arg {
            PrecisionArg::Single => Precision::Single,
            PrecisionArg::Double => Precision::Double,
        }
    }
}

/// Common arguments shared across simulation binaries
#[derive(Args, Debug, Clone)]
pub struct SharedSimulationArgs {
    /// Settings file (JSON); defaults are used when omitted
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Array precision, overriding the settings file
    #[arg(long, value_enum)]
    pub precision: Option<PrecisionArg>,

    /// Noise frequencies as "start:end:count" in Hz, overriding the settings file
    #[arg(long)]
    pub frequency_range: Option<RangeArg>,

    /// Channel bandwidth in Hz, overriding the settings file
    #[arg(long)]
    pub bandwidth: Option<f64>,

    /// Integration time in seconds, overriding the settings file
    #[arg(long)]
    pub integration_time: Option<f64>,

    /// Fail when a station has no noise specification
    #[arg(long, default_value_t = false)]
    pub require_noise: bool,
}

impl SharedSimulationArgs {
    /// Load the settings file (if any) and apply command line overrides.
    ///
    /// Noise is always enabled for runs driven from the command line.
    pub fn resolve_settings(&self) -> Result<SimulationSettings, SettingsError> {
        let mut settings = match &self.settings {
            Some(path) => SimulationSettings::load_from_file(path)?,
            None => SimulationSettings::default(),
        };
        self.apply(&mut settings);
        Ok(settings)
    }

    fn apply(&self, settings: &mut SimulationSettings) {
        let noise = &mut settings.interferometer.noise;
        noise.enable = true;
        noise.required |= self.require_noise;

        if let Some(precision) = self.precision {
            settings.precision = precision.into();
        }
        if let Some(range) = &self.frequency_range {
            noise.frequencies = FrequencySpecification::Range {
                start_hz: range.start(),
                end_hz: range.end(),
                count: range.count(),
            };
        }
        if let Some(bandwidth) = self.bandwidth {
            settings.interferometer.channel_bandwidth_hz = bandwidth;
        }
        if let Some(integration_time) = self.integration_time {
            // Expressed as a single dump of the requested length
            settings.observation.length_sec = integration_time;
            settings.observation.num_time_steps = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        shared: SharedSimulationArgs,
    }

    #[test]
    fn test_overrides_applied() {
        let cli = TestCli::parse_from([
            "test",
            "--precision",
            "single",
            "--frequency-range",
            "100e6:200e6:5",
            "--bandwidth",
            "2e5",
            "--integration-time",
            "8",
            "--require-noise",
        ]);
        let settings = cli.shared.resolve_settings().unwrap();

        assert_eq!(settings.precision, Precision::Single);
        assert!(settings.interferometer.noise.enable);
        assert!(settings.interferometer.noise.required);
        assert_eq!(
            settings.interferometer.noise.frequencies,
            FrequencySpecification::Range {
                start_hz: 100e6,
                end_hz: 200e6,
                count: 5
            }
        );
        assert_relative_eq!(settings.interferometer.channel_bandwidth_hz, 2e5);
        assert_relative_eq!(settings.observation.integration_time_sec(), 8.0);
    }

    #[test]
    fn test_defaults_without_flags() {
        let cli = TestCli::parse_from(["test"]);
        let settings = cli.shared.resolve_settings().unwrap();

        assert!(settings.interferometer.noise.enable);
        assert!(!settings.interferometer.noise.required);
        assert_eq!(settings.precision, Precision::Double);
        assert_eq!(
            settings.interferometer.noise.frequencies,
            FrequencySpecification::TelescopeModel
        );
    }
}
