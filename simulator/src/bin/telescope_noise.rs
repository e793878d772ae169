//! Station noise table inspection
//!
//! Loads the uncorrelated system noise for every station of a telescope model
//! directory and prints the resulting RMS noise against frequency.
//!
//! Usage:
//! ```
//! cargo run --bin telescope_noise -- path/to/telescope [OPTIONS]
//! cargo run --bin telescope_noise -- path/to/telescope --frequency-range 100e6:200e6:5
//! cargo run --bin telescope_noise -- path/to/telescope --stations 32 --settings sim.json
//! ```
//!
//! Station sub-directories define the station hierarchy. When the telescope
//! directory has none, `--stations` identical stations are created instead.
//! The process exits with the loader's status code on failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use shared::telescope_dir::{FsTelescopeDir, TelescopeDir};
use simulator::hardware::station::TelescopeModel;
use simulator::noise::{NoiseError, NoiseLoader};
use simulator::shared_args::SharedSimulationArgs;

/// Command line arguments for noise table inspection
#[derive(Parser, Debug)]
#[command(
    name = "Telescope Noise",
    about = "Loads and prints per-station system noise from a telescope model",
    long_about = None
)]
struct Args {
    /// Telescope model directory
    telescope_dir: PathBuf,

    #[command(flatten)]
    shared: SharedSimulationArgs,

    /// Number of stations when the directory has no station sub-directories
    #[arg(long, default_value_t = 1)]
    stations: usize,

    /// Only print a one-line summary per station
    #[arg(long, default_value_t = false)]
    summary: bool,
}

fn run(args: &Args) -> Result<(), NoiseError> {
    let settings = args.shared.resolve_settings()?;
    let dir = FsTelescopeDir::open(&args.telescope_dir)?;

    let name = args
        .telescope_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("telescope")
        .to_string();
    let mut telescope = if dir.subdirs()?.is_empty() {
        TelescopeModel::with_identical_stations(name, args.stations)
    } else {
        TelescopeModel::from_directory(&name, &dir)?
    };
    info!(
        "Telescope '{}' has {} stations ({} precision)",
        telescope.name,
        telescope.num_leaf_stations(),
        settings.precision
    );

    let loader = NoiseLoader::new(&settings);
    loader.load(&mut telescope, &dir)?;

    let frequencies = loader
        .frequencies()
        .map(|f| f.to_f64().to_vec())
        .unwrap_or_default();

    telescope.for_each_leaf(|path, station| {
        if !station.noise.is_enabled() {
            println!("{path}: noise disabled");
            return;
        }
        let rms = station.noise.rms().to_f64();
        if args.summary {
            let min = rms.iter().copied().fold(f64::INFINITY, f64::min);
            let max = rms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            println!(
                "{path}: {} channels, RMS {min:.6} - {max:.6} Jy",
                rms.len()
            );
        } else {
            println!("{path}:");
            println!("  {:>16}  {:>14}", "Frequency (Hz)", "RMS (Jy)");
            for (freq, value) in frequencies.iter().zip(rms.iter()) {
                println!("  {freq:>16.6e}  {value:>14.6e}");
            }
        }
    });

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("Error: {err}");
            ExitCode::from(err.status_code().clamp(1, 255) as u8)
        }
    }
}
