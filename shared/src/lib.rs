//! Shared components for the simulator crates.
//!
//! Directory access for telescope model trees, ASCII numeric tables and
//! range arguments used to describe frequency grids.

pub mod ascii_table;
pub mod range_arg;
pub mod telescope_dir;
