//! Linearly spaced value tables and a clap-compatible range argument.
//!
//! Frequency axes and constant-over-band noise values are frequently given as a
//! start/end pair plus a number of points rather than an explicit list. This
//! module turns such a triple into a table of evenly spaced values.

use std::fmt;
use std::str::FromStr;

use ndarray::Array1;
use thiserror::Error;

/// Errors raised while evaluating or parsing a range.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RangeError {
    /// A range must produce at least one value
    #[error("Range must contain at least one value (requested {0})")]
    NoValues(usize),
    /// The textual form could not be parsed
    #[error("Invalid range '{input}': {reason}")]
    Parse { input: String, reason: String },
}

/// Evaluate `num_values` evenly spaced points from `start` to `end` inclusive.
///
/// A single value evaluates to `[start]`. Otherwise point `i` is
/// `start + i * (end - start) / (num_values - 1)`, so both end points are
/// present exactly.
///
/// # Errors
/// Returns [`RangeError::NoValues`] when `num_values` is zero.
pub fn evaluate_range(num_values: usize, start: f64, end: f64) -> Result<Array1<f64>, RangeError> {
    match num_values {
        0 => Err(RangeError::NoValues(num_values)),
        1 => Ok(Array1::from_elem(1, start)),
        n => {
            let inc = (end - start) / (n - 1) as f64;
            Ok(Array1::from_shape_fn(n, |i| start + i as f64 * inc))
        }
    }
}

/// Parse a range specification of the form "start:end:count".
///
/// # Examples
/// - "100e6:200e6:5" - five points from 100 MHz to 200 MHz
/// - "1.4e9:1.4e9:1" - a single point
///
/// Invalid formats:
/// - "1.0:2.0" - missing count
/// - "1.0:2.0:0" - count must be positive
/// - "1.0:2.0:2.5" - count must be an integer
pub fn parse_range(s: &str) -> Result<(f64, f64, usize), RangeError> {
    let err = |reason: &str| RangeError::Parse {
        input: s.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return Err(err("range must be in format 'start:end:count'"));
    }

    let start = parts[0]
        .trim()
        .parse::<f64>()
        .map_err(|_| err("invalid start value"))?;
    let end = parts[1]
        .trim()
        .parse::<f64>()
        .map_err(|_| err("invalid end value"))?;
    let count = parts[2]
        .trim()
        .parse::<usize>()
        .map_err(|_| err("invalid count"))?;

    if count == 0 {
        return Err(err("count must be at least 1"));
    }

    Ok((start, end, count))
}

/// Type-safe wrapper for a "start:end:count" range on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeArg(pub f64, pub f64, pub usize);

impl FromStr for RangeArg {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end, count) = parse_range(s)?;
        Ok(RangeArg(start, end, count))
    }
}

impl fmt::Display for RangeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.0, self.1, self.2)
    }
}

impl RangeArg {
    pub fn start(&self) -> f64 {
        self.0
    }

    pub fn end(&self) -> f64 {
        self.1
    }

    pub fn count(&self) -> usize {
        self.2
    }

    /// Evaluate the range into a table of values.
    pub fn to_array(&self) -> Result<Array1<f64>, RangeError> {
        evaluate_range(self.2, self.0, self.1)
    }
}
