//! Reader for single-column numeric text tables.
//!
//! Telescope model directories describe per-frequency quantities (frequencies,
//! RMS noise, sensitivities, system temperatures, ...) as plain text files with
//! one value per line. Values may also be separated by whitespace or commas on
//! a single line. Lines whose first non-blank character is `#` are comments.

use std::path::{Path, PathBuf};

use ndarray::Array1;
use thiserror::Error;

/// Errors raised while reading a numeric table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to read table {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid value '{token}' on line {line} of {path:?}")]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
    },
    #[error("Table {path:?} contains no values")]
    Empty { path: PathBuf },
}

/// Read every numeric value in a text file, in file order.
///
/// # Errors
/// - [`TableError::Io`] if the file cannot be read
/// - [`TableError::Parse`] if any token is not a number
/// - [`TableError::Empty`] if the file holds no values
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Array1<f64>, TableError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_table(&text, path)
}

/// Parse the contents of a table. `origin` is only used for error reporting.
pub fn parse_table(text: &str, origin: &Path) -> Result<Array1<f64>, TableError> {
    let mut values = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        for token in line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let value = token.parse::<f64>().map_err(|_| TableError::Parse {
                path: origin.to_path_buf(),
                line: line_no + 1,
                token: token.to_string(),
            })?;
            values.push(value);
        }
    }

    if values.is_empty() {
        return Err(TableError::Empty {
            path: origin.to_path_buf(),
        });
    }

    Ok(Array1::from(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_one_value_per_line() {
        let values = parse_table("100e6\n125e6\n150e6\n", Path::new("freqs")).unwrap();
        assert_eq!(values.to_vec(), vec![100e6, 125e6, 150e6]);
    }

    #[test]
    fn test_mixed_separators_and_comments() {
        let text = "# frequency list\n1.0 2.0, 3.0\n\n  # trailing comment\n4.0\n";
        let values = parse_table(text, Path::new("mixed")).unwrap();
        assert_eq!(values.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = parse_table("1.0\n2.0\nabc\n", Path::new("bad")).unwrap_err();
        match err {
            TableError::Parse { line, token, .. } => {
                assert_eq!(line, 3);
                assert_eq!(token, "abc");
            }
            other => panic!("Unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_table_is_error() {
        let err = parse_table("# nothing here\n\n", Path::new("empty")).unwrap_err();
        assert!(matches!(err, TableError::Empty { .. }));
    }

    #[test]
    fn test_read_table_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "10.5").unwrap();
        writeln!(file, "20.5").unwrap();

        let values = read_table(file.path()).unwrap();
        assert_eq!(values.to_vec(), vec![10.5, 20.5]);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_table("/nonexistent/path/rms.txt").unwrap_err();
        assert!(matches!(err, TableError::Io { .. }));
    }
}
