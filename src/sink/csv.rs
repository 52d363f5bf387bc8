//! Headerless single-column CSV output.

use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use super::{SeriesSink, output_file_name};
use crate::error::LightscanError;
use crate::series::FrameSeries;

/// Writes one value per row, in frame order, with no header.
///
/// Values use Rust's shortest round-trip float formatting, so reading the
/// file back with [`read_series`] reproduces the series exactly.
#[derive(Debug, Clone)]
pub struct CsvSink {
    directory: PathBuf,
}

impl CsvSink {
    /// Sink writing into `directory`, which is created if missing.
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl SeriesSink for CsvSink {
    fn write(&self, series: &FrameSeries) -> Result<PathBuf, LightscanError> {
        fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(output_file_name(series, "csv"));

        let mut writer = BufWriter::new(File::create(&path)?);
        for value in series.values() {
            writeln!(writer, "{value}")?;
        }
        writer.flush()?;

        log::debug!("Wrote {} rows to {}", series.len(), path.display());
        Ok(path)
    }
}

/// Read a file written by [`CsvSink`] back into its values.
///
/// Blank lines are ignored; only the first column of each row is read.
///
/// # Errors
///
/// Returns [`LightscanError::IoError`] if the file cannot be read and
/// [`LightscanError::CsvParseError`] if a row is not a number.
pub fn read_series<P: AsRef<Path>>(path: P) -> Result<Vec<f64>, LightscanError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);

    let mut values = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let field = line.split(',').next().unwrap_or_default().trim();
        if field.is_empty() {
            continue;
        }
        let value = field
            .parse::<f64>()
            .map_err(|error| LightscanError::CsvParseError {
                path: path.to_path_buf(),
                line: index + 1,
                reason: error.to_string(),
            })?;
        values.push(value);
    }
    Ok(values)
}
