//! Output sinks for finished series.
//!
//! Every sink writes one file per [`FrameSeries`] into an output directory,
//! named `{label}_{percentile}.{extension}` where `label` is the source file
//! name. Downstream tooling relies on this naming, e.g. `clip.mp4_95.csv`.

mod csv;
mod font;
mod plot;

use std::path::PathBuf;

pub use self::csv::{CsvSink, read_series};
pub use self::plot::PlotSink;

use crate::error::LightscanError;
use crate::series::FrameSeries;

/// Writes a [`FrameSeries`] somewhere and reports where.
pub trait SeriesSink {
    /// Write `series`, returning the path of the file produced.
    fn write(&self, series: &FrameSeries) -> Result<PathBuf, LightscanError>;
}

/// File name for `series` with the given extension.
///
/// # Example
///
/// ```
/// use lightscan::{FrameSeries, Percentile, VideoFileRef, output_file_name};
///
/// let series = FrameSeries::from_values(VideoFileRef::new("/data/clip.mp4"), Percentile::DEFAULT, vec![]);
/// assert_eq!(output_file_name(&series, "csv"), "clip.mp4_95.csv");
/// ```
pub fn output_file_name(series: &FrameSeries, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        series.source().label(),
        series.percentile(),
        extension
    )
}
