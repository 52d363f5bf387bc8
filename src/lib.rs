//! # lightscan
//!
//! Per-frame brightness percentiles for batches of video files.
//!
//! `lightscan` decodes every frame of every video in a directory, reduces
//! each frame to one number (a percentile of its pixel intensities), and
//! hands back one time series per file. Plotting that series makes it easy
//! to spot the frame where a light comes on in an otherwise dark recording.
//! Decoding is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use lightscan::{BatchOrchestrator, CsvSink, Percentile, PlotSink, ScanOptions, SeriesSink};
//!
//! let options = ScanOptions::new().with_percentile(Percentile::new(95)?);
//! let result = BatchOrchestrator::new(options).run("recordings")?;
//!
//! let csv = CsvSink::new("recordings");
//! let plots = PlotSink::new("recordings");
//! for series in result.series() {
//!     csv.write(series)?;   // recordings/clip.mp4_95.csv
//!     plots.write(series)?; // recordings/clip.mp4_95.png
//! }
//! for failure in result.failures() {
//!     eprintln!("{}: {}", failure.source().label(), failure.error());
//! }
//! # Ok::<(), lightscan::LightscanError>(())
//! ```
//!
//! ## Pipeline
//!
//! - [`discover`] lists the videos in a directory, sorted by path.
//! - [`FrameSource`] opens one video as a lazy [`FrameStream`];
//!   [`FfmpegSource`] is the FFmpeg implementation.
//! - [`reduce`] turns one [`Frame`] into a percentile, interpolated exactly
//!   like NumPy's default `percentile`.
//! - [`SeriesBuilder`] streams one file into a [`FrameSeries`], holding a
//!   single frame at a time.
//! - [`BatchOrchestrator`] runs every file, isolating per-file failures in a
//!   [`BatchResult`] with one entry per discovered file.
//! - [`CsvSink`] and [`PlotSink`] write the finished series.
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` | `run_parallel()` builds series for several files at once |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod batch;
pub mod configuration;
pub mod decoder;
pub mod discovery;
pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod percentile;
pub mod progress;
#[cfg(feature = "rayon")]
mod rayon;
pub mod series;
pub mod sink;
mod utilities;

pub use batch::{BatchEntry, BatchOrchestrator, BatchResult, FileFailure};
pub use configuration::{DiscoveryOptions, Percentile, PixelFormat, ScanOptions};
pub use decoder::{FfmpegFrames, FfmpegSource, FrameSource, FrameStream};
pub use discovery::{VideoFileRef, discover};
pub use error::{ErrorKind, LightscanError};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use frame::Frame;
pub use percentile::{percentile_of, percentile_of_bytes, reduce};
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use series::{FrameSeries, SeriesBuilder};
pub use sink::{CsvSink, PlotSink, SeriesSink, output_file_name, read_series};
