//! Batch processing of a directory of videos.
//!
//! [`BatchOrchestrator`] discovers the videos in a directory and builds one
//! series per file. A file that fails is recorded in its own slot and the
//! batch moves on, so one corrupt recording never costs the results of the
//! others. The returned [`BatchResult`] always has exactly one entry per
//! discovered file, in discovery order.
//!
//! # Example
//!
//! ```no_run
//! use lightscan::{BatchEntry, BatchOrchestrator, ScanOptions};
//!
//! let result = BatchOrchestrator::new(ScanOptions::new()).run("recordings")?;
//! for entry in result.entries() {
//!     match entry {
//!         BatchEntry::Completed(series) => println!("{}: {} frames", series.source().label(), series.len()),
//!         BatchEntry::Failed(failure) => eprintln!("{}: {}", failure.source().label(), failure.error()),
//!         BatchEntry::Skipped(video) => eprintln!("{}: skipped", video.label()),
//!     }
//! }
//! # Ok::<(), lightscan::LightscanError>(())
//! ```

use std::path::Path;

use crate::configuration::ScanOptions;
use crate::decoder::{FfmpegSource, FrameSource};
use crate::discovery::{self, VideoFileRef};
use crate::error::LightscanError;
use crate::progress::{OperationType, ProgressTracker};
use crate::series::{FrameSeries, SeriesBuilder};

/// A file whose series could not be built.
#[derive(Debug)]
pub struct FileFailure {
    source: VideoFileRef,
    error: LightscanError,
}

impl FileFailure {
    pub fn source(&self) -> &VideoFileRef {
        &self.source
    }

    pub fn error(&self) -> &LightscanError {
        &self.error
    }

    pub fn into_error(self) -> LightscanError {
        self.error
    }
}

/// The outcome for one discovered file.
#[derive(Debug)]
pub enum BatchEntry {
    /// Every frame decoded and reduced.
    Completed(FrameSeries),
    /// Opening or decoding failed; no series was kept.
    Failed(FileFailure),
    /// Not processed, or abandoned mid-file, because the scan was cancelled.
    Skipped(VideoFileRef),
}

impl BatchEntry {
    /// The file this entry accounts for.
    pub fn source(&self) -> &VideoFileRef {
        match self {
            BatchEntry::Completed(series) => series.source(),
            BatchEntry::Failed(failure) => failure.source(),
            BatchEntry::Skipped(video) => video,
        }
    }

    pub fn series(&self) -> Option<&FrameSeries> {
        match self {
            BatchEntry::Completed(series) => Some(series),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FileFailure> {
        match self {
            BatchEntry::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, BatchEntry::Completed(_))
    }

    /// Classify the result of building one file's series.
    pub(crate) fn from_outcome(
        video: &VideoFileRef,
        outcome: Result<FrameSeries, LightscanError>,
    ) -> Self {
        match outcome {
            Ok(series) => BatchEntry::Completed(series),
            Err(LightscanError::Cancelled) => BatchEntry::Skipped(video.clone()),
            Err(error) => {
                log::warn!("Skipping {}: {error}", video.label());
                BatchEntry::Failed(FileFailure {
                    source: video.clone(),
                    error,
                })
            }
        }
    }
}

/// One entry per discovered file, in discovery order.
#[derive(Debug, Default)]
pub struct BatchResult {
    entries: Vec<BatchEntry>,
}

impl BatchResult {
    pub(crate) fn from_entries(entries: Vec<BatchEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<BatchEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Completed series, in discovery order.
    pub fn series(&self) -> impl Iterator<Item = &FrameSeries> {
        self.entries.iter().filter_map(BatchEntry::series)
    }

    /// Failed files, in discovery order.
    pub fn failures(&self) -> impl Iterator<Item = &FileFailure> {
        self.entries.iter().filter_map(BatchEntry::failure)
    }

    /// Files skipped because of cancellation.
    pub fn skipped(&self) -> impl Iterator<Item = &VideoFileRef> {
        self.entries.iter().filter_map(|entry| match entry {
            BatchEntry::Skipped(video) => Some(video),
            _ => None,
        })
    }

    pub fn completed_count(&self) -> usize {
        self.series().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }
}

impl IntoIterator for BatchResult {
    type Item = BatchEntry;
    type IntoIter = std::vec::IntoIter<BatchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Runs discovery and series building for a whole directory.
pub struct BatchOrchestrator<S: FrameSource = FfmpegSource> {
    source: S,
    options: ScanOptions,
}

impl BatchOrchestrator<FfmpegSource> {
    /// Orchestrator decoding with FFmpeg in the pixel format from `options`.
    pub fn new(options: ScanOptions) -> Self {
        let source = FfmpegSource::from_options(&options);
        Self { source, options }
    }
}

impl<S: FrameSource> BatchOrchestrator<S> {
    /// Orchestrator over a custom frame source.
    pub fn with_source(source: S, options: ScanOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Discover the videos in `directory` and build a series for each.
    ///
    /// # Errors
    ///
    /// Returns [`LightscanError::PathError`] if `directory` cannot be
    /// scanned. Per-file failures never abort the batch; they are recorded
    /// in the result.
    pub fn run<P: AsRef<Path>>(&self, directory: P) -> Result<BatchResult, LightscanError> {
        let files = discovery::discover(directory, &self.options.discovery)?;
        Ok(self.run_files(files))
    }

    /// Build a series for each file, in the given order.
    pub fn run_files(&self, files: Vec<VideoFileRef>) -> BatchResult {
        let builder = SeriesBuilder::new(&self.source, &self.options);
        let mut tracker = ProgressTracker::new(
            self.options.progress.clone(),
            OperationType::BatchScan,
            Some(files.len() as u64),
            1,
        );

        let mut entries = Vec::with_capacity(files.len());
        for video in files {
            let entry = if self.options.is_cancelled() {
                BatchEntry::Skipped(video)
            } else {
                let outcome = builder.build(&video);
                BatchEntry::from_outcome(&video, outcome)
            };
            tracker.advance(Some(entry.source().label()));
            entries.push(entry);
        }

        let result = BatchResult::from_entries(entries);
        log::debug!(
            "Batch finished: {} completed, {} failed, {} skipped",
            result.completed_count(),
            result.failed_count(),
            result.skipped().count()
        );
        result
    }
}
