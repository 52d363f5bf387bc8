//! Parallel batch processing.
//!
//! Files are distributed across rayon threads. Each worker opens its own
//! demuxer and decoder so no decode state is shared; frames within a file
//! are still decoded strictly in order. Results are collected by file index,
//! so the [`BatchResult`] order matches discovery order whatever order the
//! workers finish in.
//!
//! The public API is [`BatchOrchestrator::run_parallel`]; this module
//! contains only the implementation.

use std::path::Path;
use std::sync::Mutex;

use ::rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::batch::{BatchEntry, BatchOrchestrator, BatchResult};
use crate::decoder::FrameSource;
use crate::discovery::{self, VideoFileRef};
use crate::error::LightscanError;
use crate::progress::{OperationType, ProgressTracker};
use crate::series::SeriesBuilder;

impl<S: FrameSource + Sync> BatchOrchestrator<S> {
    /// Like [`run`](BatchOrchestrator::run), but builds series on the rayon
    /// thread pool.
    ///
    /// # Errors
    ///
    /// Returns [`LightscanError::PathError`] if `directory` cannot be
    /// scanned.
    pub fn run_parallel<P: AsRef<Path>>(
        &self,
        directory: P,
    ) -> Result<BatchResult, LightscanError> {
        let files = discovery::discover(directory, &self.options().discovery)?;
        Ok(self.run_files_parallel(files))
    }

    /// Like [`run_files`](BatchOrchestrator::run_files), but builds series on
    /// the rayon thread pool.
    pub fn run_files_parallel(&self, files: Vec<VideoFileRef>) -> BatchResult {
        let options = self.options();
        let builder = SeriesBuilder::new(self.source(), options);
        let tracker = Mutex::new(ProgressTracker::new(
            options.progress.clone(),
            OperationType::BatchScan,
            Some(files.len() as u64),
            1,
        ));

        let entries: Vec<BatchEntry> = files
            .into_par_iter()
            .map(|video| {
                let entry = if options.is_cancelled() {
                    BatchEntry::Skipped(video)
                } else {
                    let outcome = builder.build(&video);
                    BatchEntry::from_outcome(&video, outcome)
                };
                if let Ok(mut tracker) = tracker.lock() {
                    tracker.advance(Some(entry.source().label()));
                }
                entry
            })
            .collect();

        BatchResult::from_entries(entries)
    }
}
