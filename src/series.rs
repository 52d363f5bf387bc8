//! Per-file time series.
//!
//! [`SeriesBuilder`] drives a [`FrameSource`] and the percentile reducer over
//! every frame of one video, producing a [`FrameSeries`]: one value per
//! frame, indexed by decode order.
//!
//! A series is all-or-nothing. If any frame fails to decode or is empty, the
//! values gathered so far are discarded and the error is returned; a
//! truncated series would look like a complete recording that simply ended
//! early.
//!
//! # Example
//!
//! ```no_run
//! use lightscan::{FfmpegSource, ScanOptions, SeriesBuilder, VideoFileRef};
//!
//! let options = ScanOptions::new();
//! let source = FfmpegSource::from_options(&options);
//! let series = SeriesBuilder::new(&source, &options).build(&VideoFileRef::new("clip.mp4"))?;
//! println!("{} frames, peak {:?}", series.len(), series.value_range());
//! # Ok::<(), lightscan::LightscanError>(())
//! ```

use crate::configuration::{Percentile, ScanOptions};
use crate::decoder::{FrameSource, FrameStream};
use crate::discovery::VideoFileRef;
use crate::error::LightscanError;
use crate::percentile;
use crate::progress::{OperationType, ProgressTracker};

/// The percentile of every frame of one video, in frame order.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSeries {
    source: VideoFileRef,
    percentile: Percentile,
    values: Vec<f64>,
}

impl FrameSeries {
    /// Assemble a series from values computed elsewhere, e.g. read back from
    /// a CSV file.
    pub fn from_values(source: VideoFileRef, percentile: Percentile, values: Vec<f64>) -> Self {
        Self {
            source,
            percentile,
            values,
        }
    }

    pub fn source(&self) -> &VideoFileRef {
        &self.source
    }

    pub fn percentile(&self) -> Percentile {
        self.percentile
    }

    /// One value per frame; index `i` is frame `i`.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest and largest value, or `None` for a video with no frames.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values.iter().fold(None, |range, &value| match range {
            None => Some((value, value)),
            Some((low, high)) => Some((low.min(value), high.max(value))),
        })
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// Builds the [`FrameSeries`] of one video at a time.
pub struct SeriesBuilder<'a, S: FrameSource> {
    source: &'a S,
    options: &'a ScanOptions,
}

impl<'a, S: FrameSource> SeriesBuilder<'a, S> {
    pub fn new(source: &'a S, options: &'a ScanOptions) -> Self {
        Self { source, options }
    }

    /// Decode `video` and reduce each frame to the configured percentile.
    ///
    /// Only one frame is held at a time. The frame stream is dropped on
    /// every exit path, releasing the decoder.
    ///
    /// # Errors
    ///
    /// - [`LightscanError::DecodeOpenError`] if the video cannot be opened.
    /// - [`LightscanError::DecodeFrameError`] or
    ///   [`LightscanError::EmptyFrameError`] if a frame fails; no partial
    ///   series is returned.
    /// - [`LightscanError::Cancelled`] if the scan is cancelled before the
    ///   last frame. A cancellation that arrives once every expected frame
    ///   has been reduced still returns the finished series.
    pub fn build(&self, video: &VideoFileRef) -> Result<FrameSeries, LightscanError> {
        let percentile = self.options.percentile;
        let mut frames = self.source.open(video)?;

        let mut tracker = ProgressTracker::new(
            self.options.progress.clone(),
            OperationType::FrameReduction,
            frames.estimated_frames(),
            self.options.batch_size,
        );
        let mut values = Vec::with_capacity(
            frames
                .estimated_frames()
                .and_then(|count| usize::try_from(count).ok())
                .unwrap_or(0),
        );

        loop {
            // Checked before decoding so a cancelled scan does no more work.
            let next = if self.options.is_cancelled() {
                // A stream already at its expected length only has EOF left
                // to confirm; the series is complete unless more frames show.
                let at_expected_end = frames.estimated_frames() == Some(values.len() as u64);
                match at_expected_end.then(|| frames.next()) {
                    Some(None) => break,
                    _ => {
                        log::debug!(
                            "Cancelled {} after {} frame(s)",
                            video.label(),
                            values.len()
                        );
                        return Err(LightscanError::Cancelled);
                    }
                }
            } else {
                frames.next()
            };

            let Some(frame) = next else {
                break;
            };
            let frame_index = values.len() as u64;
            let value = frame
                .and_then(|frame| percentile::reduce(&frame, percentile))
                .map_err(|error| error.with_frame_context(video.path(), frame_index))?;

            values.push(value);
            tracker.advance(Some(video.label()));
        }

        tracker.finish(Some(video.label()));
        log::debug!(
            "Built {}th percentile series of {} frame(s) for {}",
            percentile,
            values.len(),
            video.label()
        );

        Ok(FrameSeries {
            source: video.clone(),
            percentile,
            values,
        })
    }
}
