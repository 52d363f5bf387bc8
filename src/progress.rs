//! Progress reporting and cancellation support.
//!
//! [`ProgressCallback`] observes a scan as it runs, [`CancellationToken`]
//! stops it cooperatively, and [`ProgressInfo`] is the snapshot handed to
//! callbacks. A batch emits two kinds of events: one per file
//! ([`OperationType::BatchScan`]) and one per reduced frame
//! ([`OperationType::FrameReduction`]), throttled by
//! [`ScanOptions::with_batch_size`](crate::ScanOptions::with_batch_size).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use lightscan::{
//!     BatchOrchestrator, OperationType, ProgressCallback, ProgressInfo, ScanOptions,
//! };
//!
//! struct PrintFiles;
//!
//! impl ProgressCallback for PrintFiles {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if info.operation == OperationType::BatchScan {
//!             println!("{} / {:?} files", info.current, info.total);
//!         }
//!     }
//! }
//!
//! let options = ScanOptions::new().with_progress(Arc::new(PrintFiles));
//! let result = BatchOrchestrator::new(options).run("recordings")?;
//! # Ok::<(), lightscan::LightscanError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// The kind of operation currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Reducing the frames of one video to a series.
    FrameReduction,
    /// Walking the discovered files of a batch.
    BatchScan,
}

/// A snapshot of scan progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// How many items (frames or files) have been processed so far.
    pub current: u64,
    /// Total items expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 to 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the operation started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Label of the file the event refers to, when there is one.
    pub label: Option<String>,
}

/// Trait for receiving progress updates during a scan.
///
/// Implementations must be [`Send`] and [`Sync`] because callbacks may be
/// invoked from rayon workers.
///
/// Progress callbacks are **infallible**: they observe but cannot halt
/// the operation. Use [`CancellationToken`] for cooperative cancellation.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals during a scan.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default callback.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone the token and share it between threads; call
/// [`cancel`](CancellationToken::cancel) from anywhere to stop the scan.
/// The batch loop checks it before each file and the series builder before
/// each frame.
///
/// # Example
///
/// ```
/// use lightscan::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks progress timing and emits callbacks every `batch_size` items.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one completed item and fire the callback if the batch
    /// threshold is reached.
    pub(crate) fn advance(&mut self, label: Option<&str>) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report(label);
            self.items_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final progress report.
    pub(crate) fn finish(&mut self, label: Option<&str>) {
        self.report(label);
    }

    fn report(&self, label: Option<&str>) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| (self.current as f32 / total as f32) * 100.0);

        let estimated_remaining = if self.current > 0 {
            self.total.map(|total| {
                let remaining = total.saturating_sub(self.current);
                elapsed.mul_f64(remaining as f64 / self.current as f64)
            })
        } else {
            None
        };

        let info = ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            label: label.map(str::to_string),
        };

        self.callback.on_progress(&info);
    }
}
