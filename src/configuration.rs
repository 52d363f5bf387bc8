//! Scan configuration.
//!
//! [`ScanOptions`] is a builder that threads the percentile, discovery
//! filter, decode pixel format, progress callback and cancellation token
//! through a batch without polluting every function signature.
//!
//! # Example
//!
//! ```no_run
//! use lightscan::{CancellationToken, DiscoveryOptions, Percentile, PixelFormat, ScanOptions};
//!
//! let token = CancellationToken::new();
//! let options = ScanOptions::new()
//!     .with_percentile(Percentile::new(99)?)
//!     .with_discovery(DiscoveryOptions::new().with_extensions(["mp4", "mov"]))
//!     .with_pixel_format(PixelFormat::Gray8)
//!     .with_cancellation(token.clone());
//! # Ok::<(), lightscan::LightscanError>(())
//! ```

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use ffmpeg_next::format::Pixel;

use crate::error::LightscanError;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Which order statistic to compute, as an integer percent in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentile(u8);

impl Percentile {
    /// The default statistic: the 95th percentile.
    pub const DEFAULT: Percentile = Percentile(95);
    /// The minimum sample.
    pub const MIN: Percentile = Percentile(0);
    /// The median.
    pub const MEDIAN: Percentile = Percentile(50);
    /// The maximum sample.
    pub const MAX: Percentile = Percentile(100);

    /// Validate a percentile.
    ///
    /// # Errors
    ///
    /// Returns [`LightscanError::InvalidPercentile`] when `value` is outside
    /// `0..=100`.
    pub fn new(value: i64) -> Result<Self, LightscanError> {
        match u8::try_from(value) {
            Ok(percent) if percent <= 100 => Ok(Self(percent)),
            _ => Err(LightscanError::InvalidPercentile(value)),
        }
    }

    /// The percent value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// The percentile as a fraction in `[0, 1]`.
    pub fn fraction(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl Default for Percentile {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for Percentile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Pixel layout frames are converted to before reduction.
///
/// Every channel of every pixel counts as one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 8-bit RGB, three samples per pixel. This is the default.
    #[default]
    Rgb8,
    /// 8-bit luma only, one sample per pixel.
    Gray8,
}

impl PixelFormat {
    /// Map to the corresponding FFmpeg pixel format constant.
    pub(crate) fn to_ffmpeg_pixel(self) -> Pixel {
        match self {
            PixelFormat::Rgb8 => Pixel::RGB24,
            PixelFormat::Gray8 => Pixel::GRAY8,
        }
    }

    /// Samples per pixel.
    pub fn channels(self) -> u8 {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Gray8 => 1,
        }
    }

    /// Parse a user-supplied name (`rgb8`, `rgb`, `gray8`, `gray`, ...).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "rgb8" | "rgb" => Some(PixelFormat::Rgb8),
            "gray8" | "gray" | "grey" | "greyscale" | "grayscale" | "luma" => {
                Some(PixelFormat::Gray8)
            }
            _ => None,
        }
    }
}

/// Which files in the scanned directory count as videos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Extensions without the leading dot.
    pub(crate) extensions: Vec<String>,
    /// Compare extensions exactly instead of ASCII case-insensitively.
    pub(crate) case_sensitive: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryOptions {
    /// Match `.mp4` files, ignoring case.
    pub fn new() -> Self {
        Self {
            extensions: vec!["mp4".to_string()],
            case_sensitive: false,
        }
    }

    /// Replace the extension filter. Leading dots are stripped.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|extension| extension.as_ref().trim_start_matches('.').to_string())
            .filter(|extension| !extension.is_empty())
            .collect();
        self
    }

    /// Match extensions exactly when `true`.
    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// The configured extensions.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns `true` if `extension` passes the filter.
    pub(crate) fn matches(&self, extension: &str) -> bool {
        self.extensions.iter().any(|candidate| {
            if self.case_sensitive {
                candidate == extension
            } else {
                candidate.eq_ignore_ascii_case(extension)
            }
        })
    }
}

/// Configuration for a scan.
///
/// A default-constructed value computes the 95th percentile of RGB samples
/// over every `.mp4` file, with no progress reporting and no cancellation.
#[derive(Clone)]
pub struct ScanOptions {
    pub(crate) percentile: Percentile,
    pub(crate) discovery: DiscoveryOptions,
    pub(crate) pixel_format: PixelFormat,
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// Cancellation token. `None` means never cancelled.
    pub(crate) cancellation: Option<CancellationToken>,
    /// Fire the frame progress callback every N frames.
    pub(crate) batch_size: u64,
}

impl Debug for ScanOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ScanOptions")
            .field("percentile", &self.percentile)
            .field("discovery", &self.discovery)
            .field("pixel_format", &self.pixel_format)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanOptions {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self {
            percentile: Percentile::DEFAULT,
            discovery: DiscoveryOptions::new(),
            pixel_format: PixelFormat::default(),
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Set the statistic to compute for every frame.
    #[must_use]
    pub fn with_percentile(mut self, percentile: Percentile) -> Self {
        self.percentile = percentile;
        self
    }

    /// Set the file filter used by discovery.
    #[must_use]
    pub fn with_discovery(mut self, discovery: DiscoveryOptions) -> Self {
        self.discovery = discovery;
        self
    }

    /// Set the pixel layout frames are converted to before reduction.
    #[must_use]
    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = format;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// Once cancelled, files not yet started and the file in flight are
    /// reported as skipped.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the frame progress callback fires. Clamped to at
    /// least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn percentile(&self) -> Percentile {
        self.percentile
    }

    pub fn discovery(&self) -> &DiscoveryOptions {
        &self.discovery
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Returns `true` if cancellation has been requested.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
