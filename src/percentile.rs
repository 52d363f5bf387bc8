//! Percentile reduction of a frame to one scalar.
//!
//! The statistic is the linearly interpolated order statistic used by
//! NumPy's `percentile` with its default `linear` method: for `n` samples
//! the virtual index is `h = (n - 1) * p / 100`, and the result lies between
//! the samples of rank `floor(h)` and `floor(h) + 1`, interpolated by the
//! fractional part of `h`.
//!
//! 8-bit frames are reduced through a 256-bin histogram, which finds both
//! ranks in one pass without sorting or copying the buffer. Float samples
//! go through [`percentile_of`], which selects ranks in place.

use std::cmp::Ordering;

use crate::configuration::Percentile;
use crate::error::LightscanError;
use crate::frame::Frame;

/// Reduce a frame to the requested percentile of its samples.
///
/// All channels are pooled. The result is always within the frame's
/// `[min, max]` sample range.
///
/// # Errors
///
/// Returns [`LightscanError::EmptyFrameError`] when the frame has no samples.
/// The error carries no path; the series builder fills it in.
///
/// # Example
///
/// ```
/// use lightscan::{Frame, Percentile, reduce};
///
/// let frame = Frame::from_samples((1..=100).collect()).unwrap();
/// let value = reduce(&frame, Percentile::new(95)?)?;
/// assert!((value - 95.05).abs() < 1e-9);
/// # Ok::<(), lightscan::LightscanError>(())
/// ```
pub fn reduce(frame: &Frame, percentile: Percentile) -> Result<f64, LightscanError> {
    percentile_of_bytes(frame.samples(), percentile)
}

/// Percentile of 8-bit samples via a histogram.
pub fn percentile_of_bytes(samples: &[u8], percentile: Percentile) -> Result<f64, LightscanError> {
    if samples.is_empty() {
        return Err(empty_frame());
    }

    let mut histogram = [0_u64; 256];
    for &sample in samples {
        histogram[sample as usize] += 1;
    }

    let ranks = Ranks::new(samples.len(), percentile);
    let low = histogram_rank(&histogram, ranks.low);
    let high = if ranks.high == ranks.low {
        low
    } else {
        histogram_rank(&histogram, ranks.high)
    };

    Ok(lerp(f64::from(low), f64::from(high), ranks.weight))
}

/// Percentile of arbitrary float samples.
///
/// The slice is reordered in place. Samples are ordered with
/// [`f64::total_cmp`], so positive NaNs sort above every number and
/// negative NaNs below.
///
/// # Errors
///
/// Returns [`LightscanError::EmptyFrameError`] when `samples` is empty.
pub fn percentile_of(samples: &mut [f64], percentile: Percentile) -> Result<f64, LightscanError> {
    if samples.is_empty() {
        return Err(empty_frame());
    }

    let ranks = Ranks::new(samples.len(), percentile);
    let (_, &mut low, above) = samples.select_nth_unstable_by(ranks.low, f64::total_cmp);
    let high = if ranks.high == ranks.low {
        low
    } else {
        // Rank `low + 1` is the smallest element of the upper partition.
        above
            .iter()
            .copied()
            .min_by(f64::total_cmp)
            .unwrap_or(low)
    };

    Ok(lerp(low, high, ranks.weight))
}

/// The two neighbouring ranks around the virtual index and the
/// interpolation weight between them.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Ranks {
    low: usize,
    high: usize,
    weight: f64,
}

impl Ranks {
    fn new(count: usize, percentile: Percentile) -> Self {
        let last = count - 1;
        let virtual_index = last as f64 * percentile.fraction();
        let low = (virtual_index.floor() as usize).min(last);
        let high = (low + 1).min(last);
        let weight = if low == last {
            0.0
        } else {
            virtual_index - low as f64
        };
        Self { low, high, weight }
    }
}

/// Value of the zero-based `rank`-th smallest sample.
fn histogram_rank(histogram: &[u64; 256], rank: usize) -> u8 {
    let mut cumulative = 0_u64;
    for (value, &count) in histogram.iter().enumerate() {
        cumulative += count;
        if cumulative > rank as u64 {
            return value as u8;
        }
    }
    u8::MAX
}

/// Interpolate from `low` to `high`, evaluated from the nearer end as NumPy
/// does so the result matches it bit for bit.
fn lerp(low: f64, high: f64, weight: f64) -> f64 {
    let difference = high - low;
    let value = if weight >= 0.5 {
        high - difference * (1.0 - weight)
    } else {
        low + difference * weight
    };
    // Rounding can push the value a hair outside the bracket.
    match low.partial_cmp(&high) {
        Some(Ordering::Greater) => value.clamp(high, low),
        Some(_) => value.clamp(low, high),
        None => value,
    }
}

fn empty_frame() -> LightscanError {
    LightscanError::EmptyFrameError {
        path: Default::default(),
        frame_index: 0,
    }
}
