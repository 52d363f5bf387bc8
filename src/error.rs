//! Error types for the `lightscan` crate.
//!
//! This module defines [`LightscanError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry the file path and, for
//! mid-stream decode failures, the frame index reached, so a batch report can
//! be produced without extra logging at the call site.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    io::Error as IoError,
    path::PathBuf,
};

use image::ImageError;
use thiserror::Error;

/// The unified error type for all `lightscan` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LightscanError {
    /// The discovery root is missing, is not a directory, or cannot be listed.
    #[error("Invalid scan directory {path}: {reason}")]
    PathError {
        /// Directory that was passed to discovery.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// A video file could not be opened for decoding.
    #[error("Failed to open video {path} for decoding: {reason}")]
    DecodeOpenError {
        /// The file that failed to open.
        path: PathBuf,
        /// Underlying reason reported by the decoder.
        reason: String,
    },

    /// Decoding failed partway through a file.
    #[error("Failed to decode frame {frame_index} of {path}: {reason}")]
    DecodeFrameError {
        /// The file being decoded.
        path: PathBuf,
        /// Number of frames successfully decoded before the failure.
        frame_index: u64,
        /// Underlying reason reported by the decoder.
        reason: String,
    },

    /// A decoded frame contained no samples.
    #[error("Frame {frame_index} of {path} has no samples")]
    EmptyFrameError {
        /// The file the frame came from. Empty when reducing a bare buffer.
        path: PathBuf,
        /// Index of the empty frame.
        frame_index: u64,
    },

    /// A percentile outside `0..=100` was requested.
    #[error("Percentile must be between 0 and 100, got {0}")]
    InvalidPercentile(i64),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// A series file could not be parsed back into values.
    #[error("Invalid value on line {line} of {path}: {reason}")]
    CsvParseError {
        /// File being read.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Parser message.
        reason: String,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while encoding a plot.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

/// Field-less discriminant of [`LightscanError`], used when reporting
/// per-file failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Path,
    DecodeOpen,
    DecodeFrame,
    EmptyFrame,
    InvalidPercentile,
    Cancelled,
    CsvParse,
    Io,
    Image,
}

impl ErrorKind {
    /// Stable lowercase name, used in CLI and JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Path => "path",
            ErrorKind::DecodeOpen => "decode-open",
            ErrorKind::DecodeFrame => "decode-frame",
            ErrorKind::EmptyFrame => "empty-frame",
            ErrorKind::InvalidPercentile => "invalid-percentile",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::CsvParse => "csv-parse",
            ErrorKind::Io => "io",
            ErrorKind::Image => "image",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl LightscanError {
    /// The kind of failure, without its context.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LightscanError::PathError { .. } => ErrorKind::Path,
            LightscanError::DecodeOpenError { .. } => ErrorKind::DecodeOpen,
            LightscanError::DecodeFrameError { .. } => ErrorKind::DecodeFrame,
            LightscanError::EmptyFrameError { .. } => ErrorKind::EmptyFrame,
            LightscanError::InvalidPercentile(_) => ErrorKind::InvalidPercentile,
            LightscanError::Cancelled => ErrorKind::Cancelled,
            LightscanError::CsvParseError { .. } => ErrorKind::CsvParse,
            LightscanError::IoError(_) => ErrorKind::Io,
            LightscanError::ImageError(_) => ErrorKind::Image,
        }
    }

    /// Frame index reached when the error occurred, for frame-level failures.
    pub fn frame_index(&self) -> Option<u64> {
        match self {
            LightscanError::DecodeFrameError { frame_index, .. }
            | LightscanError::EmptyFrameError { frame_index, .. } => Some(*frame_index),
            _ => None,
        }
    }

    /// Attach a file path and frame index to an [`EmptyFrameError`] raised
    /// by the reducer, which does not know where its buffer came from.
    ///
    /// [`EmptyFrameError`]: LightscanError::EmptyFrameError
    pub(crate) fn with_frame_context(self, path: &std::path::Path, index: u64) -> Self {
        match self {
            LightscanError::EmptyFrameError { .. } => LightscanError::EmptyFrameError {
                path: path.to_path_buf(),
                frame_index: index,
            },
            other => other,
        }
    }
}
