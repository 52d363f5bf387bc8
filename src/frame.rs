//! Decoded frame buffers.

/// One decoded image as a tightly packed buffer of 8-bit samples.
///
/// Samples are row-major and interleaved by channel with no row padding, so
/// `samples.len() == width * height * channels`. A frame is handed straight
/// from the decoder to the reducer and dropped; series building never holds
/// more than one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    channels: u8,
    samples: Vec<u8>,
}

impl Frame {
    /// Wrap a packed sample buffer.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn new(width: u32, height: u32, channels: u8, samples: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(channels as usize)?;
        (samples.len() == expected).then_some(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    /// Single-channel frame of `samples.len()` x 1 pixels.
    ///
    /// Returns `None` if there are more samples than a `u32` width can hold.
    pub fn from_samples(samples: Vec<u8>) -> Option<Self> {
        let width = row_width(samples.len())?;
        Some(Self {
            width,
            height: 1,
            channels: 1,
            samples,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// All samples, flattened across rows and channels.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn row_width(len: usize) -> Option<u32> {
    u32::try_from(len).ok()
}
