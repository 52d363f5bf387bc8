//! Lazy, pull-based frame decoding.
//!
//! A [`FrameSource`] opens one video and returns a [`FrameStream`]: a
//! finite, forward-only [`Iterator`] of decoded [`Frame`]s. Each call to
//! [`next()`](Iterator::next) reads and decodes just enough packets to
//! produce the next frame, so memory stays bounded however long the video
//! is. Dropping the stream early releases the demuxer and decoder.
//!
//! [`FfmpegSource`] is the production implementation, built on
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next).
//!
//! # Example
//!
//! ```no_run
//! use lightscan::{FfmpegSource, FrameSource, PixelFormat, VideoFileRef};
//!
//! let source = FfmpegSource::new(PixelFormat::Gray8);
//! let frames = source.open(&VideoFileRef::new("input.mp4"))?;
//!
//! // Only the first ten frames are decoded.
//! for frame in frames.take(10) {
//!     let frame = frame?;
//!     println!("{}x{}", frame.width(), frame.height());
//! }
//! # Ok::<(), lightscan::LightscanError>(())
//! ```

use std::path::PathBuf;

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};

use crate::configuration::{PixelFormat, ScanOptions};
use crate::discovery::VideoFileRef;
use crate::error::LightscanError;
use crate::frame::Frame;

/// A lazy sequence of decoded frames from one video.
///
/// Implementations yield frames in presentation order. Open failures are
/// reported by [`FrameSource::open`]; a failure while decoding is yielded as
/// [`LightscanError::DecodeFrameError`] with the index of the frame that
/// could not be produced, after which the stream yields `None`.
pub trait FrameStream: Iterator<Item = Result<Frame, LightscanError>> {
    /// Expected number of frames, when the container records it. Only used
    /// for progress reporting; the actual count may differ.
    fn estimated_frames(&self) -> Option<u64> {
        None
    }
}

/// Opens videos for frame-by-frame decoding.
pub trait FrameSource {
    /// The stream type produced for one video.
    type Frames: FrameStream;

    /// Open `video` and position the stream before its first frame.
    ///
    /// # Errors
    ///
    /// Returns [`LightscanError::DecodeOpenError`] if the file is missing,
    /// corrupt, has no video stream, or uses an unsupported codec.
    fn open(&self, video: &VideoFileRef) -> Result<Self::Frames, LightscanError>;
}

/// Decodes videos with FFmpeg, converting every frame to a fixed
/// [`PixelFormat`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegSource {
    pixel_format: PixelFormat,
}

impl FfmpegSource {
    pub fn new(pixel_format: PixelFormat) -> Self {
        Self { pixel_format }
    }

    /// Decoder matching the pixel format in `options`.
    pub fn from_options(options: &ScanOptions) -> Self {
        Self::new(options.pixel_format())
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }
}

impl FrameSource for FfmpegSource {
    type Frames = FfmpegFrames;

    fn open(&self, video: &VideoFileRef) -> Result<FfmpegFrames, LightscanError> {
        let path = video.path().to_path_buf();
        let open_error = |reason: String| LightscanError::DecodeOpenError {
            path: path.clone(),
            reason,
        };

        log::debug!("Opening video for decoding: {}", path.display());

        // Initialise ffmpeg (safe to call multiple times).
        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input = ffmpeg_next::format::input(video.path())
            .map_err(|error| open_error(error.to_string()))?;

        let (video_stream_index, estimated_frames, decoder) = {
            let stream = input
                .streams()
                .best(Type::Video)
                .ok_or_else(|| open_error("no video stream found".to_string()))?;
            let decoder_context = CodecContext::from_parameters(stream.parameters())
                .map_err(|error| open_error(format!("failed to read codec parameters: {error}")))?;
            let decoder = decoder_context
                .decoder()
                .video()
                .map_err(|error| open_error(format!("failed to create video decoder: {error}")))?;
            let estimated_frames = u64::try_from(stream.frames()).ok().filter(|&count| count > 0);
            (stream.index(), estimated_frames, decoder)
        };

        Ok(FfmpegFrames {
            path,
            input,
            decoder,
            scaler: None,
            video_stream_index,
            pixel_format: self.pixel_format,
            estimated_frames,
            decoded_frame: VideoFrame::empty(),
            converted_frame: VideoFrame::empty(),
            frames_yielded: 0,
            eof_sent: false,
            done: false,
        })
    }
}

/// Frame stream over one file decoded by FFmpeg.
///
/// Owns the demuxer, decoder and scaler; all of them are freed when the
/// stream is dropped, whether or not it was read to the end.
pub struct FfmpegFrames {
    path: PathBuf,
    input: Input,
    decoder: VideoDecoder,
    /// Built from the first decoded frame, rebuilt if the frame geometry
    /// changes mid-stream.
    scaler: Option<ScalingContext>,
    video_stream_index: usize,
    pixel_format: PixelFormat,
    estimated_frames: Option<u64>,
    decoded_frame: VideoFrame,
    converted_frame: VideoFrame,
    frames_yielded: u64,
    eof_sent: bool,
    done: bool,
}

impl FfmpegFrames {
    fn frame_error(&self, reason: String) -> LightscanError {
        LightscanError::DecodeFrameError {
            path: self.path.clone(),
            frame_index: self.frames_yielded,
            reason,
        }
    }

    /// Convert the current `decoded_frame` to the output pixel format and
    /// copy it out without row padding.
    fn convert_current_frame(&mut self) -> Result<Frame, LightscanError> {
        let width = self.decoded_frame.width();
        let height = self.decoded_frame.height();
        let format = self.decoded_frame.format();

        if format == Pixel::None || width == 0 || height == 0 {
            return Err(self.frame_error("decoder produced an empty picture".to_string()));
        }

        let stale = self.scaler.as_ref().is_none_or(|scaler| {
            let input = scaler.input();
            input.format != format || input.width != width || input.height != height
        });
        if stale {
            let scaler = ScalingContext::get(
                format,
                width,
                height,
                self.pixel_format.to_ffmpeg_pixel(),
                width,
                height,
                ScalingFlags::BILINEAR,
            )
            .map_err(|error| self.frame_error(format!("failed to create scaler: {error}")))?;
            self.scaler = Some(scaler);
            self.converted_frame = VideoFrame::empty();
        }

        let scaler = match self.scaler.as_mut() {
            Some(scaler) => scaler,
            None => return Err(self.frame_error("scaler unavailable".to_string())),
        };
        if let Err(error) = scaler.run(&self.decoded_frame, &mut self.converted_frame) {
            return Err(self.frame_error(format!("pixel conversion failed: {error}")));
        }

        let channels = self.pixel_format.channels();
        let samples = crate::utilities::frame_to_buffer(
            &self.converted_frame,
            width,
            height,
            channels as usize,
        );

        Frame::new(width, height, channels, samples)
            .ok_or_else(|| self.frame_error("converted frame has unexpected size".to_string()))
    }
}

/// Outcome of one `receive_frame` call.
#[derive(Debug, PartialEq)]
enum Receive {
    Frame,
    /// The decoder wants another packet (`EAGAIN`).
    NeedsInput,
    /// End of stream after `send_eof`.
    Drained,
    Failed(FfmpegError),
}

impl Receive {
    fn classify(result: Result<(), FfmpegError>) -> Self {
        match result {
            Ok(()) => Self::Frame,
            Err(FfmpegError::Other { errno }) if errno == ffmpeg_next::error::EAGAIN => {
                Self::NeedsInput
            }
            Err(FfmpegError::Eof) => Self::Drained,
            Err(error) => Self::Failed(error),
        }
    }
}

impl FrameStream for FfmpegFrames {
    fn estimated_frames(&self) -> Option<u64> {
        self.estimated_frames
    }
}

impl Iterator for FfmpegFrames {
    type Item = Result<Frame, LightscanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            // Try to receive a frame the decoder has already produced.
            match Receive::classify(self.decoder.receive_frame(&mut self.decoded_frame)) {
                Receive::Frame => {
                    return match self.convert_current_frame() {
                        Ok(frame) => {
                            self.frames_yielded += 1;
                            Some(Ok(frame))
                        }
                        Err(error) => {
                            self.done = true;
                            Some(Err(error))
                        }
                    };
                }
                Receive::NeedsInput if !self.eof_sent => {}
                Receive::NeedsInput | Receive::Drained => {
                    self.done = true;
                    log::debug!(
                        "Decoded {} frame(s) from {}",
                        self.frames_yielded,
                        self.path.display()
                    );
                    return None;
                }
                Receive::Failed(error) => {
                    self.done = true;
                    return Some(Err(self.frame_error(format!("failed to decode frame: {error}"))));
                }
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() != self.video_stream_index {
                        continue;
                    }
                    if let Err(error) = self.decoder.send_packet(&packet) {
                        self.done = true;
                        return Some(Err(self.frame_error(error.to_string())));
                    }
                }
                Err(FfmpegError::Eof) => {
                    if let Err(error) = self.decoder.send_eof() {
                        self.done = true;
                        return Some(Err(self.frame_error(error.to_string())));
                    }
                    self.eof_sent = true;
                }
                Err(error) => {
                    self.done = true;
                    return Some(Err(self.frame_error(format!("failed to read packet: {error}"))));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receive_ok_is_a_frame() {
        assert_eq!(Receive::classify(Ok(())), Receive::Frame);
    }

    #[test]
    fn receive_eagain_needs_input() {
        let result = Err(FfmpegError::Other { errno: ffmpeg_next::error::EAGAIN });
        assert_eq!(Receive::classify(result), Receive::NeedsInput);
    }

    #[test]
    fn receive_eof_is_drained() {
        assert_eq!(Receive::classify(Err(FfmpegError::Eof)), Receive::Drained);
    }

    #[test]
    fn receive_decode_failure_is_reported() {
        assert_eq!(
            Receive::classify(Err(FfmpegError::InvalidData)),
            Receive::Failed(FfmpegError::InvalidData)
        );
        let result = Err(FfmpegError::Other { errno: ffmpeg_next::error::ENOMEM });
        assert!(matches!(Receive::classify(result), Receive::Failed(_)));
    }
}
