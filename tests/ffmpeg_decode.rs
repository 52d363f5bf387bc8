//! FFmpeg-backed decoding tests.
//!
//! Exact-value tests encode a small lossless clip into a temp dir first.
//! Tests that need a real video look for `tests/fixtures/sample_video.mp4`
//! (from `tests/fixtures/generate_fixtures.sh`) and skip when it is absent.

use std::{fs, path::Path};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational, codec, codec::context::Context as CodecContext,
    format::Pixel, frame::Video as VideoFrame,
};
use lightscan::{
    BatchOrchestrator, ErrorKind, FfmpegLogLevel, FfmpegSource, FrameSource, FrameStream,
    Percentile, PixelFormat, ScanOptions, SeriesBuilder, VideoFileRef,
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

const CLIP_SIDE: u32 = 10;

/// Samples 1..=100, one 10x10 GRAY8 picture.
fn ramp_picture() -> Vec<u8> {
    (1..=100).collect()
}

/// Encode `frame_count` copies of a packed GRAY8 picture as uncompressed
/// video, so decoding gives the samples back exactly.
fn write_gray_clip(
    path: &Path,
    width: u32,
    height: u32,
    picture: &[u8],
    frame_count: i64,
) -> Result<(), FfmpegError> {
    ffmpeg_next::init()?;
    lightscan::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    let time_base = Rational::new(1, 25);
    let mut output = ffmpeg_next::format::output(path)?;
    let codec =
        ffmpeg_next::encoder::find(codec::Id::RAWVIDEO).ok_or(FfmpegError::EncoderNotFound)?;
    let mut stream = output.add_stream(codec)?;
    let stream_index = stream.index();
    stream.set_time_base(time_base);

    let mut encoder = CodecContext::from_parameters(stream.parameters())?
        .encoder()
        .video()?;
    encoder.set_width(width);
    encoder.set_height(height);
    encoder.set_format(Pixel::GRAY8);
    encoder.set_time_base(time_base);
    encoder.set_frame_rate(Some(Rational::new(25, 1)));
    let mut encoder = encoder.open_as(codec)?;
    stream.set_parameters(&encoder);
    output.write_header()?;

    let stream_time_base = output
        .stream(stream_index)
        .ok_or(FfmpegError::StreamNotFound)?
        .time_base();
    let row = width as usize;

    for index in 0..frame_count {
        let mut frame = VideoFrame::new(Pixel::GRAY8, width, height);
        let stride = frame.stride(0);
        let data = frame.data_mut(0);
        for (y, samples) in picture.chunks_exact(row).enumerate() {
            data[y * stride..y * stride + row].copy_from_slice(samples);
        }
        frame.set_pts(Some(index));
        encoder.send_frame(&frame)?;

        let mut packet = Packet::empty();
        while encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(stream_index);
            packet.rescale_ts(time_base, stream_time_base);
            packet.write_interleaved(&mut output)?;
        }
    }

    encoder.send_eof()?;
    let mut packet = Packet::empty();
    while encoder.receive_packet(&mut packet).is_ok() {
        packet.set_stream(stream_index);
        packet.rescale_ts(time_base, stream_time_base);
        packet.write_interleaved(&mut output)?;
    }

    output.write_trailer()
}

/// Three-frame ramp clip inside `directory`.
fn ramp_clip(directory: &Path) -> VideoFileRef {
    let path = directory.join("ramp.nut");
    write_gray_clip(&path, CLIP_SIDE, CLIP_SIDE, &ramp_picture(), 3)
        .expect("Failed to encode clip");
    VideoFileRef::new(path)
}

// ── Encoded clip ─────────────────────────────────────────────────

#[test]
fn gray_clip_decodes_exact_samples() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let video = ramp_clip(directory.path());

    let frames: Vec<_> = FfmpegSource::new(PixelFormat::Gray8)
        .open(&video)
        .expect("Failed to open clip")
        .collect::<Result<_, _>>()
        .expect("every frame decodes");

    assert_eq!(frames.len(), 3);
    for frame in &frames {
        assert_eq!((frame.width(), frame.height(), frame.channels()), (10, 10, 1));
        // Row padding from the decoder must not leak into the samples.
        assert_eq!(frame.samples(), ramp_picture().as_slice());
    }
}

#[test]
fn gray_clip_series_matches_known_percentile() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let video = ramp_clip(directory.path());

    let options = ScanOptions::new().with_pixel_format(PixelFormat::Gray8);
    let source = FfmpegSource::from_options(&options);
    let series = SeriesBuilder::new(&source, &options)
        .build(&video)
        .expect("Failed to build series");

    // numpy.percentile(np.arange(1, 101), 95) == 95.05
    assert_eq!(series.len(), 3);
    for value in series.values() {
        assert!((value - 95.05).abs() < 1e-9, "got {value}");
    }
}

#[test]
fn gray_clip_converts_to_rgb() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let video = ramp_clip(directory.path());

    let mut frames = FfmpegSource::new(PixelFormat::Rgb8)
        .open(&video)
        .expect("Failed to open clip");
    let frame = frames.next().expect("a frame").expect("frame decodes");
    assert_eq!(frame.channels(), 3);
    assert_eq!(frame.samples().len(), 300);
    assert_eq!(frames.count(), 2);
}

// ── Invalid input ────────────────────────────────────────────────

#[test]
fn garbage_file_fails_to_open() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = directory.path().join("garbage.mp4");
    fs::write(&path, b"this is not a video container at all").expect("write");

    let result = FfmpegSource::default().open(&VideoFileRef::new(&path));
    match result {
        Err(error) => assert_eq!(error.kind(), ErrorKind::DecodeOpen),
        Ok(_) => panic!("garbage should not open"),
    }
}

#[test]
fn batch_continues_past_undecodable_files() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(directory.path().join("a.mp4"), b"").expect("write");
    fs::write(directory.path().join("b.mp4"), b"\x00\x01\x02\x03").expect("write");

    let result = BatchOrchestrator::new(ScanOptions::new())
        .run(directory.path())
        .expect("run");

    assert_eq!(result.len(), 2);
    assert_eq!(result.failed_count(), 2);
    for failure in result.failures() {
        assert_eq!(failure.error().kind(), ErrorKind::DecodeOpen);
    }
}

// ── Fixture video ────────────────────────────────────────────────

#[test]
fn decodes_fixture_frames() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let video = VideoFileRef::new(path);
    let mut frames = FfmpegSource::new(PixelFormat::Rgb8)
        .open(&video)
        .expect("Failed to open fixture");
    let estimate = frames.estimated_frames();

    let first = frames
        .next()
        .expect("at least one frame")
        .expect("first frame decodes");
    assert_eq!(first.channels(), 3);
    assert_eq!(
        first.samples().len(),
        first.width() as usize * first.height() as usize * 3
    );

    if let Some(estimate) = estimate {
        assert!(estimate > 0);
    }

    for frame in frames {
        let frame = frame.expect("frame decodes");
        assert_eq!((frame.width(), frame.height()), (first.width(), first.height()));
        assert_eq!(frame.samples().len(), first.samples().len());
    }
}

#[test]
fn fixture_series_matches_frame_count() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let video = VideoFileRef::new(path);
    let source = FfmpegSource::new(PixelFormat::Gray8);
    let frame_count = source.open(&video).expect("open").count();

    let options = ScanOptions::new().with_percentile(Percentile::MEDIAN);
    let series = SeriesBuilder::new(&source, &options)
        .build(&video)
        .expect("Failed to build series");

    assert_eq!(series.len(), frame_count);
    assert!(series.values().iter().all(|value| (0.0..=255.0).contains(value)));
}

#[test]
fn fixture_maximum_dominates_minimum() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let video = VideoFileRef::new(path);
    let source = FfmpegSource::default();
    let build = |percentile| {
        let options = ScanOptions::new().with_percentile(percentile);
        SeriesBuilder::new(&source, &options)
            .build(&video)
            .expect("Failed to build series")
    };

    let low = build(Percentile::MIN);
    let high = build(Percentile::MAX);
    assert_eq!(low.len(), high.len());
    for (low, high) in low.values().iter().zip(high.values()) {
        assert!(low <= high);
    }
}
