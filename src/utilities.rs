//! Internal utility functions.

use ffmpeg_next::frame::Video as VideoFrame;

/// Copy the first plane of an FFmpeg video frame into a tightly-packed
/// buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × bytes
/// per pixel). The padding would otherwise be counted as samples.
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let data = video_frame.data(0);
    packed_rows(data, stride, width as usize * bytes_per_pixel, height as usize)
}

/// Strip row padding from a plane of `rows` rows spaced `stride` bytes apart.
fn packed_rows(data: &[u8], stride: usize, row_bytes: usize, rows: usize) -> Vec<u8> {
    if stride == row_bytes {
        data[..row_bytes * rows].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * rows);
        for row in 0..rows {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_bytes]);
        }
        buffer
    }
}
