//! Line plot of a series, rendered to PNG.

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{ImageFormat, Rgb, RgbImage};

use super::font::{draw_text, put, text_height, text_width};
use super::{SeriesSink, output_file_name};
use crate::error::LightscanError;
use crate::series::FrameSeries;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);
const LINE: Rgb<u8> = Rgb([31, 119, 180]);

const TITLE_SCALE: u32 = 3;
const LABEL_SCALE: u32 = 2;
const TICK_LENGTH: i64 = 6;

const MARGIN_LEFT: u32 = 110;
const MARGIN_RIGHT: u32 = 40;
const MARGIN_TOP: u32 = 70;
const MARGIN_BOTTOM: u32 = 70;

/// Plots a series as value against frame number.
///
/// The title is the source label, the y axis is labelled with the
/// percentile, and the axes carry tick labels at the first and last frame
/// and at the smallest and largest value. Only the left and bottom axes are
/// drawn.
#[derive(Debug, Clone)]
pub struct PlotSink {
    directory: PathBuf,
    width: u32,
    height: u32,
}

impl PlotSink {
    /// Sink writing 1200x800 PNGs into `directory`, which is created if
    /// missing.
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
            width: 1200,
            height: 800,
        }
    }

    /// Set the image size. Each dimension is raised to leave room for the
    /// margins.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(MARGIN_LEFT + MARGIN_RIGHT + 2);
        self.height = height.max(MARGIN_TOP + MARGIN_BOTTOM + 2);
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Draw the plot in memory.
    pub fn render(&self, series: &FrameSeries) -> RgbImage {
        let mut image = RgbImage::from_pixel(self.width, self.height, BACKGROUND);
        let area = PlotArea {
            left: i64::from(MARGIN_LEFT),
            right: i64::from(self.width - MARGIN_RIGHT),
            top: i64::from(MARGIN_TOP),
            bottom: i64::from(self.height - MARGIN_BOTTOM),
        };

        self.draw_annotations(&mut image, series, &area);

        let values = series.values();
        if let Some(range) = series.value_range() {
            let range = padded(range);
            let points: Vec<(i64, i64)> = values
                .iter()
                .enumerate()
                .map(|(index, &value)| area.point(index, values.len(), value, range))
                .collect();

            if let [only] = points.as_slice() {
                for dx in -1..=1 {
                    for dy in -1..=1 {
                        put(&mut image, only.0 + dx, only.1 + dy, LINE);
                    }
                }
            }
            for pair in points.windows(2) {
                draw_line(&mut image, pair[0], pair[1], LINE);
            }
            draw_value_ticks(&mut image, &area, range);
        }

        // Axes last so the line never hides them.
        draw_line(&mut image, (area.left, area.top), (area.left, area.bottom), INK);
        draw_line(&mut image, (area.left, area.bottom), (area.right, area.bottom), INK);

        image
    }

    fn draw_annotations(&self, image: &mut RgbImage, series: &FrameSeries, area: &PlotArea) {
        let title = series.source().label();
        let title_x = (i64::from(self.width) - i64::from(text_width(title, TITLE_SCALE))) / 2;
        draw_text(image, title_x.max(4), 12, title, TITLE_SCALE, INK);

        let y_label = format!("{}TH PERCENTILE PIXEL INTENSITY (AU)", series.percentile());
        let y_label_top = area.top - i64::from(text_height(LABEL_SCALE)) - 12;
        draw_text(image, 8, y_label_top, &y_label, LABEL_SCALE, INK);

        let x_label = "FRAME NUMBER";
        let x_label_x = area.left + (area.right - area.left - i64::from(text_width(x_label, LABEL_SCALE))) / 2;
        let x_label_y = i64::from(self.height) - i64::from(text_height(LABEL_SCALE)) - 14;
        draw_text(image, x_label_x, x_label_y, x_label, LABEL_SCALE, INK);

        let tick_top = area.bottom + TICK_LENGTH + 4;
        let last_index = series.len().saturating_sub(1);
        for (index, x) in [(0, area.left), (last_index, area.right)] {
            draw_line(image, (x, area.bottom), (x, area.bottom + TICK_LENGTH), INK);
            let text = index.to_string();
            let centered = x - i64::from(text_width(&text, LABEL_SCALE)) / 2;
            draw_text(image, centered, tick_top, &text, LABEL_SCALE, INK);
        }
    }
}

impl SeriesSink for PlotSink {
    fn write(&self, series: &FrameSeries) -> Result<PathBuf, LightscanError> {
        fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(output_file_name(series, "png"));
        self.render(series).save_with_format(&path, ImageFormat::Png)?;
        log::debug!("Wrote plot {}", path.display());
        Ok(path)
    }
}

/// Pixel bounds of the data area; `bottom` and `right` are inclusive.
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: i64,
    right: i64,
    top: i64,
    bottom: i64,
}

impl PlotArea {
    /// Map frame `index` of `count` with `value` in `range` to a pixel.
    fn point(&self, index: usize, count: usize, value: f64, range: (f64, f64)) -> (i64, i64) {
        let width = (self.right - self.left) as f64;
        let height = (self.bottom - self.top) as f64;

        let x_fraction = if count > 1 {
            index as f64 / (count - 1) as f64
        } else {
            0.5
        };
        let (low, high) = range;
        let y_fraction = ((value - low) / (high - low)).clamp(0.0, 1.0);

        (
            self.left + (x_fraction * width).round() as i64,
            self.bottom - (y_fraction * height).round() as i64,
        )
    }
}

/// Widen a degenerate range so a flat series sits mid-plot.
fn padded((low, high): (f64, f64)) -> (f64, f64) {
    if high > low { (low, high) } else { (low - 1.0, high + 1.0) }
}

fn draw_value_ticks(image: &mut RgbImage, area: &PlotArea, (low, high): (f64, f64)) {
    let height = i64::from(text_height(LABEL_SCALE));
    for (value, y) in [(low, area.bottom), (high, area.top)] {
        draw_line(image, (area.left - TICK_LENGTH, y), (area.left, y), INK);
        let text = format_tick(value);
        let x = area.left - TICK_LENGTH - 4 - i64::from(text_width(&text, LABEL_SCALE));
        draw_text(image, x, y - height / 2, &text, LABEL_SCALE, INK);
    }
}

fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Bresenham line, clipped to the image.
fn draw_line(image: &mut RgbImage, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let step_x = if x0 < x1 { 1 } else { -1 };
    let step_y = if y0 < y1 { 1 } else { -1 };
    let mut error = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        put(image, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let doubled = 2 * error;
        if doubled >= dy {
            error += dy;
            x += step_x;
        }
        if doubled <= dx {
            error += dx;
            y += step_y;
        }
    }
}
