//! Pixel-aligned color strip rendering
//!
//! A spectrum strip is a horizontal band under a chart whose color at each
//! pixel column is the visible color of the wavelength plotted directly
//! above it, darkened where that wavelength is absorbed.
//!
//! # Coordinate Spaces
//!
//! - **Value space**: wavelengths in nanometers
//! - **Layout space**: chart pixels as laid out, before device scaling
//! - **Device space**: backing-store pixels, layout × device pixel ratio
//!
//! Callers describe where wavelengths land through an [`AxisMapping`] taken
//! from the already laid-out chart, and draw in layout pixels. The
//! [`LayoutCanvas`] scales to device pixels exactly once, when rasterizing.

use image::{Rgba, RgbaImage};
use log::warn;

use crate::photometry::color::{wavelength_to_color, wavelength_to_perceptual_rgb};

/// Opacity of the rainbow drawn behind spectrum charts
pub const BACKGROUND_ALPHA: f64 = 0.85;

/// Exponent applied to mean intensity when darkening strip colors
pub const STRIP_GAMMA: f64 = 1.5;

/// Narrowest span drawn for one sample pair, before the 1 px overlap
pub const MIN_SPAN_WIDTH: f64 = 0.5;

/// Bidirectional map between data values and layout pixels along one axis.
pub trait AxisMapping {
    /// Layout pixel at which `value` is drawn
    fn pixel_for_value(&self, value: f64) -> f64;

    /// Data value drawn at layout pixel `pixel`
    fn value_for_pixel(&self, pixel: f64) -> f64;
}

/// Linear axis between two values and two pixel positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearAxis {
    value_start: f64,
    value_end: f64,
    pixel_start: f64,
    pixel_end: f64,
}

impl LinearAxis {
    /// Create an axis drawing `value_range.0` at `pixel_range.0` and
    /// `value_range.1` at `pixel_range.1`.
    pub fn new(value_range: (f64, f64), pixel_range: (f64, f64)) -> Self {
        Self {
            value_start: value_range.0,
            value_end: value_range.1,
            pixel_start: pixel_range.0,
            pixel_end: pixel_range.1,
        }
    }
}

impl AxisMapping for LinearAxis {
    fn pixel_for_value(&self, value: f64) -> f64 {
        let span = self.value_end - self.value_start;
        if span == 0.0 {
            return self.pixel_start;
        }
        self.pixel_start + (value - self.value_start) / span * (self.pixel_end - self.pixel_start)
    }

    fn value_for_pixel(&self, pixel: f64) -> f64 {
        let span = self.pixel_end - self.pixel_start;
        if span == 0.0 {
            return self.value_start;
        }
        self.value_start + (pixel - self.pixel_start) / span * (self.value_end - self.value_start)
    }
}

/// A rectangle in layout pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// RGBA raster addressed in layout pixels and stored at device resolution.
#[derive(Debug, Clone)]
pub struct LayoutCanvas {
    layout_width: f64,
    layout_height: f64,
    device_pixel_ratio: f64,
    backing: RgbaImage,
}

impl LayoutCanvas {
    /// Create a transparent canvas.
    ///
    /// # Arguments
    /// * `layout_width` - Width in layout pixels
    /// * `layout_height` - Height in layout pixels
    /// * `device_pixel_ratio` - Device pixels per layout pixel; non-finite or
    ///   non-positive ratios fall back to 1
    pub fn new(layout_width: u32, layout_height: u32, device_pixel_ratio: f64) -> Self {
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            warn!(
                "Invalid device pixel ratio {}, rendering at 1x",
                device_pixel_ratio
            );
            1.0
        };

        let device_width = (layout_width as f64 * dpr).round() as u32;
        let device_height = (layout_height as f64 * dpr).round() as u32;

        Self {
            layout_width: layout_width as f64,
            layout_height: layout_height as f64,
            device_pixel_ratio: dpr,
            backing: RgbaImage::new(device_width, device_height),
        }
    }

    pub fn layout_width(&self) -> f64 {
        self.layout_width
    }

    pub fn layout_height(&self) -> f64 {
        self.layout_height
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// The device-resolution raster
    pub fn image(&self) -> &RgbaImage {
        &self.backing
    }

    pub fn into_image(self) -> RgbaImage {
        self.backing
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        for pixel in self.backing.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    /// Composite `color` over a rectangle given in layout pixels.
    ///
    /// Device pixels partially covered by the rectangle are blended in
    /// proportion to their coverage.
    pub fn fill_rect(&mut self, rect: LayoutRect, color: Rgba<u8>) {
        if !(rect.width > 0.0 && rect.height > 0.0) {
            return;
        }
        let dpr = self.device_pixel_ratio;
        let x0 = (rect.left * dpr).max(0.0);
        let x1 = (rect.right() * dpr).min(self.backing.width() as f64);
        let y0 = (rect.top * dpr).max(0.0);
        let y1 = ((rect.top + rect.height) * dpr).min(self.backing.height() as f64);
        if !(x0 < x1 && y0 < y1) {
            return;
        }

        let alpha = color.0[3] as f64 / 255.0;
        for py in (y0.floor() as u32)..(y1.ceil() as u32) {
            let cover_y = (y1.min(py as f64 + 1.0) - y0.max(py as f64)).clamp(0.0, 1.0);
            for px in (x0.floor() as u32)..(x1.ceil() as u32) {
                let cover_x = (x1.min(px as f64 + 1.0) - x0.max(px as f64)).clamp(0.0, 1.0);
                let dst = self.backing.get_pixel_mut(px, py);
                *dst = source_over(*dst, color, alpha * cover_x * cover_y);
            }
        }
    }
}

/// Porter-Duff source-over of `src` (with effective opacity `alpha`) onto `dst`.
fn source_over(dst: Rgba<u8>, src: Rgba<u8>, alpha: f64) -> Rgba<u8> {
    if alpha <= 0.0 {
        return dst;
    }
    let dst_alpha = dst.0[3] as f64 / 255.0;
    let out_alpha = alpha + dst_alpha * (1.0 - alpha);
    if out_alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |i: usize| {
        let blended =
            (src.0[i] as f64 * alpha + dst.0[i] as f64 * dst_alpha * (1.0 - alpha)) / out_alpha;
        blended.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_alpha * 255.0).round() as u8,
    ])
}

/// Strip color for a wavelength at a given mean intensity.
///
/// The perceptual color of `wavelength_nm` with each channel scaled by
/// `intensity^1.5` and floored. Negative intensity renders black.
pub fn strip_color(wavelength_nm: f64, intensity: f64) -> [u8; 3] {
    let factor = intensity.max(0.0).powf(STRIP_GAMMA);
    let base = wavelength_to_perceptual_rgb(wavelength_nm);
    base.map(|c| (c as f64 * factor).floor().min(255.0) as u8)
}

/// Render a pixel-aligned absorption strip.
///
/// The canvas is cleared first. Each adjacent sample pair `(i, i + 1)` fills
/// the full canvas height from `pixel(λᵢ)` across `max(pixel(λᵢ₊₁) −
/// pixel(λᵢ), 0.5) + 1` layout pixels, colored by [`strip_color`] at `λᵢ` and
/// the mean of the pair's intensities. Spans starting outside
/// `[0, layout width]` are skipped.
///
/// # Arguments
/// * `canvas` - Target canvas, sized to the chart's layout width
/// * `axis` - The chart's wavelength axis mapping
/// * `wavelengths` - Sample wavelengths, increasing
/// * `intensities` - Parallel normalized intensities
///
/// # Returns
/// Number of spans drawn
pub fn render_strip(
    canvas: &mut LayoutCanvas,
    axis: &dyn AxisMapping,
    wavelengths: &[f64],
    intensities: &[f64],
) -> usize {
    canvas.clear();

    if wavelengths.len() != intensities.len() {
        warn!(
            "Strip inputs differ in length ({} wavelengths, {} intensities), truncating",
            wavelengths.len(),
            intensities.len()
        );
    }
    let n = wavelengths.len().min(intensities.len());
    let width = canvas.layout_width();
    let height = canvas.layout_height();

    let mut drawn = 0;
    for i in 0..n.saturating_sub(1) {
        let start = axis.pixel_for_value(wavelengths[i]);
        let end = axis.pixel_for_value(wavelengths[i + 1]);
        if !start.is_finite() || !end.is_finite() {
            warn!("Axis mapped {} nm to a non-finite pixel", wavelengths[i]);
            continue;
        }
        if start < 0.0 || start > width {
            continue;
        }

        let intensity = (intensities[i] + intensities[i + 1]) / 2.0;
        let [r, g, b] = strip_color(wavelengths[i], intensity);
        let span = (end - start).max(MIN_SPAN_WIDTH) + 1.0;
        canvas.fill_rect(
            LayoutRect::new(start, 0.0, span, height),
            Rgba([r, g, b, 255]),
        );
        drawn += 1;
    }

    drawn
}

/// Vivid background columns for a pixel interval of a chart.
///
/// One entry per whole layout pixel `x` in `[pixel_start, pixel_end)` whose
/// wavelength lies in 380–780 nm, paired with its color at `alpha`.
pub fn background_columns(
    axis: &dyn AxisMapping,
    pixel_start: i32,
    pixel_end: i32,
    alpha: f64,
) -> Vec<(i32, crate::photometry::color::Rgba)> {
    (pixel_start..pixel_end)
        .filter_map(|x| {
            let wavelength = axis.value_for_pixel(x as f64);
            (380.0..=780.0)
                .contains(&wavelength)
                .then(|| (x, wavelength_to_color(wavelength, alpha)))
        })
        .collect()
}

/// Paint the visible rainbow behind a chart's plot area.
///
/// Columns are one layout pixel wide, span the full height of `plot_area` and
/// are composited over whatever the canvas already holds.
///
/// # Returns
/// Number of columns painted
pub fn render_spectrum_background(
    canvas: &mut LayoutCanvas,
    axis: &dyn AxisMapping,
    plot_area: LayoutRect,
    alpha: f64,
) -> usize {
    let columns = background_columns(
        axis,
        plot_area.left.floor() as i32,
        plot_area.right().ceil() as i32,
        alpha,
    );
    for (x, color) in &columns {
        canvas.fill_rect(
            LayoutRect::new(*x as f64, plot_area.top, 1.0, plot_area.height),
            color.to_pixel(),
        );
    }
    columns.len()
}
