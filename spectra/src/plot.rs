//! Chart rendering for spectrum figures
//!
//! Builds the PNG figures the command line tools write: a plotters line chart
//! over a vivid rainbow background, vertical reference markers, and the
//! pixel-aligned absorption strip stacked underneath.
//!
//! Charts are rasterized directly at device resolution into an in-memory RGB
//! buffer. The wavelength axis of the finished chart is read back from
//! plotters and handed to the strip renderer, so every strip column sits under
//! the wavelength it represents.

use std::error::Error;

use image::{Rgb, RgbImage, RgbaImage};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::image_proc::strip::{
    background_columns, render_strip, AxisMapping, LayoutCanvas, LinearAxis, BACKGROUND_ALPHA,
};
use crate::photometry::color::{parse_hex_color, ClassMarker, ColorError, SpectralClass};
use crate::photometry::lines::LineMarker;
use crate::photometry::spectrum::SampledSpectrum;

/// A wavelength-by-value chart drawn into an in-memory bitmap
pub type SpectrumChart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Convert a `#rrggbb` display color to a plotters color.
pub fn hex_to_rgb_color(hex: &str) -> Result<RGBColor, ColorError> {
    let [r, g, b] = parse_hex_color(hex)?;
    Ok(RGBColor(r, g, b))
}

/// Plotters color of a spectral class label
pub fn class_color(class: SpectralClass) -> RGBColor {
    let [r, g, b] = class.display_color();
    RGBColor(r, g, b)
}

/// Figure dimensions in layout pixels plus the device scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureLayout {
    pub width: u32,
    pub chart_height: u32,
    pub strip_height: u32,
    pub device_pixel_ratio: f64,
}

impl Default for FigureLayout {
    fn default() -> Self {
        Self {
            width: 1024,
            chart_height: 560,
            strip_height: 48,
            device_pixel_ratio: 1.0,
        }
    }
}

impl FigureLayout {
    /// Device pixel size of a region `layout_height` tall and full width
    pub fn device_size(&self, layout_height: u32) -> (u32, u32) {
        (
            (self.width as f64 * self.device_pixel_ratio).round() as u32,
            (layout_height as f64 * self.device_pixel_ratio).round() as u32,
        )
    }

    /// Scale a layout length to device pixels
    fn px(&self, layout: f64) -> i32 {
        (layout * self.device_pixel_ratio).round() as i32
    }

    fn font(&self, layout_size: f64) -> f64 {
        layout_size * self.device_pixel_ratio
    }
}

/// A labeled vertical line across the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLine {
    pub wavelength_nm: f64,
    pub color: RGBColor,
    pub label: String,
}

impl MarkerLine {
    /// Markers for catalog lines, labeled with their feature name.
    pub fn from_line_markers(markers: &[LineMarker]) -> Result<Vec<MarkerLine>, ColorError> {
        markers
            .iter()
            .map(|m| {
                Ok(MarkerLine {
                    wavelength_nm: m.wavelength_nm,
                    color: hex_to_rgb_color(&m.display_color)?,
                    label: m.feature.clone(),
                })
            })
            .collect()
    }

    /// Markers for spectral class peaks, labeled with the class letter.
    pub fn from_class_markers(markers: &[ClassMarker]) -> Vec<MarkerLine> {
        markers
            .iter()
            .map(|m| MarkerLine {
                wavelength_nm: m.wavelength_nm,
                color: class_color(m.class),
                label: m.class.to_string(),
            })
            .collect()
    }
}

/// One curve on a spectrum chart
pub struct ChartSeries<'s> {
    pub spectrum: &'s SampledSpectrum,
    pub color: RGBColor,
    pub label: String,
}

/// Everything drawn on one spectrum chart.
pub struct SpectrumChartSpec<'s> {
    pub title: String,
    /// Wavelength window in nanometers
    pub window: (f64, f64),
    pub y_max: f64,
    pub y_desc: String,
    pub series: Vec<ChartSeries<'s>>,
    pub markers: Vec<MarkerLine>,
    /// Paint the visible rainbow behind the plot area
    pub rainbow: bool,
}

/// Layout-space wavelength axis of a built chart.
///
/// Reads back where plotters placed the two ends of the x range and divides
/// by the device pixel ratio.
pub fn chart_axis(chart: &SpectrumChart<'_, '_>, device_pixel_ratio: f64) -> LinearAxis {
    let x_range = chart.x_range();
    let y = chart.y_range().start;
    let (start_px, _) = chart.backend_coord(&(x_range.start, y));
    let (end_px, _) = chart.backend_coord(&(x_range.end, y));
    LinearAxis::new(
        (x_range.start, x_range.end),
        (
            start_px as f64 / device_pixel_ratio,
            end_px as f64 / device_pixel_ratio,
        ),
    )
}

/// Paint one-pixel rainbow columns behind the chart's plot area.
///
/// Must run before the mesh and series so they draw on top. Works on charts
/// built on any sub-area of a figure.
///
/// # Returns
/// Number of columns painted
pub fn draw_spectrum_background(
    chart: &SpectrumChart<'_, '_>,
    alpha: f64,
) -> Result<usize, Box<dyn Error>> {
    let device_axis = chart_axis(chart, 1.0);
    let plot_area = chart.plotting_area();
    let (x_pixels, y_pixels) = plot_area.get_pixel_range();
    let columns = background_columns(&device_axis, x_pixels.start, x_pixels.end, alpha);

    // Shift coordinates are relative to the plot area's top-left corner
    let canvas = plot_area.strip_coord_spec();
    let height = y_pixels.end - y_pixels.start;
    for (x, color) in &columns {
        let left = x - x_pixels.start;
        canvas.draw(&Rectangle::new(
            [(left, 0), (left + 1, height)],
            RGBColor(color.r, color.g, color.b)
                .mix(color.alpha)
                .filled(),
        ))?;
    }

    Ok(columns.len())
}

/// Render a spectrum chart at device resolution.
///
/// # Returns
/// The chart bitmap and its layout-space wavelength axis
pub fn render_spectrum_chart(
    spec: &SpectrumChartSpec<'_>,
    layout: &FigureLayout,
) -> Result<(RgbImage, LinearAxis), Box<dyn Error>> {
    let (width, height) = layout.device_size(layout.chart_height);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];

    let axis = {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&BLACK)?;

        let (min_nm, max_nm) = spec.window;
        let mut chart = ChartBuilder::on(&root)
            .caption(
                &spec.title,
                ("sans-serif", layout.font(24.0)).into_font().color(&WHITE),
            )
            .margin(layout.px(10.0))
            .x_label_area_size(layout.px(40.0))
            .y_label_area_size(layout.px(60.0))
            .build_cartesian_2d(min_nm..max_nm, 0.0f64..spec.y_max)?;

        if spec.rainbow {
            let painted = draw_spectrum_background(&chart, BACKGROUND_ALPHA)?;
            log::debug!("Painted {} background columns", painted);
        }

        chart
            .configure_mesh()
            .x_label_formatter(&|x| format!("{}", *x as i32))
            .y_label_formatter(&|y| format!("{:.1}", y))
            .axis_desc_style(("sans-serif", layout.font(16.0)).into_font().color(&WHITE))
            .label_style(("sans-serif", layout.font(13.0)).into_font().color(&WHITE))
            .x_desc("Wavelength (nm)")
            .y_desc(spec.y_desc.as_str())
            .light_line_style(WHITE.mix(0.15))
            .bold_line_style(WHITE.mix(0.3))
            .draw()?;

        let line_width = layout.px(2.0).max(1) as u32;
        for series in &spec.series {
            let color = series.color;
            chart
                .draw_series(LineSeries::new(
                    series.spectrum.points(),
                    color.stroke_width(line_width),
                ))?
                .label(series.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        let label_offset = (max_nm - min_nm) * 0.004;
        for marker in spec
            .markers
            .iter()
            .filter(|m| m.wavelength_nm >= min_nm && m.wavelength_nm <= max_nm)
        {
            chart.draw_series(LineSeries::new(
                vec![(marker.wavelength_nm, 0.0), (marker.wavelength_nm, spec.y_max)],
                marker.color.mix(0.8).stroke_width(1),
            ))?;
            chart.draw_series(std::iter::once(Text::new(
                marker.label.clone(),
                (marker.wavelength_nm + label_offset, spec.y_max * 0.97),
                ("sans-serif", layout.font(12.0))
                    .into_font()
                    .color(&marker.color),
            )))?;
        }

        if !spec.series.is_empty() {
            chart
                .configure_series_labels()
                .background_style(BLACK.mix(0.7))
                .border_style(WHITE)
                .label_font(("sans-serif", layout.font(13.0)).into_font().color(&WHITE))
                .position(SeriesLabelPosition::UpperRight)
                .draw()?;
        }

        let axis = chart_axis(&chart, layout.device_pixel_ratio);
        root.present()?;
        axis
    };

    let image = RgbImage::from_raw(width, height, buffer)
        .ok_or("chart buffer does not match its dimensions")?;
    Ok((image, axis))
}

/// Render the absorption strip for a chart's axis.
pub fn render_strip_image(
    axis: &dyn AxisMapping,
    layout: &FigureLayout,
    wavelengths: &[f64],
    intensities: &[f64],
) -> RgbaImage {
    let mut canvas = LayoutCanvas::new(layout.width, layout.strip_height, layout.device_pixel_ratio);
    let drawn = render_strip(&mut canvas, axis, wavelengths, intensities);
    log::debug!("Strip drew {} spans", drawn);
    canvas.into_image()
}

/// Stack a strip under a chart, compositing the strip over `backdrop`.
pub fn stack_with_strip(chart: &RgbImage, strip: &RgbaImage, backdrop: Rgb<u8>) -> RgbImage {
    let width = chart.width().max(strip.width());
    let mut output = RgbImage::from_pixel(width, chart.height() + strip.height(), backdrop);

    for (x, y, pixel) in chart.enumerate_pixels() {
        output.put_pixel(x, y, *pixel);
    }

    for (x, y, pixel) in strip.enumerate_pixels() {
        let alpha = pixel.0[3] as f32 / 255.0;
        let blend = |over: u8, base: u8| {
            (base as f32 * (1.0 - alpha) + over as f32 * alpha).round() as u8
        };
        output.put_pixel(
            x,
            chart.height() + y,
            Rgb([
                blend(pixel.0[0], backdrop.0[0]),
                blend(pixel.0[1], backdrop.0[1]),
                blend(pixel.0[2], backdrop.0[2]),
            ]),
        );
    }

    output
}

/// Stack `panels` top to bottom, left aligned over `backdrop`.
pub fn stack_vertically(panels: &[&RgbImage], backdrop: Rgb<u8>) -> RgbImage {
    let width = panels.iter().map(|p| p.width()).max().unwrap_or(0);
    let height = panels.iter().map(|p| p.height()).sum();
    let mut output = RgbImage::from_pixel(width, height, backdrop);

    let mut top = 0;
    for panel in panels {
        for (x, y, pixel) in panel.enumerate_pixels() {
            output.put_pixel(x, top + y, *pixel);
        }
        top += panel.height();
    }
    output
}

/// Render a chart with the absorption strip of `strip_source` beneath it.
pub fn render_spectrum_figure(
    spec: &SpectrumChartSpec<'_>,
    strip_source: &SampledSpectrum,
    layout: &FigureLayout,
) -> Result<RgbImage, Box<dyn Error>> {
    let (chart, axis) = render_spectrum_chart(spec, layout)?;
    let strip = render_strip_image(
        &axis,
        layout,
        &strip_source.wavelengths(),
        &strip_source.values(),
    );
    Ok(stack_with_strip(&chart, &strip, Rgb([0, 0, 0])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photometry::color::class_markers;
    use crate::photometry::lines::LineCatalog;

    #[test]
    fn test_stack_vertically() {
        let upper = RgbImage::from_pixel(4, 2, Rgb([255, 0, 0]));
        let lower = RgbImage::from_pixel(3, 3, Rgb([0, 0, 255]));
        let stacked = stack_vertically(&[&upper, &lower], Rgb([0, 0, 0]));

        assert_eq!(stacked.dimensions(), (4, 5));
        assert_eq!(*stacked.get_pixel(3, 1), Rgb([255, 0, 0]));
        assert_eq!(*stacked.get_pixel(0, 2), Rgb([0, 0, 255]));
        // Narrower panel leaves the backdrop showing
        assert_eq!(*stacked.get_pixel(3, 4), Rgb([0, 0, 0]));
        assert_eq!(stack_vertically(&[], Rgb([0, 0, 0])).dimensions(), (0, 0));
    }

    #[test]
    fn test_hex_to_rgb_color() {
        assert_eq!(hex_to_rgb_color("#ff9d00").unwrap(), RGBColor(255, 157, 0));
        assert!(hex_to_rgb_color("orange").is_err());
    }

    #[test]
    fn test_layout_device_size() {
        let layout = FigureLayout {
            width: 500,
            chart_height: 300,
            strip_height: 40,
            device_pixel_ratio: 1.5,
        };
        assert_eq!(layout.device_size(layout.chart_height), (750, 450));
        assert_eq!(layout.device_size(layout.strip_height), (750, 60));
        assert_eq!(layout.px(10.0), 15);
    }

    #[test]
    fn test_marker_lines() {
        let catalog = LineCatalog::builtin();
        let markers = catalog.markers_in_range(&["Ca II"], 380.0, 780.0).unwrap();
        let lines = MarkerLine::from_line_markers(&markers).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].color, RGBColor(0, 255, 0));
        assert_eq!(lines[0].label, "Ca II");

        let classes = MarkerLine::from_class_markers(&class_markers(380.0, 780.0));
        let labels: Vec<&str> = classes.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "F", "G"]);
    }

    #[test]
    fn test_stack_with_strip() {
        let chart = RgbImage::from_pixel(4, 2, Rgb([10, 20, 30]));
        let mut strip = RgbaImage::new(4, 1);
        strip.put_pixel(1, 0, image::Rgba([255, 0, 0, 255]));
        let stacked = stack_with_strip(&chart, &strip, Rgb([0, 0, 0]));
        assert_eq!(stacked.dimensions(), (4, 3));
        assert_eq!(*stacked.get_pixel(0, 0), Rgb([10, 20, 30]));
        assert_eq!(*stacked.get_pixel(1, 2), Rgb([255, 0, 0]));
        assert_eq!(*stacked.get_pixel(0, 2), Rgb([0, 0, 0]));
    }
}
