//! Spectral classification and wavelength-to-color mapping.
//!
//! This module provides two related pieces of the display pipeline:
//!
//! # Spectral Classification
//!
//! The Harvard/Morgan-Keenan sequence (OBAFGKM) assigned from effective
//! temperature by a fixed threshold ladder, together with the display color
//! each class is labeled with and the Wien-peak markers drawn above a
//! continuum chart.
//!
//! # Wavelength Colors
//!
//! Two deliberately different mappings from visible wavelength to color:
//!
//! - [`wavelength_to_color`]: vivid, full-intensity hues with an alpha channel,
//!   used for rainbow backgrounds on dark charts
//! - [`wavelength_to_perceptual_rgb`]: the same hue segments with an intensity
//!   roll-off toward the violet and red limits of vision, used for the
//!   per-pixel absorption strip
//!
//! Both use six linear segments with boundaries at 380, 440, 490, 510, 580,
//! 645 and 780/781 nm. They are kept separate on purpose; unifying them would
//! change rendered output.

use std::fmt;

use thiserror::Error;

use super::stellar::peak_wavelength_from_temperature;

/// Errors from parsing display colors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ColorError {
    #[error("Display color must look like #rrggbb, got {0:?}")]
    Malformed(String),
}

/// The spectral classification system for stars, known as the Morgan-Keenan system.
///
/// The main classes from hottest to coolest are: O, B, A, F, G, K, M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpectralClass {
    /// O-type stars: above 30,000K, ionized helium lines
    O,

    /// B-type stars: 10,000-30,000K, neutral helium lines
    B,

    /// A-type stars: 7,500-10,000K, strongest hydrogen lines
    A,

    /// F-type stars: 6,000-7,500K
    F,

    /// G-type stars: 5,200-6,000K, like the Sun; strong Ca II
    G,

    /// K-type stars: 3,700-5,200K, neutral metals
    K,

    /// M-type stars: below 3,700K, TiO molecular bands
    M,
}

impl SpectralClass {
    /// All classes from hottest to coolest
    pub const ALL: [SpectralClass; 7] = [
        SpectralClass::O,
        SpectralClass::B,
        SpectralClass::A,
        SpectralClass::F,
        SpectralClass::G,
        SpectralClass::K,
        SpectralClass::M,
    ];

    /// Temperature at the cool edge of the class, in Kelvin.
    ///
    /// M has no lower threshold in the classification ladder; 2400 K is the
    /// coolest temperature labeled on charts.
    pub fn lower_bound_k(&self) -> f64 {
        match self {
            SpectralClass::O => 30000.0,
            SpectralClass::B => 10000.0,
            SpectralClass::A => 7500.0,
            SpectralClass::F => 6000.0,
            SpectralClass::G => 5200.0,
            SpectralClass::K => 3700.0,
            SpectralClass::M => 2400.0,
        }
    }

    /// Label color for the class as `#rrggbb`.
    pub fn display_color_hex(&self) -> &'static str {
        match self {
            SpectralClass::O => "#6b8cff",
            SpectralClass::B => "#9db4ff",
            SpectralClass::A => "#cad8ff",
            SpectralClass::F => "#fff4e8",
            SpectralClass::G => "#ffd700",
            SpectralClass::K => "#ff9d00",
            SpectralClass::M => "#ff5533",
        }
    }

    /// Label color for the class as RGB bytes.
    pub fn display_color(&self) -> [u8; 3] {
        // The table above is static and covered by tests
        parse_hex_color(self.display_color_hex()).unwrap_or([255, 255, 255])
    }
}

impl fmt::Display for SpectralClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SpectralClass::O => 'O',
                SpectralClass::B => 'B',
                SpectralClass::A => 'A',
                SpectralClass::F => 'F',
                SpectralClass::G => 'G',
                SpectralClass::K => 'K',
                SpectralClass::M => 'M',
            }
        )
    }
}

/// Determine Morgan-Keenan spectral class from effective temperature.
///
/// # Classification Boundaries
/// Lower bounds are inclusive:
/// - **O-type**: ≥30,000K
/// - **B-type**: 10,000-30,000K
/// - **A-type**: 7,500-10,000K
/// - **F-type**: 6,000-7,500K
/// - **G-type**: 5,200-6,000K
/// - **K-type**: 3,700-5,200K
/// - **M-type**: everything cooler, including zero, negative and NaN input
///
/// # Arguments
/// * `temperature_k` - Effective temperature in Kelvin
///
/// # Returns
/// Spectral class as SpectralClass enum value
pub fn spectral_class_from_temperature(temperature_k: f64) -> SpectralClass {
    if temperature_k >= 30000.0 {
        SpectralClass::O
    } else if temperature_k >= 10000.0 {
        SpectralClass::B
    } else if temperature_k >= 7500.0 {
        SpectralClass::A
    } else if temperature_k >= 6000.0 {
        SpectralClass::F
    } else if temperature_k >= 5200.0 {
        SpectralClass::G
    } else if temperature_k >= 3700.0 {
        SpectralClass::K
    } else {
        SpectralClass::M
    }
}

/// Position of a class label above a continuum chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMarker {
    pub class: SpectralClass,
    /// Wien peak of the class's lower-bound temperature, in nanometers
    pub wavelength_nm: f64,
}

/// Class markers that fall inside `[wavelength_min_nm, wavelength_max_nm]`.
///
/// Each class is placed at the Wien peak of its lower-bound temperature, so
/// the markers read as "a star whose continuum peaks here is of this class".
/// Returned hottest first.
pub fn class_markers(wavelength_min_nm: f64, wavelength_max_nm: f64) -> Vec<ClassMarker> {
    SpectralClass::ALL
        .iter()
        .map(|&class| ClassMarker {
            class,
            wavelength_nm: peak_wavelength_from_temperature(class.lower_bound_k()),
        })
        .filter(|m| m.wavelength_nm >= wavelength_min_nm && m.wavelength_nm <= wavelength_max_nm)
        .collect()
}

/// Parse a `#rrggbb` display color.
pub fn parse_hex_color(hex: &str) -> Result<[u8; 3], ColorError> {
    let digits = hex
        .strip_prefix('#')
        .filter(|d| d.len() == 6 && d.is_ascii())
        .ok_or_else(|| ColorError::Malformed(hex.to_string()))?;

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| ColorError::Malformed(hex.to_string()))
    };

    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

/// An 8-bit color with a fractional alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in `[0, 1]`
    pub alpha: f64,
}

impl Rgba {
    /// Fully transparent black
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        alpha: 0.0,
    };

    pub fn is_transparent(&self) -> bool {
        self.alpha <= 0.0
    }

    /// Convert to an 8-bit RGBA pixel.
    pub fn to_pixel(&self) -> image::Rgba<u8> {
        let a = (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        image::Rgba([self.r, self.g, self.b, a])
    }
}

/// Unit-scale hue for a wavelength at or above 380 nm.
///
/// Everything from 645 nm up is pure red; callers decide where the visible
/// band ends.
fn segment_hue(wavelength_nm: f64) -> (f64, f64, f64) {
    let wl = wavelength_nm;
    if wl < 440.0 {
        (-(wl - 440.0) / (440.0 - 380.0), 0.0, 1.0)
    } else if wl < 490.0 {
        (0.0, (wl - 440.0) / (490.0 - 440.0), 1.0)
    } else if wl < 510.0 {
        (0.0, 1.0, -(wl - 510.0) / (510.0 - 490.0))
    } else if wl < 580.0 {
        ((wl - 510.0) / (580.0 - 510.0), 1.0, 0.0)
    } else if wl < 645.0 {
        (1.0, -(wl - 645.0) / (645.0 - 580.0), 0.0)
    } else {
        (1.0, 0.0, 0.0)
    }
}

/// Vivid color for a visible wavelength.
///
/// Channels are the six-segment hue scaled to 255 and rounded; `alpha` is
/// passed through. Wavelengths outside `[380, 781)` nm, and NaN, map to
/// [`Rgba::TRANSPARENT`].
///
/// # Arguments
/// * `wavelength_nm` - Wavelength in nanometers
/// * `alpha` - Opacity to attach to the color
pub fn wavelength_to_color(wavelength_nm: f64, alpha: f64) -> Rgba {
    if !(380.0..781.0).contains(&wavelength_nm) {
        return Rgba::TRANSPARENT;
    }

    let (r, g, b) = segment_hue(wavelength_nm);
    Rgba {
        r: (r * 255.0).round() as u8,
        g: (g * 255.0).round() as u8,
        b: (b * 255.0).round() as u8,
        alpha,
    }
}

/// Perceived brightness of the visible band edges.
///
/// Ramps linearly from 0.3 at 380 nm to 1.0 at 420 nm, holds 1.0 through
/// 700 nm, then falls back to 0.3 at 780 nm. Zero outside 380–780 nm.
pub fn edge_intensity_factor(wavelength_nm: f64) -> f64 {
    let wl = wavelength_nm;
    if (380.0..420.0).contains(&wl) {
        0.3 + 0.7 * (wl - 380.0) / (420.0 - 380.0)
    } else if (420.0..700.0).contains(&wl) {
        1.0
    } else if (700.0..=780.0).contains(&wl) {
        0.3 + 0.7 * (780.0 - wl) / (780.0 - 700.0)
    } else {
        0.0
    }
}

/// Perceptually toned RGB for a visible wavelength.
///
/// Same hue segments as [`wavelength_to_color`] (with the red segment closed
/// at 780 nm), dimmed by [`edge_intensity_factor`] and floored to integers.
/// Black outside 380–780 nm.
pub fn wavelength_to_perceptual_rgb(wavelength_nm: f64) -> [u8; 3] {
    if !(380.0..=780.0).contains(&wavelength_nm) {
        return [0, 0, 0];
    }

    let (r, g, b) = segment_hue(wavelength_nm);
    let factor = edge_intensity_factor(wavelength_nm);
    [
        (r * factor * 255.0).floor() as u8,
        (g * factor * 255.0).floor() as u8,
        (b * factor * 255.0).floor() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_spectral_class() {
        assert_eq!(spectral_class_from_temperature(50000.0), SpectralClass::O);
        assert_eq!(spectral_class_from_temperature(30000.0), SpectralClass::O);
        assert_eq!(spectral_class_from_temperature(29999.9), SpectralClass::B);
        assert_eq!(spectral_class_from_temperature(10000.0), SpectralClass::B);
        assert_eq!(spectral_class_from_temperature(9000.0), SpectralClass::A);
        assert_eq!(spectral_class_from_temperature(6500.0), SpectralClass::F);
        assert_eq!(spectral_class_from_temperature(5778.0), SpectralClass::G);
        assert_eq!(spectral_class_from_temperature(5200.0), SpectralClass::G);
        assert_eq!(spectral_class_from_temperature(5199.9), SpectralClass::K);
        assert_eq!(spectral_class_from_temperature(3700.0), SpectralClass::K);
        assert_eq!(spectral_class_from_temperature(3000.0), SpectralClass::M);
        assert_eq!(spectral_class_from_temperature(100.0), SpectralClass::M);
    }

    #[test]
    fn test_spectral_class_total() {
        assert_eq!(spectral_class_from_temperature(0.0), SpectralClass::M);
        assert_eq!(spectral_class_from_temperature(-5.0), SpectralClass::M);
        assert_eq!(spectral_class_from_temperature(f64::NAN), SpectralClass::M);
        assert_eq!(
            spectral_class_from_temperature(f64::INFINITY),
            SpectralClass::O
        );
    }

    #[test]
    fn test_spectral_class_display() {
        let letters: String = SpectralClass::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(letters, "OBAFGKM");
    }

    #[test]
    fn test_lower_bounds_classify_to_self() {
        for class in SpectralClass::ALL {
            if class != SpectralClass::M {
                assert_eq!(spectral_class_from_temperature(class.lower_bound_k()), class);
            }
        }
    }

    #[test]
    fn test_display_colors_parse() {
        assert_eq!(SpectralClass::O.display_color(), [0x6b, 0x8c, 0xff]);
        assert_eq!(SpectralClass::G.display_color(), [0xff, 0xd7, 0x00]);
        assert_eq!(SpectralClass::M.display_color(), [0xff, 0x55, 0x33]);
        for class in SpectralClass::ALL {
            assert!(parse_hex_color(class.display_color_hex()).is_ok());
        }
    }

    #[test]
    fn test_parse_hex_color_rejects_malformed() {
        assert!(parse_hex_color("ffd700").is_err());
        assert!(parse_hex_color("#ffd70").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
        assert!(parse_hex_color("gold").is_err());
        assert_eq!(parse_hex_color("#00FF00"), Ok([0, 255, 0]));
    }

    #[test]
    fn test_class_markers_visible_window() {
        let markers = class_markers(380.0, 780.0);
        // A peaks at 386 nm, F at 483 nm, G at 557 nm; K lands at 783 nm
        let classes: Vec<SpectralClass> = markers.iter().map(|m| m.class).collect();
        assert_eq!(classes, vec![SpectralClass::A, SpectralClass::F, SpectralClass::G]);
        assert_relative_eq!(markers[2].wavelength_nm, 2.898e-3 / 5200.0 * 1e9, max_relative = 1e-12);
    }

    #[test]
    fn test_class_markers_wide_window() {
        let markers = class_markers(50.0, 1500.0);
        assert_eq!(markers.len(), 7);
        for pair in markers.windows(2) {
            assert!(pair[0].wavelength_nm < pair[1].wavelength_nm);
        }
    }

    #[test]
    fn test_vivid_color_outside_visible_is_transparent() {
        for wl in [0.0, 200.0, 379.99, 781.0, 900.0, f64::NAN] {
            assert_eq!(wavelength_to_color(wl, 0.85), Rgba::TRANSPARENT, "wl = {}", wl);
        }
        assert!(!wavelength_to_color(780.5, 1.0).is_transparent());
    }

    #[test]
    fn test_vivid_color_segment_anchors() {
        let c = |wl| {
            let rgba = wavelength_to_color(wl, 1.0);
            [rgba.r, rgba.g, rgba.b]
        };
        assert_eq!(c(380.0), [255, 0, 255]);
        assert_eq!(c(440.0), [0, 0, 255]);
        assert_eq!(c(490.0), [0, 255, 255]);
        assert_eq!(c(510.0), [0, 255, 0]);
        assert_eq!(c(580.0), [255, 255, 0]);
        assert_eq!(c(645.0), [255, 0, 0]);
        assert_eq!(c(700.0), [255, 0, 0]);
        assert_eq!(wavelength_to_color(500.0, 0.85).alpha, 0.85);
    }

    #[test]
    fn test_vivid_color_monotone_within_segments() {
        // (segment start, end, channel index, +1 increasing / -1 decreasing)
        let segments = [
            (380.0, 440.0, 0usize, -1i32),
            (440.0, 490.0, 1, 1),
            (490.0, 510.0, 2, -1),
            (510.0, 580.0, 0, 1),
            (580.0, 645.0, 1, -1),
        ];
        for (start, end, channel, direction) in segments {
            let mut prev: Option<i32> = None;
            let mut wl = start;
            while wl < end {
                let rgba = wavelength_to_color(wl, 1.0);
                let value = [rgba.r, rgba.g, rgba.b][channel] as i32;
                if let Some(p) = prev {
                    assert!(
                        (value - p) * direction >= 0,
                        "channel {} not monotone at {} nm",
                        channel,
                        wl
                    );
                }
                prev = Some(value);
                wl += 0.5;
            }
        }
    }

    #[test]
    fn test_edge_intensity_factor() {
        assert_relative_eq!(edge_intensity_factor(380.0), 0.3, epsilon = 1e-12);
        assert_relative_eq!(edge_intensity_factor(400.0), 0.65, epsilon = 1e-12);
        assert_relative_eq!(edge_intensity_factor(420.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(edge_intensity_factor(699.9), 1.0, epsilon = 1e-12);
        assert_relative_eq!(edge_intensity_factor(740.0), 0.65, epsilon = 1e-12);
        assert_relative_eq!(edge_intensity_factor(780.0), 0.3, epsilon = 1e-12);
        assert_eq!(edge_intensity_factor(379.0), 0.0);
        assert_eq!(edge_intensity_factor(781.0), 0.0);
    }

    #[test]
    fn test_perceptual_rgb() {
        assert_eq!(wavelength_to_perceptual_rgb(379.0), [0, 0, 0]);
        assert_eq!(wavelength_to_perceptual_rgb(780.5), [0, 0, 0]);
        // Edge of vision is dimmed to 30%
        assert_eq!(wavelength_to_perceptual_rgb(380.0), [76, 0, 76]);
        assert_eq!(wavelength_to_perceptual_rgb(780.0), [76, 0, 0]);
        // Core band is full intensity
        assert_eq!(wavelength_to_perceptual_rgb(510.0), [0, 255, 0]);
        assert_eq!(wavelength_to_perceptual_rgb(600.0)[0], 255);
    }

    #[test]
    fn test_mappings_differ_at_edges() {
        let vivid = wavelength_to_color(390.0, 1.0);
        let perceptual = wavelength_to_perceptual_rgb(390.0);
        assert!(perceptual[2] < vivid.b);
    }

    #[test]
    fn test_to_pixel_alpha() {
        let pixel = wavelength_to_color(550.0, 0.85).to_pixel();
        assert_eq!(pixel.0[3], 217);
        assert_eq!(Rgba::TRANSPARENT.to_pixel(), image::Rgba([0, 0, 0, 0]));
    }
}
