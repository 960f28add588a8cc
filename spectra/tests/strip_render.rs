//! Rendering absorption strips from synthesized spectra.

use image::Rgba;
use spectra::image_proc::strip::{render_strip, AxisMapping, LayoutCanvas, LinearAxis};
use spectra::sims::synthesis::{DepthBasis, RenderRequest, SpectralSynthesizer};
use test_helpers::save_image_artifact;

fn brightness(pixel: &Rgba<u8>) -> u32 {
    pixel.0[..3].iter().map(|&c| c as u32).sum()
}

#[test]
fn test_solar_strip_shows_calcium_lines() {
    let _ = env_logger::builder().is_test(true).try_init();

    let request = RenderRequest::new(5778.0, 4.4, 380.0, 780.0, 500).unwrap();
    let sun = SpectralSynthesizer::default().synthesize(&request, DepthBasis::Flux);

    // Two layout pixels per nanometer
    let axis = LinearAxis::new((380.0, 780.0), (0.0, 800.0));
    let mut canvas = LayoutCanvas::new(800, 40, 1.0);
    let drawn = render_strip(
        &mut canvas,
        &axis,
        &sun.absorbed.wavelengths(),
        &sun.absorbed.values(),
    );
    assert_eq!(drawn, 499);

    let column = |wavelength_nm: f64| axis.pixel_for_value(wavelength_nm).round() as u32;
    let image = canvas.image();
    let calcium = image.get_pixel(column(393.4), 20);
    let continuum = image.get_pixel(column(450.0), 20);
    assert!(
        brightness(calcium) * 4 < brightness(continuum),
        "Ca II K {:?} not darker than 450 nm {:?}",
        calcium,
        continuum
    );

    // Every column is painted opaque
    assert!(image.pixels().all(|p| p.0[3] == 255));

    save_image_artifact("strips/solar_strip.png", image).unwrap();
}

#[test]
fn test_retina_strip_matches_layout() {
    let request = RenderRequest::new(3000.0, 4.5, 380.0, 780.0, 4000).unwrap();
    let star = SpectralSynthesizer::default().synthesize(&request, DepthBasis::Flux);
    let wavelengths = star.absorbed.wavelengths();
    let intensities = star.absorbed.values();
    let axis = LinearAxis::new((380.0, 780.0), (0.0, 400.0));

    let mut standard = LayoutCanvas::new(400, 20, 1.0);
    let mut retina = LayoutCanvas::new(400, 20, 2.0);
    render_strip(&mut standard, &axis, &wavelengths, &intensities);
    render_strip(&mut retina, &axis, &wavelengths, &intensities);

    assert_eq!(retina.image().dimensions(), (800, 40));
    // Ten samples per layout pixel: color barely changes within a pixel
    for x in [50u32, 150, 250, 350] {
        let high = brightness(retina.image().get_pixel(2 * x + 1, 10)) as i64;
        let low = brightness(standard.image().get_pixel(x, 5)) as i64;
        assert!((high - low).abs() <= 24, "column {}: {} vs {}", x, high, low);
    }

    save_image_artifact("strips/m_dwarf_strip_2x.png", retina.image()).unwrap();
}

#[test]
fn test_strip_ignores_off_chart_wavelengths() {
    let request = RenderRequest::new(5778.0, 4.4, 300.0, 900.0, 600).unwrap();
    let star = SpectralSynthesizer::default().synthesize(&request, DepthBasis::Flux);
    let axis = LinearAxis::new((400.0, 700.0), (0.0, 300.0));
    let mut canvas = LayoutCanvas::new(300, 10, 1.0);

    let drawn = render_strip(
        &mut canvas,
        &axis,
        &star.absorbed.wavelengths(),
        &star.absorbed.values(),
    );
    // Roughly one sample per nanometer; starts from 400 through 700 nm land on the chart
    assert!((299..=302).contains(&drawn), "drew {} spans", drawn);
}
