use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spectra::image_proc::strip::{render_strip, LayoutCanvas, LinearAxis};
use spectra::sims::synthesis::{DepthBasis, RenderRequest, SpectralSynthesizer};

fn solar_request(samples: usize) -> RenderRequest {
    RenderRequest::new(5778.0, 4.4, 380.0, 780.0, samples).expect("valid bench request")
}

fn bench_synthesize(c: &mut Criterion) {
    let synthesizer = SpectralSynthesizer::default();
    let continuum_request = solar_request(500);
    let detail_request = solar_request(4000);

    let mut group = c.benchmark_group("synthesize");
    group.bench_function("flux_500", |b| {
        b.iter(|| synthesizer.synthesize(black_box(&continuum_request), DepthBasis::Flux))
    });
    group.bench_function("flux_4000", |b| {
        b.iter(|| synthesizer.synthesize(black_box(&detail_request), DepthBasis::Flux))
    });
    group.bench_function("unit_4000", |b| {
        b.iter(|| synthesizer.synthesize(black_box(&detail_request), DepthBasis::Unit))
    });
    group.finish();
}

fn bench_render_strip(c: &mut Criterion) {
    let synthesis = SpectralSynthesizer::default().synthesize(&solar_request(4000), DepthBasis::Flux);
    let wavelengths = synthesis.absorbed.wavelengths();
    let intensities = synthesis.absorbed.values();
    let axis = LinearAxis::new((380.0, 780.0), (60.0, 1014.0));

    let mut group = c.benchmark_group("render_strip");
    for dpr in [1.0, 2.0] {
        let mut canvas = LayoutCanvas::new(1024, 48, dpr);
        group.bench_function(format!("4000_samples_{}x", dpr), |b| {
            b.iter(|| {
                render_strip(
                    black_box(&mut canvas),
                    &axis,
                    black_box(&wavelengths),
                    black_box(&intensities),
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_synthesize, bench_render_strip);
criterion_main!(benches);
