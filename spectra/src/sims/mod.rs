//! Spectrum synthesis from stellar parameters

pub mod synthesis;

pub use synthesis::{
    baseline_line_width_nm, ActiveFeature, DepthBasis, RenderRequest, RequestError,
    SpectralSynthesizer, Synthesis, CONTINUUM_SAMPLE_COUNT, DETAIL_SAMPLE_COUNT,
};
