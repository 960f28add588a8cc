//! Numerical helpers for spectral sampling
//!
//! This module provides the sampling grid and normalization routines used by
//! the radiation model and the synthesizer.

pub mod misc;

pub use misc::{linspace, normalize, peak_divisor};
