//! Absorption line catalog and temperature response models.
//!
//! The catalog holds two tables:
//!
//! - **Features**: each named absorber (an ion or molecule) with the
//!   wavelengths of its lines, the color it is labeled with, and an optional
//!   fixed line width for molecular bands.
//! - **Responses**: for each feature, how strongly it absorbs as a function of
//!   stellar temperature. A response combines a Gaussian-in-temperature
//!   baseline with a [`ResponseKind`] (plain, floored, or logistic) and an
//!   [`IonizationGate`] that switches the feature off outside a temperature
//!   window.
//!
//! A feature without a response entry never contributes to a synthesized
//! spectrum, though it can still be plotted in the atlas.
//!
//! The built-in catalog is process-wide immutable data, built once on first
//! use. Alternative catalogs can be loaded from JSON files and are validated
//! before use.

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::color::{parse_hex_color, ColorError};

/// Errors from building, loading or querying a line catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Feature {0:?} has no lines")]
    EmptyLines(String),

    #[error("Feature {name:?} has invalid line wavelength {wavelength_nm}")]
    InvalidLine { name: String, wavelength_nm: f64 },

    #[error("Feature {name:?} has invalid fixed line width {width_nm}")]
    InvalidLineWidth { name: String, width_nm: f64 },

    #[error("Feature {name:?} has an invalid display color: {source}")]
    InvalidColor { name: String, source: ColorError },

    #[error("Feature {0:?} is defined more than once")]
    DuplicateFeature(String),

    #[error("Response for {0:?} is defined more than once")]
    DuplicateResponse(String),

    #[error("Response for {0:?} does not match any feature")]
    OrphanResponse(String),

    #[error("Response for {name:?} has non-positive temperature width {width_k}")]
    InvalidResponseWidth { name: String, width_k: f64 },

    #[error("Unknown feature {0:?}")]
    UnknownFeature(String),
}

/// A named absorber and the wavelengths at which it absorbs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsorptionFeature {
    /// Display name, e.g. "Ca II"
    pub name: String,

    /// Line centers in nanometers, in catalog order
    pub lines: Vec<f64>,

    /// Label color as `#rrggbb`
    pub display_color: String,

    /// Line width that ignores surface gravity (molecular bands)
    #[serde(default)]
    pub fixed_line_width_nm: Option<f64>,
}

impl AbsorptionFeature {
    pub fn new(name: &str, lines: &[f64], display_color: &str) -> Self {
        Self {
            name: name.to_string(),
            lines: lines.to_vec(),
            display_color: display_color.to_string(),
            fixed_line_width_nm: None,
        }
    }

    /// Give the feature a gravity-independent line width.
    pub fn with_fixed_width(mut self, width_nm: f64) -> Self {
        self.fixed_line_width_nm = Some(width_nm);
        self
    }

    /// Label color as RGB bytes
    pub fn rgb(&self) -> Result<[u8; 3], ColorError> {
        parse_hex_color(&self.display_color)
    }
}

/// Shape of a feature's strength as a function of temperature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseKind {
    /// Gaussian in temperature around the response peak
    #[default]
    Gaussian,

    /// Gaussian that never drops below `floor` once the temperature reaches
    /// `from_temperature_k` (hydrogen persisting in hot stars)
    FlooredGaussian { floor: f64, from_temperature_k: f64 },

    /// `1 / (1 + exp(steepness · (T − midpoint)))`, rising monotonically as
    /// the star cools (molecular bands)
    Logistic { midpoint_k: f64, steepness: f64 },
}

/// Temperature window outside of which a feature is absent.
///
/// Models ionization thresholds categorically: a species is either present or
/// not, regardless of what its response curve says.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IonizationGate {
    /// Feature is absent below this temperature
    #[serde(default)]
    pub min_temperature_k: Option<f64>,

    /// Feature is absent above this temperature
    #[serde(default)]
    pub max_temperature_k: Option<f64>,
}

impl IonizationGate {
    /// No gating
    pub const OPEN: IonizationGate = IonizationGate {
        min_temperature_k: None,
        max_temperature_k: None,
    };

    /// Present only at or above `temperature_k`
    pub fn at_least(temperature_k: f64) -> Self {
        Self {
            min_temperature_k: Some(temperature_k),
            max_temperature_k: None,
        }
    }

    /// Present only at or below `temperature_k`
    pub fn at_most(temperature_k: f64) -> Self {
        Self {
            min_temperature_k: None,
            max_temperature_k: Some(temperature_k),
        }
    }

    /// Whether a feature with this gate can appear at `temperature_k`.
    pub fn admits(&self, temperature_k: f64) -> bool {
        let too_cold = self.min_temperature_k.is_some_and(|min| temperature_k < min);
        let too_hot = self.max_temperature_k.is_some_and(|max| temperature_k > max);
        !too_cold && !too_hot
    }
}

/// Hot-star species (He, Si ions, Mg II) vanish below this temperature
pub const HOT_ONLY_MIN_K: f64 = 7500.0;

/// Cool-star species (neutral metals, TiO) vanish above this temperature
pub const COOL_ONLY_MAX_K: f64 = 8000.0;

/// How strongly a feature absorbs at a given temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureResponse {
    /// Name of the feature this response drives
    pub feature: String,

    /// Temperature of maximum strength in Kelvin
    pub peak_temperature_k: f64,

    /// Gaussian width of the response in Kelvin
    pub width_k: f64,

    /// Depth multiplier applied to every line of the feature
    pub scale_factor: f64,

    #[serde(default)]
    pub kind: ResponseKind,

    #[serde(default)]
    pub gate: IonizationGate,
}

impl TemperatureResponse {
    /// Plain Gaussian response with no gate.
    pub fn gaussian(feature: &str, peak_temperature_k: f64, width_k: f64, scale_factor: f64) -> Self {
        Self {
            feature: feature.to_string(),
            peak_temperature_k,
            width_k,
            scale_factor,
            kind: ResponseKind::Gaussian,
            gate: IonizationGate::OPEN,
        }
    }

    pub fn with_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_gate(mut self, gate: IonizationGate) -> Self {
        self.gate = gate;
        self
    }

    /// `exp(−(T − peak)² / (2·width²))`
    pub fn gaussian_strength(&self, temperature_k: f64) -> f64 {
        let offset = temperature_k - self.peak_temperature_k;
        (-(offset * offset) / (2.0 * self.width_k * self.width_k)).exp()
    }

    /// Relative strength in `[0, 1]` at `temperature_k`, ignoring the gate.
    pub fn relative_strength(&self, temperature_k: f64) -> f64 {
        match self.kind {
            ResponseKind::Gaussian => self.gaussian_strength(temperature_k),
            ResponseKind::FlooredGaussian {
                floor,
                from_temperature_k,
            } => {
                let strength = self.gaussian_strength(temperature_k);
                if temperature_k >= from_temperature_k {
                    strength.max(floor)
                } else {
                    strength
                }
            }
            ResponseKind::Logistic {
                midpoint_k,
                steepness,
            } => 1.0 / (1.0 + (steepness * (temperature_k - midpoint_k)).exp()),
        }
    }

    /// Relative strength at `temperature_k`, or `None` when the gate excludes it.
    pub fn gated_strength(&self, temperature_k: f64) -> Option<f64> {
        self.gate
            .admits(temperature_k)
            .then(|| self.relative_strength(temperature_k))
    }
}

/// A reference marker for one line of a selected feature.
#[derive(Debug, Clone, PartialEq)]
pub struct LineMarker {
    pub feature: String,
    pub wavelength_nm: f64,
    pub display_color: String,
}

/// The absorption line catalog: features plus their temperature responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineCatalog {
    features: Vec<AbsorptionFeature>,
    responses: Vec<TemperatureResponse>,
}

static BUILTIN_CATALOG: Lazy<LineCatalog> = Lazy::new(builtin_catalog);

impl LineCatalog {
    /// Build a catalog, validating both tables.
    pub fn new(
        features: Vec<AbsorptionFeature>,
        responses: Vec<TemperatureResponse>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self {
            features,
            responses,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The built-in teaching catalog, shared process-wide.
    pub fn builtin() -> &'static LineCatalog {
        &BUILTIN_CATALOG
    }

    /// Parse and validate a catalog from JSON text.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: LineCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a catalog from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        log::info!(
            "Loaded line catalog from {}: {} features, {} responses",
            path.display(),
            catalog.features.len(),
            catalog.responses.len()
        );
        Ok(catalog)
    }

    /// Save the catalog as pretty-printed JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<(), CatalogError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// All features in catalog order
    pub fn features(&self) -> &[AbsorptionFeature] {
        &self.features
    }

    /// All responses in evaluation order
    pub fn responses(&self) -> &[TemperatureResponse] {
        &self.responses
    }

    pub fn feature(&self, name: &str) -> Option<&AbsorptionFeature> {
        self.features.iter().find(|f| f.name == name)
    }

    /// Like [`LineCatalog::feature`] but unknown names are an error.
    pub fn require_feature(&self, name: &str) -> Result<&AbsorptionFeature, CatalogError> {
        self.feature(name)
            .ok_or_else(|| CatalogError::UnknownFeature(name.to_string()))
    }

    /// Line wavelengths of a feature
    pub fn lines_for(&self, name: &str) -> Option<&[f64]> {
        self.feature(name).map(|f| f.lines.as_slice())
    }

    /// Display color of a feature
    pub fn color_for(&self, name: &str) -> Option<&str> {
        self.feature(name).map(|f| f.display_color.as_str())
    }

    /// Temperature response of a feature, if it has one
    pub fn response_for(&self, name: &str) -> Option<&TemperatureResponse> {
        self.responses.iter().find(|r| r.feature == name)
    }

    /// Markers for every line of the selected features inside the window.
    ///
    /// Markers are returned in selection order, then line order.
    pub fn markers_in_range(
        &self,
        selected: &[&str],
        wavelength_min_nm: f64,
        wavelength_max_nm: f64,
    ) -> Result<Vec<LineMarker>, CatalogError> {
        let mut markers = Vec::new();
        for name in selected {
            let feature = self.require_feature(name)?;
            markers.extend(
                feature
                    .lines
                    .iter()
                    .filter(|&&wl| wl >= wavelength_min_nm && wl <= wavelength_max_nm)
                    .map(|&wl| LineMarker {
                        feature: feature.name.clone(),
                        wavelength_nm: wl,
                        display_color: feature.display_color.clone(),
                    }),
            );
        }
        Ok(markers)
    }

    /// Check structural invariants of both tables.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut names = HashSet::new();
        for feature in &self.features {
            if !names.insert(feature.name.as_str()) {
                return Err(CatalogError::DuplicateFeature(feature.name.clone()));
            }
            if feature.lines.is_empty() {
                return Err(CatalogError::EmptyLines(feature.name.clone()));
            }
            if let Some(&bad) = feature
                .lines
                .iter()
                .find(|wl| !wl.is_finite() || **wl <= 0.0)
            {
                return Err(CatalogError::InvalidLine {
                    name: feature.name.clone(),
                    wavelength_nm: bad,
                });
            }
            if let Some(width) = feature.fixed_line_width_nm {
                if !width.is_finite() || width <= 0.0 {
                    return Err(CatalogError::InvalidLineWidth {
                        name: feature.name.clone(),
                        width_nm: width,
                    });
                }
            }
            feature
                .rgb()
                .map_err(|source| CatalogError::InvalidColor {
                    name: feature.name.clone(),
                    source,
                })?;
        }

        let mut responded = HashSet::new();
        for response in &self.responses {
            if !names.contains(response.feature.as_str()) {
                return Err(CatalogError::OrphanResponse(response.feature.clone()));
            }
            if !responded.insert(response.feature.as_str()) {
                return Err(CatalogError::DuplicateResponse(response.feature.clone()));
            }
            if !(response.width_k > 0.0) {
                return Err(CatalogError::InvalidResponseWidth {
                    name: response.feature.clone(),
                    width_k: response.width_k,
                });
            }
        }

        Ok(())
    }
}

fn builtin_catalog() -> LineCatalog {
    let features = vec![
        // Si IV resonance lines sit in the UV; kept so wide windows show them
        AbsorptionFeature::new("Si IV", &[140.0, 155.0], "#ffdab9"),
        AbsorptionFeature::new("He II", &[468.58, 656.00], "#800080"),
        AbsorptionFeature::new("Si III", &[455.26, 456.78, 457.47], "#e9967a"),
        AbsorptionFeature::new("He I", &[388.84, 447.15, 587.56], "#4444ff"),
        AbsorptionFeature::new("Mg II", &[448.11], "#1e90ff"),
        AbsorptionFeature::new("Si II", &[634.71, 637.14], "#00bfff"),
        AbsorptionFeature::new("H", &[388.90, 410.17, 434.05, 486.13, 656.28], "#00ffff"),
        AbsorptionFeature::new("Ca II", &[393.40, 396.90], "#00ff00"),
        AbsorptionFeature::new("Fe II", &[492.4, 501.8, 516.9], "#32cd32"),
        AbsorptionFeature::new("Fe I", &[438.79, 526.95, 532.80], "#ffd700"),
        AbsorptionFeature::new("Ca I", &[422.67, 646.26, 649.38], "#ffa500"),
        AbsorptionFeature::new("TiO", &[668.9, 709.0], "#ff0000").with_fixed_width(8.0),
    ];

    let hot = IonizationGate::at_least(HOT_ONLY_MIN_K);
    let cool = IonizationGate::at_most(COOL_ONLY_MAX_K);

    let responses = vec![
        TemperatureResponse::gaussian("Si IV", 40000.0, 2500.0, 0.30).with_gate(hot),
        TemperatureResponse::gaussian("He II", 35000.0, 4500.0, 0.60).with_gate(hot),
        TemperatureResponse::gaussian("He I", 22000.0, 6000.0, 0.75).with_gate(hot),
        TemperatureResponse::gaussian("Si III", 17000.0, 2500.0, 0.35).with_gate(hot),
        TemperatureResponse::gaussian("Si II", 13500.0, 3000.0, 0.50).with_gate(hot),
        TemperatureResponse::gaussian("Mg II", 9500.0, 2000.0, 0.40).with_gate(hot),
        TemperatureResponse::gaussian("H", 10000.0, 3500.0, 1.00).with_kind(
            ResponseKind::FlooredGaussian {
                floor: 0.15,
                from_temperature_k: 10000.0,
            },
        ),
        TemperatureResponse::gaussian("Fe II", 7000.0, 1800.0, 0.50)
            .with_gate(IonizationGate::at_least(4000.0)),
        TemperatureResponse::gaussian("Ca II", 5200.0, 1600.0, 1.00),
        TemperatureResponse::gaussian("Fe I", 4500.0, 2000.0, 0.75).with_gate(cool),
        TemperatureResponse::gaussian("Ca I", 3900.0, 1700.0, 0.85).with_gate(cool),
        TemperatureResponse::gaussian("TiO", 3200.0, 1000.0, 1.00)
            .with_kind(ResponseKind::Logistic {
                midpoint_k: 3600.0,
                steepness: 0.005,
            })
            .with_gate(cool),
    ];

    LineCatalog {
        features,
        responses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const HOT_ONLY: [&str; 6] = ["He II", "He I", "Si IV", "Si III", "Si II", "Mg II"];
    const COOL_ONLY: [&str; 3] = ["Fe I", "Ca I", "TiO"];

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = LineCatalog::builtin();
        catalog.validate().unwrap();
        assert_eq!(catalog.features().len(), 12);
        assert_eq!(catalog.responses().len(), 12);
    }

    #[test]
    fn test_lookups() {
        let catalog = LineCatalog::builtin();
        assert_eq!(catalog.lines_for("Ca II"), Some(&[393.40, 396.90][..]));
        assert_eq!(catalog.color_for("TiO"), Some("#ff0000"));
        assert_eq!(catalog.response_for("Ca II").unwrap().peak_temperature_k, 5200.0);
        assert!(catalog.lines_for("Unobtainium").is_none());
        assert!(catalog.response_for("Unobtainium").is_none());
        assert!(matches!(
            catalog.require_feature("Unobtainium"),
            Err(CatalogError::UnknownFeature(_))
        ));
    }

    #[test]
    fn test_builtin_gates() {
        let catalog = LineCatalog::builtin();
        for name in HOT_ONLY {
            let gate = catalog.response_for(name).unwrap().gate;
            assert!(!gate.admits(7499.0), "{} admitted below 7500 K", name);
            assert!(gate.admits(7500.0), "{} rejected at 7500 K", name);
        }
        for name in COOL_ONLY {
            let gate = catalog.response_for(name).unwrap().gate;
            assert!(gate.admits(8000.0), "{} rejected at 8000 K", name);
            assert!(!gate.admits(8000.1), "{} admitted above 8000 K", name);
        }
        let fe2 = catalog.response_for("Fe II").unwrap().gate;
        assert!(!fe2.admits(3999.0));
        assert!(fe2.admits(4000.0));
        assert!(fe2.admits(40000.0));
    }

    #[test]
    fn test_gaussian_response_peaks_at_peak() {
        let response = TemperatureResponse::gaussian("Ca II", 5200.0, 1600.0, 1.0);
        assert_relative_eq!(response.relative_strength(5200.0), 1.0);
        assert_relative_eq!(
            response.relative_strength(6800.0),
            (-0.5f64).exp(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_hydrogen_floor() {
        let h = LineCatalog::builtin().response_for("H").unwrap();
        // Far above the peak the plain Gaussian has died away
        assert!(h.gaussian_strength(30000.0) < 0.01);
        assert_relative_eq!(h.relative_strength(30000.0), 0.15);
        // The floor only applies from 10000 K up
        assert!(h.relative_strength(2000.0) < 0.15);
    }

    #[test]
    fn test_tio_logistic() {
        let tio = LineCatalog::builtin().response_for("TiO").unwrap();
        let expected = 1.0 / (1.0 + (0.005f64 * (3000.0 - 3600.0)).exp());
        assert_relative_eq!(tio.relative_strength(3000.0), expected, max_relative = 1e-12);
        assert!((tio.relative_strength(3000.0) - 0.95).abs() < 0.005);
        assert_relative_eq!(tio.relative_strength(3600.0), 0.5);
        assert!(tio.relative_strength(5778.0) < 1e-4);
        assert_eq!(tio.gated_strength(9000.0), None);
    }

    #[test]
    fn test_tio_fixed_width() {
        let tio = LineCatalog::builtin().feature("TiO").unwrap();
        assert_eq!(tio.fixed_line_width_nm, Some(8.0));
        assert_eq!(LineCatalog::builtin().feature("H").unwrap().fixed_line_width_nm, None);
    }

    #[test]
    fn test_markers_in_range() {
        let catalog = LineCatalog::builtin();
        let markers = catalog.markers_in_range(&["Ca II", "H"], 390.0, 500.0).unwrap();
        let wavelengths: Vec<f64> = markers.iter().map(|m| m.wavelength_nm).collect();
        assert_eq!(wavelengths, vec![393.40, 396.90, 410.17, 434.05, 486.13]);
        assert_eq!(markers[0].display_color, "#00ff00");
        assert!(catalog.markers_in_range(&["Xx"], 0.0, 1.0).is_err());
    }

    #[test]
    fn test_json_round_trip_preserves_catalog() {
        let catalog = LineCatalog::builtin();
        let json = catalog.to_json().unwrap();
        let parsed = LineCatalog::from_json(&json).unwrap();
        assert_eq!(&parsed, catalog);
    }

    #[test]
    fn test_json_defaults() {
        let json = r##"{
            "features": [{"name": "X", "lines": [500.0], "display_color": "#ffffff"}],
            "responses": [{"feature": "X", "peak_temperature_k": 6000.0,
                           "width_k": 1000.0, "scale_factor": 0.5}]
        }"##;
        let catalog = LineCatalog::from_json(json).unwrap();
        let response = catalog.response_for("X").unwrap();
        assert_eq!(response.kind, ResponseKind::Gaussian);
        assert_eq!(response.gate, IonizationGate::OPEN);
        assert_eq!(catalog.feature("X").unwrap().fixed_line_width_nm, None);
    }

    #[test]
    fn test_validation_errors() {
        let ok = || AbsorptionFeature::new("X", &[500.0], "#ffffff");
        let resp = || TemperatureResponse::gaussian("X", 6000.0, 1000.0, 1.0);

        assert!(matches!(
            LineCatalog::new(vec![ok(), ok()], vec![]),
            Err(CatalogError::DuplicateFeature(_))
        ));
        assert!(matches!(
            LineCatalog::new(vec![AbsorptionFeature::new("X", &[], "#ffffff")], vec![]),
            Err(CatalogError::EmptyLines(_))
        ));
        assert!(matches!(
            LineCatalog::new(vec![AbsorptionFeature::new("X", &[-1.0], "#ffffff")], vec![]),
            Err(CatalogError::InvalidLine { .. })
        ));
        assert!(matches!(
            LineCatalog::new(vec![ok().with_fixed_width(0.0)], vec![]),
            Err(CatalogError::InvalidLineWidth { .. })
        ));
        assert!(matches!(
            LineCatalog::new(vec![AbsorptionFeature::new("X", &[500.0], "white")], vec![]),
            Err(CatalogError::InvalidColor { .. })
        ));
        assert!(matches!(
            LineCatalog::new(vec![ok()], vec![resp(), resp()]),
            Err(CatalogError::DuplicateResponse(_))
        ));
        assert!(matches!(
            LineCatalog::new(vec![], vec![resp()]),
            Err(CatalogError::OrphanResponse(_))
        ));
        assert!(matches!(
            LineCatalog::new(
                vec![ok()],
                vec![TemperatureResponse::gaussian("X", 6000.0, 0.0, 1.0)]
            ),
            Err(CatalogError::InvalidResponseWidth { .. })
        ));
        assert!(LineCatalog::new(vec![ok()], vec![resp()]).is_ok());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            LineCatalog::from_json("{ not json"),
            Err(CatalogError::Json(_))
        ));
    }
}
