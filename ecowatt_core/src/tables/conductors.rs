//! Conductor Reference Data
//!
//! Standard cross-sections, ampacity for open installation (simplified) and
//! resistivity per conductor material.
//!
//! ## Material Maps
//!
//! Each material carries its own ampacity map. The maps do not have to cover
//! the same range of sizes: aluminum has no 1.5 mm² entry, so lookups for
//! that size return `None` and the thermal scan simply moves on.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Standard conductor cross-sections (mm²), ascending.
pub const STANDARD_CROSS_SECTIONS_MM2: [f64; 11] =
    [1.5, 2.5, 4.0, 6.0, 10.0, 16.0, 25.0, 35.0, 50.0, 70.0, 95.0];

/// Copper ampacity (cross-section mm², max continuous A)
pub const COPPER_AMPACITY: [(f64, f64); 11] = [
    (1.5, 19.0),
    (2.5, 27.0),
    (4.0, 41.0),
    (6.0, 50.0),
    (10.0, 80.0),
    (16.0, 100.0),
    (25.0, 140.0),
    (35.0, 170.0),
    (50.0, 215.0),
    (70.0, 270.0),
    (95.0, 330.0),
];

/// Aluminum ampacity (cross-section mm², max continuous A). Starts at 2.5 mm².
pub const ALUMINUM_AMPACITY: [(f64, f64); 10] = [
    (2.5, 20.0),
    (4.0, 28.0),
    (6.0, 36.0),
    (10.0, 50.0),
    (16.0, 65.0),
    (25.0, 85.0),
    (35.0, 105.0),
    (50.0, 135.0),
    (70.0, 165.0),
    (95.0, 200.0),
];

/// Copper resistivity (Ω·mm²/m)
pub const COPPER_RESISTIVITY: f64 = 0.0175;

/// Aluminum resistivity (Ω·mm²/m)
pub const ALUMINUM_RESISTIVITY: f64 = 0.028;

/// Conductor material
///
/// Serializes as the short codes used in saved module payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ConductorMaterial {
    /// Copper
    #[default]
    #[serde(rename = "cu")]
    Copper,
    /// Aluminum
    #[serde(rename = "al")]
    Aluminum,
}

impl ConductorMaterial {
    /// All materials for UI selection
    pub const ALL: [ConductorMaterial; 2] = [ConductorMaterial::Copper, ConductorMaterial::Aluminum];

    /// Short code ("cu" / "al")
    pub fn code(&self) -> &'static str {
        match self {
            ConductorMaterial::Copper => "cu",
            ConductorMaterial::Aluminum => "al",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ConductorMaterial::Copper => "Copper",
            ConductorMaterial::Aluminum => "Aluminum",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_uppercase().as_str() {
            "CU" | "COPPER" => Ok(ConductorMaterial::Copper),
            "AL" | "ALU" | "ALUMINUM" | "ALUMINIUM" => Ok(ConductorMaterial::Aluminum),
            _ => Err(CalcError::invalid_input(
                "conductor_material",
                s,
                "Expected copper (cu) or aluminum (al)",
            )),
        }
    }
}

impl std::fmt::Display for ConductorMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Ampacity map and resistivity for one conductor material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialTable {
    /// (cross-section mm², ampacity A), ascending by cross-section
    pub ampacity: Vec<(f64, f64)>,
    /// Resistivity in Ω·mm²/m
    pub resistivity: f64,
}

impl MaterialTable {
    /// Ampacity for an exact standard cross-section, if this material lists it.
    pub fn ampacity_at(&self, cross_section_mm2: f64) -> Option<f64> {
        self.ampacity
            .iter()
            .find(|(size, _)| *size == cross_section_mm2)
            .map(|(_, amps)| *amps)
    }

    /// Largest tabulated ampacity
    pub fn max_ampacity(&self) -> Option<f64> {
        self.ampacity.last().map(|(_, amps)| *amps)
    }

    pub(crate) fn copper() -> Self {
        MaterialTable {
            ampacity: COPPER_AMPACITY.to_vec(),
            resistivity: COPPER_RESISTIVITY,
        }
    }

    pub(crate) fn aluminum() -> Self {
        MaterialTable {
            ampacity: ALUMINUM_AMPACITY.to_vec(),
            resistivity: ALUMINUM_RESISTIVITY,
        }
    }
}
