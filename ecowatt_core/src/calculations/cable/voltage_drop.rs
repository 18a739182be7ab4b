//! Voltage-drop constraint.
//!
//! Two-wire drop equation solved for the cross-section:
//!
//! ```text
//! S = (2·L · I · ρ) / ΔU
//! ```
//!
//! With ρ in Ω·mm²/m and L in meters, S comes out in mm².

use serde::{Deserialize, Serialize};

use crate::tables::{snap_up, StandardCatalog};
use crate::units::Amps;

use super::CircuitSpec;

/// Voltage-drop requirement, before and after snapping to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoltageDropRequirement {
    /// Allowed drop in volts
    pub allowed_drop_volts: f64,
    /// Round-trip conductor length in meters
    pub total_length_m: f64,
    /// Exact cross-section the equation asks for (mm²)
    pub raw_mm2: f64,
    /// Smallest standard size >= raw, or the catalog maximum
    pub standard_mm2: f64,
}

/// Resolve the voltage-drop constraint for a spec and its load current.
pub fn resolve_voltage_drop(catalog: &StandardCatalog, spec: &CircuitSpec, load: Amps) -> VoltageDropRequirement {
    let allowed_drop_volts = spec.system_voltage * (spec.allowed_voltage_drop_percent / 100.0);
    let total_length_m = 2.0 * spec.one_way_distance_m;
    let resistivity = catalog.resistivity(spec.conductor_material);

    let raw_mm2 = (total_length_m * load.0 * resistivity) / allowed_drop_volts;
    let standard_mm2 = snap_up(catalog.cross_sections(), raw_mm2).unwrap_or_else(|| catalog.max_cross_section());

    VoltageDropRequirement {
        allowed_drop_volts,
        total_length_m,
        raw_mm2,
        standard_mm2,
    }
}
