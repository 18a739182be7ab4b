//! Thermal (ampacity) constraint.
//!
//! The conductor must carry the protective device's rating, not just the
//! load current, so the device trips before the insulation overheats.

use crate::tables::{ConductorMaterial, StandardCatalog};

/// Smallest standard cross-section whose ampacity covers `device_rating_a`.
///
/// Sizes the material does not list are skipped. When nothing reaches the
/// rating the result clamps to the largest catalog size without any flag;
/// the overflow guards in reconciliation are separate and may not trip.
pub fn resolve_thermal(catalog: &StandardCatalog, device_rating_a: f64, material: ConductorMaterial) -> f64 {
    catalog
        .cross_sections()
        .iter()
        .copied()
        .find(|&size| {
            catalog
                .ampacity(material, size)
                .is_some_and(|amps| amps >= device_rating_a)
        })
        .unwrap_or_else(|| catalog.max_cross_section())
}
