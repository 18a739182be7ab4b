//! # Standard Tables
//!
//! Static reference data for conductor and protection sizing: standard
//! cross-sections, per-material ampacity maps, standard device ratings and
//! resistivity.
//!
//! The tables are bundled into a [`StandardCatalog`], built once and passed
//! by reference to every resolver. Nothing mutates a catalog after
//! construction; [`StandardCatalog::reference`] hands out the process-wide
//! reference instance.
//!
//! ## Example
//!
//! ```rust
//! use ecowatt_core::tables::{ConductorMaterial, StandardCatalog};
//!
//! let catalog = StandardCatalog::reference();
//! assert_eq!(catalog.max_cross_section(), 95.0);
//! assert_eq!(catalog.ampacity(ConductorMaterial::Copper, 2.5), Some(27.0));
//! assert_eq!(catalog.ampacity(ConductorMaterial::Aluminum, 1.5), None);
//! ```

pub mod conductors;
pub mod devices;

pub use conductors::{ConductorMaterial, MaterialTable};
pub use devices::snap_up;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Raw cross-section requirement above which the result is reported as
/// "exceeds catalog" (mm²).
pub const BUSBAR_CROSS_SECTION_MM2: f64 = 95.0;

/// Margin-adjusted current above which the result is reported as
/// "exceeds catalog" (A). Top of the copper ampacity table.
pub const BUSBAR_CURRENT_A: f64 = 330.0;

static REFERENCE: Lazy<StandardCatalog> = Lazy::new(|| StandardCatalog {
    cross_sections_mm2: conductors::STANDARD_CROSS_SECTIONS_MM2.to_vec(),
    copper: MaterialTable::copper(),
    aluminum: MaterialTable::aluminum(),
    device_ratings_a: devices::STANDARD_DEVICE_RATINGS_A.to_vec(),
    busbar_cross_section_mm2: BUSBAR_CROSS_SECTION_MM2,
    busbar_current_a: BUSBAR_CURRENT_A,
});

/// Immutable set of lookup tables used by the sizing engine.
///
/// Fields are private so a catalog can only come from
/// [`StandardCatalog::reference`] or the validating [`StandardCatalog::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardCatalog {
    cross_sections_mm2: Vec<f64>,
    copper: MaterialTable,
    aluminum: MaterialTable,
    device_ratings_a: Vec<f64>,
    busbar_cross_section_mm2: f64,
    busbar_current_a: f64,
}

/// Plain table bundle used to build a custom catalog (e.g. from JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTables {
    pub cross_sections_mm2: Vec<f64>,
    pub copper: MaterialTable,
    pub aluminum: MaterialTable,
    pub device_ratings_a: Vec<f64>,
    pub busbar_cross_section_mm2: f64,
    pub busbar_current_a: f64,
}

impl StandardCatalog {
    /// The process-wide reference catalog.
    pub fn reference() -> &'static StandardCatalog {
        &REFERENCE
    }

    /// Build a catalog from custom tables.
    ///
    /// Every sequence must be non-empty, strictly ascending and positive;
    /// ampacity maps may only list sizes that appear in `cross_sections_mm2`.
    pub fn new(tables: CatalogTables) -> CalcResult<Self> {
        validate_ascending("cross_sections_mm2", &tables.cross_sections_mm2)?;
        validate_ascending("device_ratings_a", &tables.device_ratings_a)?;
        validate_material("copper", &tables.copper, &tables.cross_sections_mm2)?;
        validate_material("aluminum", &tables.aluminum, &tables.cross_sections_mm2)?;
        if !(tables.busbar_cross_section_mm2 > 0.0) || !(tables.busbar_current_a > 0.0) {
            return Err(CalcError::invalid_catalog(
                "busbar thresholds",
                "Thresholds must be positive",
            ));
        }

        Ok(StandardCatalog {
            cross_sections_mm2: tables.cross_sections_mm2,
            copper: tables.copper,
            aluminum: tables.aluminum,
            device_ratings_a: tables.device_ratings_a,
            busbar_cross_section_mm2: tables.busbar_cross_section_mm2,
            busbar_current_a: tables.busbar_current_a,
        })
    }

    /// Copy of the tables, e.g. as a starting point for a custom catalog.
    pub fn tables(&self) -> CatalogTables {
        CatalogTables {
            cross_sections_mm2: self.cross_sections_mm2.clone(),
            copper: self.copper.clone(),
            aluminum: self.aluminum.clone(),
            device_ratings_a: self.device_ratings_a.clone(),
            busbar_cross_section_mm2: self.busbar_cross_section_mm2,
            busbar_current_a: self.busbar_current_a,
        }
    }

    /// Standard cross-sections (mm²), ascending
    pub fn cross_sections(&self) -> &[f64] {
        &self.cross_sections_mm2
    }

    /// Largest standard cross-section (the clamp target of both resolvers)
    pub fn max_cross_section(&self) -> f64 {
        self.cross_sections_mm2.last().copied().unwrap_or(0.0)
    }

    /// Standard protective-device ratings (A), ascending
    pub fn device_ratings(&self) -> &[f64] {
        &self.device_ratings_a
    }

    /// Table for one material
    pub fn material(&self, material: ConductorMaterial) -> &MaterialTable {
        match material {
            ConductorMaterial::Copper => &self.copper,
            ConductorMaterial::Aluminum => &self.aluminum,
        }
    }

    /// Ampacity of a standard size, `None` if the material does not list it
    pub fn ampacity(&self, material: ConductorMaterial, cross_section_mm2: f64) -> Option<f64> {
        self.material(material).ampacity_at(cross_section_mm2)
    }

    /// Resistivity in Ω·mm²/m
    pub fn resistivity(&self, material: ConductorMaterial) -> f64 {
        self.material(material).resistivity
    }

    /// Raw cross-section requirement that triggers the busbar advisory
    pub fn busbar_cross_section(&self) -> f64 {
        self.busbar_cross_section_mm2
    }

    /// Margin-adjusted current that triggers the busbar advisory
    pub fn busbar_current(&self) -> f64 {
        self.busbar_current_a
    }
}

fn validate_ascending(table: &str, values: &[f64]) -> CalcResult<()> {
    if values.is_empty() {
        return Err(CalcError::invalid_catalog(table, "Table is empty"));
    }
    if values.iter().any(|v| !(*v > 0.0) || !v.is_finite()) {
        return Err(CalcError::invalid_catalog(table, "Entries must be positive and finite"));
    }
    if values.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(CalcError::invalid_catalog(table, "Entries must be strictly ascending"));
    }
    Ok(())
}

fn validate_material(name: &str, table: &MaterialTable, sections: &[f64]) -> CalcResult<()> {
    let table_name = format!("{name} ampacity");
    let sizes: Vec<f64> = table.ampacity.iter().map(|(size, _)| *size).collect();
    let amps: Vec<f64> = table.ampacity.iter().map(|(_, amps)| *amps).collect();
    validate_ascending(&table_name, &sizes)?;
    validate_ascending(&table_name, &amps)?;
    if let Some(size) = sizes.iter().find(|size| !sections.contains(*size)) {
        return Err(CalcError::invalid_catalog(
            table_name,
            format!("{size} mm² is not a standard cross-section"),
        ));
    }
    if !(table.resistivity > 0.0) {
        return Err(CalcError::invalid_catalog(
            format!("{name} resistivity"),
            "Resistivity must be positive",
        ));
    }
    Ok(())
}
