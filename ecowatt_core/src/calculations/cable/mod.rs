//! # Cable and Protection Sizing
//!
//! Sizes a single DC conductor run and its protective device. Two
//! constraints are resolved independently and reconciled into one
//! worst-case size:
//!
//! 1. **Load**: power or current input normalized to a load current
//! 2. **Protection**: load current × 1.25, snapped to a standard rating
//! 3. **Thermal**: smallest cross-section whose ampacity covers the device
//! 4. **Voltage drop**: smallest standard cross-section inside the drop budget
//! 5. **Reconciliation**: `max(thermal, voltage drop)`, overflow guards,
//!    I²R loss and a comparison against the thermal-only conductor
//!
//! ## Assumptions
//!
//! - Single run, single material, two-wire DC (or resistive-equivalent AC)
//! - Simplified open-installation ampacity table, no temperature derating
//!
//! ## Example
//!
//! ```rust
//! use ecowatt_core::calculations::cable::{calculate, CircuitSpec, InputMode, SizingOutcome};
//! use ecowatt_core::tables::{ConductorMaterial, StandardCatalog};
//!
//! let spec = CircuitSpec {
//!     system_voltage: 48.0,
//!     input_mode: InputMode::Current,
//!     input_value: 20.0,
//!     one_way_distance_m: 30.0,
//!     allowed_voltage_drop_percent: 2.0,
//!     conductor_material: ConductorMaterial::Copper,
//! };
//!
//! match calculate(StandardCatalog::reference(), &spec).unwrap() {
//!     SizingOutcome::Sized(result) => {
//!         assert_eq!(result.device.amps, 25.0);
//!         assert_eq!(result.final_cross_section_mm2, Some(25.0));
//!     }
//!     SizingOutcome::InsufficientInput => unreachable!(),
//! }
//! ```

pub mod display;
pub mod load;
pub mod protection;
pub mod reconcile;
pub mod thermal;
pub mod voltage_drop;

pub use display::CableDisplay;
pub use protection::{DeviceRating, DEVICE_MARGIN};
pub use reconcile::{ComparisonMode, LimitingConstraint, LossComparison, LossReport, SizingResult};
pub use voltage_drop::VoltageDropRequirement;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::tables::{ConductorMaterial, StandardCatalog};

/// What the input value means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputMode {
    /// Value is the load power in watts
    #[default]
    #[serde(rename = "watts")]
    Power,
    /// Value is the load current in amperes
    #[serde(rename = "amps")]
    Current,
}

impl InputMode {
    /// Unit label of the input value
    pub fn unit(&self) -> &'static str {
        match self {
            InputMode::Power => "W",
            InputMode::Current => "A",
        }
    }

    /// Short code used in saved payloads
    pub fn code(&self) -> &'static str {
        match self {
            InputMode::Power => "watts",
            InputMode::Current => "amps",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_uppercase().as_str() {
            "W" | "WATTS" | "POWER" => Ok(InputMode::Power),
            "A" | "AMPS" | "CURRENT" => Ok(InputMode::Current),
            _ => Err(CalcError::invalid_input("input_mode", s, "Expected power (watts) or current (amps)")),
        }
    }
}

/// Input parameters for one circuit.
///
/// ## JSON Example
///
/// ```json
/// {
///   "system_voltage": 12.0,
///   "input_mode": "watts",
///   "input_value": 3000.0,
///   "one_way_distance_m": 10.0,
///   "allowed_voltage_drop_percent": 3.0,
///   "conductor_material": "cu"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitSpec {
    /// System voltage (V)
    pub system_voltage: f64,

    /// Whether `input_value` is watts or amps
    pub input_mode: InputMode,

    /// Load power (W) or current (A)
    pub input_value: f64,

    /// One-way distance between source and load (m)
    pub one_way_distance_m: f64,

    /// Allowed voltage drop, percent of system voltage
    pub allowed_voltage_drop_percent: f64,

    /// Conductor material
    pub conductor_material: ConductorMaterial,
}

impl CircuitSpec {
    /// Validate the fields the engine divides by.
    ///
    /// Load value and distance are not checked here: zero there is the
    /// normal "nothing entered yet" state, see [`SizingOutcome::InsufficientInput`].
    pub fn validate(&self) -> CalcResult<()> {
        if !(self.system_voltage > 0.0) || !self.system_voltage.is_finite() {
            return Err(CalcError::invalid_input(
                "system_voltage",
                self.system_voltage.to_string(),
                "System voltage must be positive",
            ));
        }
        if !(self.allowed_voltage_drop_percent > 0.0) || self.allowed_voltage_drop_percent > 100.0 {
            return Err(CalcError::invalid_input(
                "allowed_voltage_drop_percent",
                self.allowed_voltage_drop_percent.to_string(),
                "Allowed voltage drop must be in (0, 100] percent",
            ));
        }
        Ok(())
    }
}

/// Result of running the engine on one spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum SizingOutcome {
    /// Load value or distance missing: show the placeholder, no numbers
    InsufficientInput,
    /// Numeric (or over-catalog) result
    Sized(SizingResult),
}

impl SizingOutcome {
    /// The sizing result, if there is one
    pub fn result(&self) -> Option<&SizingResult> {
        match self {
            SizingOutcome::Sized(result) => Some(result),
            SizingOutcome::InsufficientInput => None,
        }
    }
}

/// Size the conductor and protective device for a circuit.
///
/// Pure and stateless: the same spec and catalog always give a bit-identical
/// outcome, and every call recomputes from scratch.
///
/// # Returns
///
/// * `Ok(SizingOutcome::InsufficientInput)` - load value or distance is not positive
/// * `Ok(SizingOutcome::Sized(_))` - sizing result (possibly over catalog)
/// * `Err(CalcError::InvalidInput)` - voltage or allowed drop out of range
pub fn calculate(catalog: &StandardCatalog, spec: &CircuitSpec) -> CalcResult<SizingOutcome> {
    if !load::has_sufficient_input(spec) {
        debug!("insufficient input, skipping sizing");
        return Ok(SizingOutcome::InsufficientInput);
    }
    spec.validate()?;

    let load_current = load::load_current(spec);
    let device = protection::select(catalog, load_current);
    let thermal_mm2 = thermal::resolve_thermal(catalog, device.amps, spec.conductor_material);
    let voltage_drop = voltage_drop::resolve_voltage_drop(catalog, spec, load_current);

    let result = reconcile::reconcile(catalog, spec, load_current, device, thermal_mm2, &voltage_drop);

    debug!(
        load_a = result.load_current_amps,
        device_a = result.device.amps,
        thermal_mm2 = result.cross_section_thermal_mm2,
        voltage_drop_mm2 = result.cross_section_voltage_drop_mm2,
        raw_mm2 = result.required_cross_section_raw_mm2,
        over_catalog = result.over_catalog,
        "cable sized"
    );

    Ok(SizingOutcome::Sized(result))
}

/// Baseline spec for unit tests: 30 m one way, 2 % drop, copper.
#[cfg(test)]
pub(crate) fn test_spec(input_mode: InputMode, input_value: f64, system_voltage: f64) -> CircuitSpec {
    CircuitSpec {
        system_voltage,
        input_mode,
        input_value,
        one_way_distance_m: 30.0,
        allowed_voltage_drop_percent: 2.0,
        conductor_material: ConductorMaterial::Copper,
    }
}
