//! Reconciliation of the thermal and voltage-drop constraints, catalog
//! overflow detection and the resistive loss report.

use serde::{Deserialize, Serialize};

use crate::tables::StandardCatalog;
use crate::units::{Amps, KilowattHours, Meters, Ohms, SqMm, Watts};

use super::protection::{device_target, DeviceRating};
use super::voltage_drop::VoltageDropRequirement;
use super::CircuitSpec;

/// Operating duration used for the absolute-loss figure (hours)
pub const REFERENCE_DURATION_HOURS: f64 = 10.0;

/// Which requirement drove the final size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitingConstraint {
    /// Ampacity must cover the protective device rating
    Thermal,
    /// Cross-section needed to stay inside the allowed drop
    VoltageDrop,
}

/// How the loss comparison is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonMode {
    /// Watts of heat avoided against the thermal-only size
    Savings,
    /// kWh lost over the reference duration
    AbsoluteLoss,
}

/// Loss comparison against the cheapest thermally acceptable conductor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossComparison {
    pub mode: ComparisonMode,
    /// W for [`ComparisonMode::Savings`], kWh for [`ComparisonMode::AbsoluteLoss`]
    pub value: f64,
    /// Cross-section the comparison is made against (mm²)
    pub baseline_cross_section_mm2: f64,
}

/// Resistive loss of the selected conductor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossReport {
    /// Round-trip resistance of the final conductor (Ω)
    pub resistance_ohms: f64,
    /// I²R dissipation at the load current (W)
    pub power_loss_watts: f64,
    pub comparison: LossComparison,
}

/// Full sizing result for one circuit spec.
///
/// `final_cross_section_mm2` and `losses` are absent when the circuit is over
/// catalog; the device rating is always reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    pub load_current_amps: f64,
    pub device: DeviceRating,
    pub cross_section_thermal_mm2: f64,
    pub cross_section_voltage_drop_mm2: f64,
    /// Unrounded voltage-drop requirement, for diagnostics
    pub required_cross_section_raw_mm2: f64,
    pub final_cross_section_mm2: Option<f64>,
    pub limiting_constraint: LimitingConstraint,
    pub over_catalog: bool,
    pub losses: Option<LossReport>,
}

impl SizingResult {
    /// One-line explanation of what limited the size.
    pub fn criteria(&self) -> String {
        if self.over_catalog {
            return "Busbar or parallel conductors required".to_string();
        }
        match self.limiting_constraint {
            LimitingConstraint::VoltageDrop => format!(
                "Limited by voltage drop (calculated {:.1} mm²)",
                self.required_cross_section_raw_mm2
            ),
            LimitingConstraint::Thermal => format!(
                "Limited by protection current (must carry {} A)",
                self.device.amps
            ),
        }
    }
}

/// Combine both constraints into the final result.
///
/// The overflow guards are independent of the clamped resolver outputs: the
/// raw voltage-drop requirement is compared with the busbar cross-section and
/// the margin-adjusted load current with the busbar current. A clamped
/// thermal size that trips neither guard is reported as a normal result.
pub fn reconcile(
    catalog: &StandardCatalog,
    spec: &CircuitSpec,
    load: Amps,
    device: DeviceRating,
    thermal_mm2: f64,
    voltage_drop: &VoltageDropRequirement,
) -> SizingResult {
    let final_mm2 = thermal_mm2.max(voltage_drop.standard_mm2);
    let limiting_constraint = if voltage_drop.standard_mm2 > thermal_mm2 {
        LimitingConstraint::VoltageDrop
    } else {
        LimitingConstraint::Thermal
    };

    let over_catalog = voltage_drop.raw_mm2 > catalog.busbar_cross_section()
        || device_target(load) > catalog.busbar_current();

    let mut result = SizingResult {
        load_current_amps: load.0,
        device,
        cross_section_thermal_mm2: thermal_mm2,
        cross_section_voltage_drop_mm2: voltage_drop.standard_mm2,
        required_cross_section_raw_mm2: voltage_drop.raw_mm2,
        final_cross_section_mm2: None,
        limiting_constraint,
        over_catalog,
        losses: None,
    };

    if !over_catalog {
        result.final_cross_section_mm2 = Some(final_mm2);
        result.losses = Some(loss_report(catalog, spec, load, thermal_mm2, final_mm2));
    }
    result
}

fn conductor_loss(catalog: &StandardCatalog, spec: &CircuitSpec, load: Amps, section_mm2: f64) -> (Ohms, Watts) {
    let resistance = Ohms::of_conductor(
        Meters(2.0 * spec.one_way_distance_m),
        catalog.resistivity(spec.conductor_material),
        SqMm(section_mm2),
    );
    (resistance, load.dissipation_in(resistance))
}

fn loss_report(
    catalog: &StandardCatalog,
    spec: &CircuitSpec,
    load: Amps,
    thermal_mm2: f64,
    final_mm2: f64,
) -> LossReport {
    let (resistance, loss) = conductor_loss(catalog, spec, load, final_mm2);

    let comparison = if thermal_mm2 < final_mm2 {
        let (_, thermal_loss) = conductor_loss(catalog, spec, load, thermal_mm2);
        LossComparison {
            mode: ComparisonMode::Savings,
            value: (thermal_loss - loss).0,
            baseline_cross_section_mm2: thermal_mm2,
        }
    } else {
        let energy: KilowattHours = loss.over_hours(REFERENCE_DURATION_HOURS).into();
        LossComparison {
            mode: ComparisonMode::AbsoluteLoss,
            value: energy.0,
            baseline_cross_section_mm2: final_mm2,
        }
    };

    LossReport {
        resistance_ohms: resistance.0,
        power_loss_watts: loss.0,
        comparison,
    }
}
