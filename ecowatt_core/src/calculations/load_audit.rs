//! # Load Audit
//!
//! Appliance inventory summed into the two figures an off-grid design
//! starts from:
//!
//! - **Peak power**: `Σ P·qty`, scaled by the simultaneity factor k_sim,
//!   from which the inverter recommendation follows (+20 %, rounded up to
//!   the next 0.5 kW)
//! - **Daily energy**: `Σ P·qty·h`
//!
//! The audit is also the producer of the hand-off record consumed by the
//! battery and cable calculators (see [`crate::bridge`]).
//!
//! ## Example
//!
//! ```rust
//! use ecowatt_core::calculations::load_audit::{ApplianceRow, LoadAuditInput};
//!
//! let input = LoadAuditInput {
//!     rows: vec![ApplianceRow::new("Laptop", 60.0, 1.0, 8.0)],
//!     simultaneity_factor: 0.7,
//! };
//! let result = input.calculate();
//! assert!((result.daily_energy_wh - 480.0).abs() < 1e-9);
//! assert_eq!(result.inverter_recommendation_kw, 0.5);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::ModuleOutput;
use crate::units::{KilowattHours, Kilowatts, WattHours, Watts};

/// Simultaneity factor when none is given
pub const DEFAULT_SIMULTANEITY: f64 = 0.7;
/// Inverter headroom over the simultaneous peak
pub const INVERTER_MARGIN: f64 = 1.2;
/// Inverter sizes come in steps of this many kW
pub const INVERTER_STEP_KW: f64 = 0.5;

/// One appliance line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplianceRow {
    pub name: String,
    /// Rated power of one unit (W)
    pub power: f64,
    /// Number of units
    pub qty: f64,
    /// Operating hours per day
    #[serde(alias = "hours")]
    pub time: f64,
}

impl ApplianceRow {
    pub fn new(name: impl Into<String>, power: f64, qty: f64, time: f64) -> Self {
        ApplianceRow {
            name: name.into(),
            power,
            qty,
            time,
        }
    }

    /// Combined power of all units (W)
    pub fn peak(&self) -> Watts {
        Watts(self.power * self.qty)
    }

    /// Daily energy of this row (Wh)
    pub fn daily_energy(&self) -> WattHours {
        self.peak().over_hours(self.time)
    }
}

impl Default for ApplianceRow {
    fn default() -> Self {
        ApplianceRow::new("New appliance", 0.0, 1.0, 1.0)
    }
}

/// Typical appliance preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliancePreset {
    pub name: &'static str,
    pub power: f64,
    pub hours: f64,
}

impl AppliancePreset {
    /// A single-unit row with the preset's figures
    pub fn to_row(&self) -> ApplianceRow {
        ApplianceRow::new(self.name, self.power, 1.0, self.hours)
    }
}

/// Preset appliances, in menu order
pub const PRESETS: &[AppliancePreset] = &[
    AppliancePreset { name: "Lighting (LED)", power: 10.0, hours: 6.0 },
    AppliancePreset { name: "Router + ONU", power: 15.0, hours: 24.0 },
    AppliancePreset { name: "Phone charging", power: 20.0, hours: 4.0 },
    AppliancePreset { name: "Laptop", power: 60.0, hours: 8.0 },
    AppliancePreset { name: "TV (LED)", power: 100.0, hours: 4.0 },
    // averaged compressor cycle
    AppliancePreset { name: "Refrigerator (inverter)", power: 100.0, hours: 12.0 },
    AppliancePreset { name: "Refrigerator (old)", power: 200.0, hours: 10.0 },
    AppliancePreset { name: "Gas boiler (pump)", power: 100.0, hours: 24.0 },
    AppliancePreset { name: "Circulation pump", power: 60.0, hours: 24.0 },
    AppliancePreset { name: "Microwave", power: 1200.0, hours: 0.3 },
    AppliancePreset { name: "Kettle", power: 2000.0, hours: 0.2 },
    AppliancePreset { name: "Water heater", power: 1500.0, hours: 3.0 },
    AppliancePreset { name: "Well pump", power: 1000.0, hours: 1.0 },
];

/// Input parameters for the load audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadAuditInput {
    pub rows: Vec<ApplianceRow>,
    /// k_sim; zero means [`DEFAULT_SIMULTANEITY`]
    #[serde(alias = "sim_factor")]
    pub simultaneity_factor: f64,
}

impl Default for LoadAuditInput {
    /// Starter inventory: lighting and router.
    fn default() -> Self {
        LoadAuditInput {
            rows: PRESETS.iter().take(2).map(AppliancePreset::to_row).collect(),
            simultaneity_factor: DEFAULT_SIMULTANEITY,
        }
    }
}

/// Load audit totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadAuditResult {
    /// Daily energy per row, same order as the input (Wh)
    pub row_energy_wh: Vec<f64>,
    /// Σ P·qty without the simultaneity factor (W)
    pub connected_power_watts: f64,
    /// Connected power times k_sim (W)
    pub peak_simultaneous_watts: f64,
    /// Peak times the inverter margin (W)
    pub inverter_recommendation_watts: f64,
    /// Inverter size rounded up to the next step (kW)
    pub inverter_recommendation_kw: f64,
    /// Σ P·qty·h (Wh)
    pub daily_energy_wh: f64,
}

impl LoadAuditInput {
    /// Effective simultaneity factor
    pub fn k_sim(&self) -> f64 {
        if self.simultaneity_factor == 0.0 || !self.simultaneity_factor.is_finite() {
            DEFAULT_SIMULTANEITY
        } else {
            self.simultaneity_factor
        }
    }

    pub fn calculate(&self) -> LoadAuditResult {
        let row_energy_wh: Vec<f64> = self.rows.iter().map(|row| row.daily_energy().0).collect();
        let connected = self.rows.iter().fold(Watts(0.0), |acc, row| acc + row.peak());
        let daily_energy = self.rows.iter().fold(WattHours(0.0), |acc, row| acc + row.daily_energy());

        let peak_simultaneous = connected * self.k_sim();
        let inverter_watts = peak_simultaneous * INVERTER_MARGIN;
        let inverter_kw: Kilowatts = inverter_watts.into();
        let stepped = (inverter_kw.0 / INVERTER_STEP_KW).ceil() * INVERTER_STEP_KW;

        tracing::debug!(
            rows = self.rows.len(),
            peak_w = peak_simultaneous.0,
            energy_wh = daily_energy.0,
            "load audit computed"
        );

        LoadAuditResult {
            row_energy_wh,
            connected_power_watts: connected.0,
            peak_simultaneous_watts: peak_simultaneous.0,
            inverter_recommendation_watts: inverter_watts.0,
            inverter_recommendation_kw: stepped.max(INVERTER_STEP_KW),
            daily_energy_wh: daily_energy.0,
        }
    }
}

impl LoadAuditResult {
    /// Daily energy in kWh
    pub fn daily_energy_kwh(&self) -> f64 {
        let energy: KilowattHours = WattHours(self.daily_energy_wh).into();
        energy.0
    }

    /// Peak power as displayed, e.g. "1260 W"
    pub fn peak_text(&self) -> String {
        format!("{} W", self.peak_simultaneous_watts.round())
    }

    /// Inverter size as displayed, e.g. "1.5 kW"
    pub fn inverter_text(&self) -> String {
        format!("{:.1} kW", self.inverter_recommendation_kw)
    }

    /// Daily energy as displayed, e.g. "2.45 kWh"
    pub fn energy_text(&self) -> String {
        format!("{:.2} kWh", self.daily_energy_kwh())
    }

    pub fn module_output(&self) -> ModuleOutput {
        ModuleOutput {
            headline: self.inverter_text(),
            subtext: format!("Peak {} · {} per day", self.peak_text(), self.energy_text()),
        }
    }
}
