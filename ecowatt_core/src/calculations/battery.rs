//! # Battery Calculation
//!
//! Two directions over the same energy balance:
//!
//! - **Runtime**: how long a bank of known capacity carries a constant load
//!   (`E = V · C · DoD · η`, `T = E / P`)
//! - **Sizing**: which capacity carries the load for a target time, with a
//!   15 % commercial margin and a snap to capacities actually sold for the
//!   chosen chemistry
//!
//! ## Example
//!
//! ```rust
//! use ecowatt_core::calculations::battery::{BatteryChemistry, BatteryInput, BatteryMode};
//!
//! let input = BatteryInput {
//!     chemistry: BatteryChemistry::Lfp,
//!     mode: BatteryMode::Runtime,
//!     system_voltage: 12.0,
//!     load_watts: 100.0,
//!     capacity_ah: 100.0,
//!     ..BatteryInput::default()
//! };
//! let output = input.calculate().module_output();
//! assert_eq!(output.headline, "8 h 38 min");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::ModuleOutput;
use crate::errors::{CalcError, CalcResult};
use crate::tables::snap_up;

/// Commercial capacity margin applied in sizing mode
pub const SAFETY_MARGIN: f64 = 1.15;
/// Round-trip efficiency when none is given
pub const DEFAULT_EFFICIENCY: f64 = 0.9;
/// System voltage when none is given
pub const DEFAULT_VOLTAGE: f64 = 12.0;
/// Autonomy assumed when sizing from a daily audit energy (hours)
pub const AUDIT_AUTONOMY_HOURS: f64 = 24.0;

/// Battery chemistry, which fixes the usable depth of discharge and the
/// capacities on the market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryChemistry {
    #[default]
    Agm,
    Gel,
    Lfp,
    LfpPro,
}

impl BatteryChemistry {
    pub const ALL: [BatteryChemistry; 4] = [
        BatteryChemistry::Agm,
        BatteryChemistry::Gel,
        BatteryChemistry::Lfp,
        BatteryChemistry::LfpPro,
    ];

    /// Usable depth of discharge
    pub fn depth_of_discharge(&self) -> f64 {
        match self {
            BatteryChemistry::Agm | BatteryChemistry::Gel => 0.50,
            BatteryChemistry::Lfp => 0.80,
            BatteryChemistry::LfpPro => 0.90,
        }
    }

    /// Standard capacities in Ah, ascending
    pub fn standard_capacities(&self) -> &'static [f64] {
        match self {
            BatteryChemistry::Agm | BatteryChemistry::Gel => {
                &[45.0, 55.0, 65.0, 75.0, 100.0, 120.0, 150.0, 200.0, 250.0]
            }
            BatteryChemistry::Lfp => &[50.0, 100.0, 105.0, 200.0, 230.0, 280.0, 300.0],
            BatteryChemistry::LfpPro => &[50.0, 100.0, 200.0, 300.0, 400.0, 500.0],
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            BatteryChemistry::Agm => "agm",
            BatteryChemistry::Gel => "gel",
            BatteryChemistry::Lfp => "lfp",
            BatteryChemistry::LfpPro => "lfp_pro",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BatteryChemistry::Agm => "AGM (lead-acid)",
            BatteryChemistry::Gel => "GEL (lead-acid)",
            BatteryChemistry::Lfp => "LiFePO4",
            BatteryChemistry::LfpPro => "LiFePO4 (premium BMS)",
        }
    }

    /// Parse from code or common spellings
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "agm" => Ok(BatteryChemistry::Agm),
            "gel" => Ok(BatteryChemistry::Gel),
            "lfp" | "lifepo4" => Ok(BatteryChemistry::Lfp),
            "lfp_pro" | "lfppro" => Ok(BatteryChemistry::LfpPro),
            _ => Err(CalcError::invalid_input("chemistry", s, "Expected agm, gel, lfp or lfp_pro")),
        }
    }
}

impl fmt::Display for BatteryChemistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Calculation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryMode {
    /// Known capacity, solve for runtime
    #[default]
    Runtime,
    /// Known runtime, solve for capacity
    Sizing,
}

/// Input parameters for the battery calculator.
///
/// Zero voltage, depth of discharge or efficiency mean "use the default";
/// the lenient field parser produces zero for empty fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryInput {
    pub chemistry: BatteryChemistry,
    pub mode: BatteryMode,
    /// Nominal bank voltage (V)
    pub system_voltage: f64,
    /// Constant load (W)
    pub load_watts: f64,
    /// Bank capacity (Ah), runtime mode
    pub capacity_ah: f64,
    /// Required runtime (h), sizing mode
    pub target_hours: f64,
    /// Expert override of the chemistry's depth of discharge
    #[serde(default)]
    pub depth_of_discharge: Option<f64>,
    /// Round-trip efficiency
    pub efficiency: f64,
}

impl Default for BatteryInput {
    fn default() -> Self {
        BatteryInput {
            chemistry: BatteryChemistry::default(),
            mode: BatteryMode::default(),
            system_voltage: DEFAULT_VOLTAGE,
            load_watts: 0.0,
            capacity_ah: 0.0,
            target_hours: 0.0,
            depth_of_discharge: None,
            efficiency: DEFAULT_EFFICIENCY,
        }
    }
}

/// Battery calculation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatteryResult {
    /// A required field is missing; `prompt` says which
    InsufficientInput { prompt: String },
    /// An expert override is out of range; nothing is computed
    InvalidInput { reason: String },
    Runtime {
        usable_energy_wh: f64,
        runtime_hours: f64,
        /// Whole minutes of runtime, rounded down
        total_minutes: u64,
    },
    Sizing {
        /// Capacity including the safety margin (Ah)
        required_capacity_ah: f64,
        /// Market capacity to buy (Ah)
        recommended_capacity_ah: f64,
        /// Whether the recommendation is in the chemistry's capacity list
        standard: bool,
    },
}

impl BatteryInput {
    /// Effective voltage after defaulting
    pub fn voltage(&self) -> f64 {
        non_zero_or(self.system_voltage, DEFAULT_VOLTAGE)
    }

    /// Effective depth of discharge after defaulting
    pub fn dod(&self) -> f64 {
        let preset = self.chemistry.depth_of_discharge();
        self.depth_of_discharge.map_or(preset, |dod| non_zero_or(dod, preset))
    }

    /// Effective efficiency after defaulting
    pub fn eta(&self) -> f64 {
        non_zero_or(self.efficiency, DEFAULT_EFFICIENCY)
    }

    /// Validate expert overrides. Missing values are not errors.
    pub fn validate(&self) -> CalcResult<()> {
        let dod = self.dod();
        if !(dod > 0.0 && dod <= 1.0) {
            return Err(CalcError::invalid_input(
                "depth_of_discharge",
                dod.to_string(),
                "Depth of discharge must be in (0, 1]",
            ));
        }
        let eta = self.eta();
        if !(eta > 0.0 && eta <= 1.0) {
            return Err(CalcError::invalid_input(
                "efficiency",
                eta.to_string(),
                "Efficiency must be in (0, 1]",
            ));
        }
        if self.voltage() < 0.0 {
            return Err(CalcError::invalid_input(
                "system_voltage",
                self.voltage().to_string(),
                "Voltage cannot be negative",
            ));
        }
        Ok(())
    }

    /// Run the calculation for the selected mode.
    ///
    /// Out-of-range overrides yield [`BatteryResult::InvalidInput`] rather
    /// than a figure computed from them.
    pub fn calculate(&self) -> BatteryResult {
        if self.load_watts <= 0.0 {
            return BatteryResult::InsufficientInput {
                prompt: "Enter the load (W)".to_string(),
            };
        }
        if let Err(e) = self.validate() {
            warn!(error = %e, "battery input rejected");
            return BatteryResult::InvalidInput {
                reason: invalid_reason(&e),
            };
        }

        match self.mode {
            BatteryMode::Runtime => self.runtime(),
            BatteryMode::Sizing => self.sizing(),
        }
    }

    fn runtime(&self) -> BatteryResult {
        if self.capacity_ah <= 0.0 {
            return BatteryResult::InsufficientInput {
                prompt: "Enter the capacity (Ah)".to_string(),
            };
        }
        let usable_energy_wh = self.voltage() * self.capacity_ah * self.dod() * self.eta();
        let runtime_hours = usable_energy_wh / self.load_watts;
        BatteryResult::Runtime {
            usable_energy_wh,
            runtime_hours,
            total_minutes: (runtime_hours * 60.0).floor() as u64,
        }
    }

    fn sizing(&self) -> BatteryResult {
        if self.target_hours <= 0.0 {
            return BatteryResult::InsufficientInput {
                prompt: "Enter the target runtime (h)".to_string(),
            };
        }
        let needed_usable_wh = self.load_watts * self.target_hours;
        let needed_total_wh = needed_usable_wh / (self.dod() * self.eta());
        let required_capacity_ah = needed_total_wh / self.voltage() * SAFETY_MARGIN;

        let (recommended_capacity_ah, standard) =
            match snap_up(self.chemistry.standard_capacities(), required_capacity_ah) {
                Some(capacity) => (capacity, true),
                None => ((required_capacity_ah / 10.0).ceil() * 10.0, false),
            };

        BatteryResult::Sizing {
            required_capacity_ah,
            recommended_capacity_ah,
            standard,
        }
    }

    /// Switch to sizing mode for one day of autonomy from an audited daily
    /// energy. Returns `false` and leaves the input untouched when there is
    /// no energy to size for.
    pub fn apply_audit_energy(&mut self, total_energy_wh: f64) -> bool {
        if !(total_energy_wh > 0.0) {
            return false;
        }
        self.mode = BatteryMode::Sizing;
        self.target_hours = AUDIT_AUTONOMY_HOURS;
        self.load_watts = (total_energy_wh / AUDIT_AUTONOMY_HOURS).round();
        true
    }
}

impl BatteryResult {
    /// Headline/subtext pair
    pub fn module_output(&self) -> ModuleOutput {
        match self {
            BatteryResult::InsufficientInput { prompt } => ModuleOutput::placeholder(prompt.clone()),
            BatteryResult::InvalidInput { reason } => ModuleOutput::placeholder(reason.clone()),
            BatteryResult::Runtime {
                usable_energy_wh,
                total_minutes,
                ..
            } => ModuleOutput {
                headline: format!("{} h {} min", total_minutes / 60, total_minutes % 60),
                subtext: format!("Usable energy: {} Wh", usable_energy_wh.round()),
            },
            BatteryResult::Sizing {
                required_capacity_ah,
                recommended_capacity_ah,
                ..
            } => ModuleOutput {
                headline: format!("~ {} Ah", required_capacity_ah.ceil()),
                subtext: format!("Recommended standard: {} Ah (+15% margin)", recommended_capacity_ah),
            },
        }
    }
}

fn invalid_reason(error: &CalcError) -> String {
    match error {
        CalcError::InvalidInput { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}

fn non_zero_or(value: f64, default: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        default
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime_input(chemistry: BatteryChemistry, capacity_ah: f64, load_watts: f64) -> BatteryInput {
        BatteryInput {
            chemistry,
            mode: BatteryMode::Runtime,
            load_watts,
            capacity_ah,
            ..BatteryInput::default()
        }
    }

    fn sizing_input(chemistry: BatteryChemistry, target_hours: f64, load_watts: f64) -> BatteryInput {
        BatteryInput {
            chemistry,
            mode: BatteryMode::Sizing,
            load_watts,
            target_hours,
            ..BatteryInput::default()
        }
    }

    #[test]
    fn test_runtime_lfp() {
        // 12 V * 100 Ah * 0.8 * 0.9 = 864 Wh, at 100 W = 8.64 h = 518.4 min
        let result = runtime_input(BatteryChemistry::Lfp, 100.0, 100.0).calculate();
        match &result {
            BatteryResult::Runtime {
                usable_energy_wh,
                total_minutes,
                ..
            } => {
                assert!((usable_energy_wh - 864.0).abs() < 1e-9);
                assert_eq!(*total_minutes, 518);
            }
            other => panic!("Expected runtime, got {:?}", other),
        }
        let output = result.module_output();
        assert_eq!(output.headline, "8 h 38 min");
        assert_eq!(output.subtext, "Usable energy: 864 Wh");
    }

    #[test]
    fn test_runtime_never_shows_sixty_minutes() {
        // 12 * 100 * 0.5 * 0.9 = 540 Wh at 270 W = exactly 2 h
        let output = runtime_input(BatteryChemistry::Agm, 100.0, 270.0)
            .calculate()
            .module_output();
        assert_eq!(output.headline, "2 h 0 min");
    }

    #[test]
    fn test_sizing_standard_capacity() {
        // 50 W * 10 h / 0.45 / 12 V * 1.15 = 106.5 Ah -> 120 Ah AGM
        let result = sizing_input(BatteryChemistry::Agm, 10.0, 50.0).calculate();
        match result {
            BatteryResult::Sizing {
                required_capacity_ah,
                recommended_capacity_ah,
                standard,
            } => {
                assert!((required_capacity_ah - 106.481_481).abs() < 1e-3);
                assert_eq!(recommended_capacity_ah, 120.0);
                assert!(standard);
            }
            other => panic!("Expected sizing, got {:?}", other),
        }
        let output = result.module_output();
        assert_eq!(output.headline, "~ 107 Ah");
        assert_eq!(output.subtext, "Recommended standard: 120 Ah (+15% margin)");
    }

    #[test]
    fn test_sizing_beyond_market_rounds_to_ten() {
        // 100 W * 24 h / 0.72 / 12 V * 1.15 = 319.4 Ah, LFP tops out at 300
        let result = sizing_input(BatteryChemistry::Lfp, 24.0, 100.0).calculate();
        match result {
            BatteryResult::Sizing {
                recommended_capacity_ah,
                standard,
                ..
            } => {
                assert_eq!(recommended_capacity_ah, 320.0);
                assert!(!standard);
            }
            other => panic!("Expected sizing, got {:?}", other),
        }
    }

    #[test]
    fn test_placeholders() {
        let output = runtime_input(BatteryChemistry::Lfp, 100.0, 0.0).calculate().module_output();
        assert_eq!(output.headline, "--");
        assert_eq!(output.subtext, "Enter the load (W)");

        assert!(runtime_input(BatteryChemistry::Lfp, 0.0, 100.0)
            .calculate()
            .module_output()
            .is_placeholder());
        assert!(sizing_input(BatteryChemistry::Lfp, 0.0, 100.0)
            .calculate()
            .module_output()
            .is_placeholder());
    }

    #[test]
    fn test_zero_fields_use_defaults() {
        let mut input = runtime_input(BatteryChemistry::LfpPro, 100.0, 100.0);
        input.system_voltage = 0.0;
        input.efficiency = 0.0;
        input.depth_of_discharge = Some(0.0);
        assert_eq!(input.voltage(), 12.0);
        assert_eq!(input.eta(), 0.9);
        assert_eq!(input.dod(), 0.9);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_expert_override_validation() {
        let mut input = runtime_input(BatteryChemistry::Agm, 100.0, 100.0);
        input.depth_of_discharge = Some(1.5);
        assert!(input.validate().is_err());
        input.depth_of_discharge = Some(0.6);
        assert!(input.validate().is_ok());
        assert_eq!(input.dod(), 0.6);
    }

    #[test]
    fn test_out_of_range_overrides_compute_nothing() {
        let mut input = runtime_input(BatteryChemistry::Lfp, 100.0, 100.0);
        input.depth_of_discharge = Some(5.0);
        input.efficiency = 3.0;
        let result = input.calculate();
        assert_eq!(
            result,
            BatteryResult::InvalidInput {
                reason: "Depth of discharge must be in (0, 1]".to_string()
            }
        );
        let output = result.module_output();
        assert!(output.is_placeholder());
        assert_eq!(output.subtext, "Depth of discharge must be in (0, 1]");

        input.depth_of_discharge = None;
        let output = input.calculate().module_output();
        assert!(output.is_placeholder());
        assert_eq!(output.subtext, "Efficiency must be in (0, 1]");

        let mut sizing = sizing_input(BatteryChemistry::Agm, 10.0, 50.0);
        sizing.system_voltage = -12.0;
        assert!(matches!(sizing.calculate(), BatteryResult::InvalidInput { .. }));
    }

    #[test]
    fn test_apply_audit_energy() {
        let mut input = BatteryInput::default();
        assert!(input.apply_audit_energy(2450.0));
        assert_eq!(input.mode, BatteryMode::Sizing);
        assert_eq!(input.target_hours, 24.0);
        // 2450 / 24 = 102.08
        assert_eq!(input.load_watts, 102.0);

        let mut untouched = BatteryInput::default();
        assert!(!untouched.apply_audit_energy(0.0));
        assert_eq!(untouched, BatteryInput::default());
    }

    #[test]
    fn test_chemistry_parsing() {
        assert_eq!(BatteryChemistry::from_str_flexible("LFP-Pro").unwrap(), BatteryChemistry::LfpPro);
        assert_eq!(BatteryChemistry::from_str_flexible("gel").unwrap(), BatteryChemistry::Gel);
        assert!(BatteryChemistry::from_str_flexible("nimh").is_err());
        for chemistry in BatteryChemistry::ALL {
            assert_eq!(BatteryChemistry::from_str_flexible(chemistry.code()).unwrap(), chemistry);
        }
    }
}
