//! # Winter Open-Circuit Voltage
//!
//! PV module Voc rises as cells get colder. A string that fits the inverter
//! on a mild day can exceed its maximum DC input on a frosty morning.
//!
//! ```text
//! ΔT      = T_min - 25 °C
//! V_panel = Voc_STC · (1 + coef/100 · ΔT)
//! V_str   = V_panel · n
//! ```
//!
//! The check runs twice: once at the site minimum temperature and once at
//! the fixed IEC 62548 design temperature of -25 °C.

use serde::{Deserialize, Serialize};

use crate::calculations::ModuleOutput;

/// Design minimum temperature per IEC 62548 (°C)
pub const IEC_DESIGN_TEMPERATURE_C: f64 = -25.0;
/// Standard test condition cell temperature (°C)
pub const STC_TEMPERATURE_C: f64 = 25.0;
/// Margins below this share of Vmax are flagged (%)
pub const LOW_MARGIN_PERCENT: f64 = 5.0;

/// Input parameters for the winter Voc check.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WinterVocInput {
    /// Module open-circuit voltage at STC (V)
    pub voc_stc: f64,
    /// Voc temperature coefficient (%/°C). The sign is ignored; Voc always
    /// rises in the cold.
    pub temp_coefficient_pct: f64,
    /// Lowest expected site temperature (°C)
    pub min_temperature_c: f64,
    /// Modules in series
    pub panels_in_series: f64,
    /// Inverter maximum DC input voltage (V)
    pub inverter_vmax: f64,
}

/// Outcome of comparing a string voltage with the inverter limit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StringStatus {
    /// String voltage above Vmax
    Exceeded { overage_volts: f64 },
    /// Under Vmax with less than 5 % to spare
    LowMargin { margin_volts: f64, margin_percent: f64 },
    Ok { margin_volts: f64, margin_percent: f64 },
}

impl StringStatus {
    /// Classify a string voltage. `None` when either figure is not positive.
    pub fn evaluate(string_voltage: f64, vmax: f64) -> Option<Self> {
        if vmax <= 0.0 || string_voltage <= 0.0 {
            return None;
        }
        if string_voltage > vmax {
            return Some(StringStatus::Exceeded {
                overage_volts: string_voltage - vmax,
            });
        }
        let margin_volts = vmax - string_voltage;
        let margin_percent = margin_volts / vmax * 100.0;
        if margin_percent < LOW_MARGIN_PERCENT {
            Some(StringStatus::LowMargin {
                margin_volts,
                margin_percent,
            })
        } else {
            Some(StringStatus::Ok {
                margin_volts,
                margin_percent,
            })
        }
    }

    pub fn is_exceeded(&self) -> bool {
        matches!(self, StringStatus::Exceeded { .. })
    }

    /// One-line description
    pub fn message(&self, string_voltage: f64, vmax: f64) -> String {
        match self {
            StringStatus::Exceeded { overage_volts } => format!(
                "Exceeds Vmax: {:.1} V > {} V (+{:.1} V)",
                string_voltage, vmax, overage_volts
            ),
            StringStatus::LowMargin { .. } => {
                "Low voltage margin (<5%), reconsider the string layout".to_string()
            }
            StringStatus::Ok {
                margin_volts,
                margin_percent,
            } => format!("Within limits, margin {:.1} V ({:.1}%)", margin_volts, margin_percent),
        }
    }
}

/// Voltages for one temperature case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureCase {
    pub temperature_c: f64,
    /// T - 25 °C
    pub delta_t_c: f64,
    /// Relative Voc change (fraction, positive in the cold)
    pub growth: f64,
    pub panel_voltage: f64,
    pub string_voltage: f64,
    /// Hidden (`None`) when Vmax or the string voltage is not positive
    pub status: Option<StringStatus>,
}

impl TemperatureCase {
    fn compute(input: &WinterVocInput, coefficient: f64, temperature_c: f64) -> Self {
        let delta_t_c = temperature_c - STC_TEMPERATURE_C;
        let growth = coefficient / 100.0 * delta_t_c;
        let panel_voltage = input.voc_stc * (1.0 + growth);
        let string_voltage = panel_voltage * input.panels_in_series;
        TemperatureCase {
            temperature_c,
            delta_t_c,
            growth,
            panel_voltage,
            string_voltage,
            status: StringStatus::evaluate(string_voltage, input.inverter_vmax),
        }
    }

    /// Relative Voc change as displayed, e.g. "+11.20%"
    pub fn growth_text(&self) -> String {
        format!("+{:.2}%", self.growth * 100.0)
    }
}

/// Winter Voc results for the site and the IEC design temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinterVocResult {
    /// Coefficient actually used (always <= 0)
    pub coefficient_pct: f64,
    pub site: TemperatureCase,
    pub iec: TemperatureCase,
}

impl WinterVocInput {
    pub fn calculate(&self) -> WinterVocResult {
        let coefficient_pct = -self.temp_coefficient_pct.abs();
        WinterVocResult {
            coefficient_pct,
            site: TemperatureCase::compute(self, coefficient_pct, self.min_temperature_c),
            iec: TemperatureCase::compute(self, coefficient_pct, IEC_DESIGN_TEMPERATURE_C),
        }
    }
}

impl WinterVocResult {
    /// Headline is the site string voltage; subtext the site status, if any.
    pub fn module_output(&self, vmax: f64) -> ModuleOutput {
        ModuleOutput {
            headline: format!("{:.1} V", self.site.string_voltage),
            subtext: self
                .site
                .status
                .map(|status| status.message(self.site.string_voltage, vmax))
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(vmax: f64) -> WinterVocInput {
        WinterVocInput {
            voc_stc: 49.5,
            temp_coefficient_pct: -0.28,
            min_temperature_c: -15.0,
            panels_in_series: 10.0,
            inverter_vmax: vmax,
        }
    }

    #[test]
    fn test_site_and_iec_voltages() {
        let result = input(600.0).calculate();
        // ΔT = -40, growth = 11.2 %, 49.5 * 1.112 = 55.044 V
        assert_eq!(result.site.delta_t_c, -40.0);
        assert!((result.site.growth - 0.112).abs() < 1e-12);
        assert!((result.site.panel_voltage - 55.044).abs() < 1e-9);
        assert!((result.site.string_voltage - 550.44).abs() < 1e-9);
        assert_eq!(result.site.growth_text(), "+11.20%");
        // IEC: ΔT = -50, growth = 14 %
        assert_eq!(result.iec.delta_t_c, -50.0);
        assert!((result.iec.string_voltage - 564.3).abs() < 1e-9);
        assert!(matches!(result.site.status, Some(StringStatus::Ok { .. })));
        assert!(matches!(result.iec.status, Some(StringStatus::Ok { .. })));
    }

    #[test]
    fn test_positive_coefficient_is_negated() {
        let mut positive = input(600.0);
        positive.temp_coefficient_pct = 0.28;
        assert_eq!(positive.calculate(), input(600.0).calculate());
        assert_eq!(positive.calculate().coefficient_pct, -0.28);
    }

    #[test]
    fn test_low_margin() {
        let result = input(580.0).calculate();
        // site margin 29.56 V = 5.1 %, IEC margin 15.7 V = 2.7 %
        assert!(matches!(result.site.status, Some(StringStatus::Ok { .. })));
        assert!(matches!(result.iec.status, Some(StringStatus::LowMargin { .. })));
    }

    #[test]
    fn test_exceeded() {
        let result = input(550.0).calculate();
        match result.site.status {
            Some(StringStatus::Exceeded { overage_volts }) => {
                assert!((overage_volts - 0.44).abs() < 1e-9);
            }
            other => panic!("Expected exceeded, got {:?}", other),
        }
        assert!(result.iec.status.is_some_and(|s| s.is_exceeded()));
        let output = result.module_output(550.0);
        assert_eq!(output.headline, "550.4 V");
        assert_eq!(output.subtext, "Exceeds Vmax: 550.4 V > 550 V (+0.4 V)");
    }

    #[test]
    fn test_status_hidden_without_vmax_or_string() {
        let result = input(0.0).calculate();
        assert!(result.site.status.is_none());
        assert!(result.iec.status.is_none());
        assert!(result.module_output(0.0).subtext.is_empty());

        let mut no_panels = input(600.0);
        no_panels.panels_in_series = 0.0;
        assert!(no_panels.calculate().site.status.is_none());
    }
}
