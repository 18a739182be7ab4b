//! Display strings for a sizing outcome.
//!
//! These exact strings are what gets shown and what gets saved into the
//! project store, so formatting lives in one place.

use serde::{Deserialize, Serialize};

use crate::calculations::ModuleOutput;

use super::reconcile::{ComparisonMode, REFERENCE_DURATION_HOURS};
use super::SizingOutcome;

/// Placeholder for the cable size when nothing can be computed
pub const CABLE_PLACEHOLDER: &str = "-- mm²";
/// Placeholder for the device rating when nothing can be computed
pub const FUSE_PLACEHOLDER: &str = "-- A";
/// Placeholder for the loss figure when it is not shown
pub const LOSS_PLACEHOLDER: &str = "--";

/// Rendered sizing outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CableDisplay {
    /// e.g. "25 mm²" or "> 95 mm²"
    pub cable_size: String,
    /// Limiting cause or advisory
    pub criteria: String,
    /// e.g. "25 A"
    pub fuse: String,
    /// e.g. "16.8 W"; `None` when the loss block is hidden
    pub loss_watts: Option<String>,
    /// Savings or absolute-loss sentence; `None` when the loss block is hidden
    pub loss_comparison: Option<String>,
}

impl CableDisplay {
    /// Render an outcome.
    pub fn from_outcome(outcome: &SizingOutcome, max_cross_section_mm2: f64) -> Self {
        let result = match outcome {
            SizingOutcome::InsufficientInput => {
                return CableDisplay {
                    cable_size: CABLE_PLACEHOLDER.to_string(),
                    criteria: String::new(),
                    fuse: FUSE_PLACEHOLDER.to_string(),
                    loss_watts: None,
                    loss_comparison: None,
                }
            }
            SizingOutcome::Sized(result) => result,
        };

        let fuse = format!("{} A", result.device.amps);
        let (cable_size, loss_watts, loss_comparison) = match (&result.final_cross_section_mm2, &result.losses) {
            (Some(size), Some(losses)) => {
                let comparison = match losses.comparison.mode {
                    ComparisonMode::Savings => format!(
                        "Savings vs {} mm²: {:.1} W (heat)",
                        losses.comparison.baseline_cross_section_mm2, losses.comparison.value
                    ),
                    ComparisonMode::AbsoluteLoss => format!(
                        "Loss over {} h of operation: {:.2} kWh",
                        REFERENCE_DURATION_HOURS, losses.comparison.value
                    ),
                };
                (
                    format!("{} mm²", size),
                    Some(format!("{:.1} W", losses.power_loss_watts)),
                    Some(comparison),
                )
            }
            _ => (format!("> {} mm²", max_cross_section_mm2), None, None),
        };

        CableDisplay {
            cable_size,
            criteria: result.criteria(),
            fuse,
            loss_watts,
            loss_comparison,
        }
    }

    /// Loss figure or its placeholder
    pub fn loss_or_placeholder(&self) -> &str {
        self.loss_watts.as_deref().unwrap_or(LOSS_PLACEHOLDER)
    }

    /// Headline/subtext pair shared with the other calculators
    pub fn module_output(&self) -> ModuleOutput {
        ModuleOutput {
            headline: self.cable_size.clone(),
            subtext: self.criteria.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::cable::{calculate, test_spec, InputMode};
    use crate::tables::StandardCatalog;

    fn render(spec: &crate::calculations::cable::CircuitSpec) -> CableDisplay {
        let catalog = StandardCatalog::reference();
        let outcome = calculate(catalog, spec).unwrap();
        CableDisplay::from_outcome(&outcome, catalog.max_cross_section())
    }

    #[test]
    fn test_placeholder() {
        let display = render(&test_spec(InputMode::Power, 0.0, 12.0));
        assert_eq!(display.cable_size, "-- mm²");
        assert_eq!(display.fuse, "-- A");
        assert_eq!(display.loss_or_placeholder(), "--");
        assert!(display.criteria.is_empty());
    }

    #[test]
    fn test_scenario_b_strings() {
        let display = render(&test_spec(InputMode::Current, 20.0, 48.0));
        assert_eq!(display.cable_size, "25 mm²");
        assert_eq!(display.fuse, "25 A");
        assert_eq!(display.loss_watts.as_deref(), Some("16.8 W"));
        assert_eq!(
            display.loss_comparison.as_deref(),
            Some("Savings vs 2.5 mm²: 151.2 W (heat)")
        );
    }

    #[test]
    fn test_absolute_loss_sentence() {
        // 12 V, 5 A, 2 m, 3 %: thermal 1.5 mm² (device 10 A) also satisfies the drop
        let mut spec = test_spec(InputMode::Current, 5.0, 12.0);
        spec.one_way_distance_m = 2.0;
        spec.allowed_voltage_drop_percent = 3.0;
        let display = render(&spec);
        assert_eq!(display.cable_size, "1.5 mm²");
        let sentence = display.loss_comparison.unwrap();
        assert!(sentence.starts_with("Loss over 10 h of operation: "));
        assert!(sentence.ends_with(" kWh"));
    }

    #[test]
    fn test_over_catalog_strings() {
        let mut spec = test_spec(InputMode::Power, 3000.0, 12.0);
        spec.one_way_distance_m = 10.0;
        spec.allowed_voltage_drop_percent = 3.0;
        let display = render(&spec);
        assert_eq!(display.cable_size, "> 95 mm²");
        assert_eq!(display.fuse, "320 A");
        assert_eq!(display.criteria, "Busbar or parallel conductors required");
        assert!(display.loss_watts.is_none());
    }
}
