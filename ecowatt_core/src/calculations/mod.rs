//! # Sizing Calculators
//!
//! One module per calculator. Each follows the pattern:
//!
//! - `*Input` / spec type - input parameters (JSON-serializable)
//! - `*Result` - calculation results (JSON-serializable)
//! - `calculate(...)` - pure function, re-run on every field change
//! - a [`ModuleOutput`] headline/subtext pair for display
//!
//! The calculators never call each other. Data moves between them only
//! through the shared project store (see [`crate::bridge`] and
//! [`crate::project`]).
//!
//! ## Available Calculations
//!
//! - [`cable`] - Conductor and protective-device sizing
//! - [`battery`] - Battery runtime and capacity sizing
//! - [`load_audit`] - Appliance load audit (inverter and daily energy)
//! - [`winter_voc`] - Cold-weather open-circuit voltage of PV strings

pub mod battery;
pub mod cable;
pub mod load_audit;
pub mod winter_voc;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use battery::{BatteryInput, BatteryResult};
pub use cable::{CircuitSpec, SizingOutcome, SizingResult};
pub use load_audit::{LoadAuditInput, LoadAuditResult};
pub use winter_voc::{WinterVocInput, WinterVocResult};

/// Headline value plus explanatory subtext, the display contract every
/// calculator exposes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleOutput {
    /// Main figure, e.g. "25 mm²" or "7 h 12 min"
    pub headline: String,
    /// Explanation below the figure
    pub subtext: String,
}

impl ModuleOutput {
    /// Placeholder shown while required fields are empty
    pub fn placeholder(subtext: impl Into<String>) -> Self {
        ModuleOutput {
            headline: "--".to_string(),
            subtext: subtext.into(),
        }
    }

    /// Whether this is a placeholder rather than a computed figure
    pub fn is_placeholder(&self) -> bool {
        self.headline.starts_with("--")
    }
}
