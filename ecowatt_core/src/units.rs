//! # Unit Types
//!
//! Type-safe wrappers for the electrical units the calculators exchange.
//! These are plain `f64` newtypes: JSON stays clean (just numbers) and the
//! compiler catches watts-for-amps mix-ups at the module seams.
//!
//! ## SI Units
//!
//! - Potential: volts (V)
//! - Current: amperes (A)
//! - Power: watts (W), kilowatts (kW)
//! - Energy: watt-hours (Wh), kilowatt-hours (kWh)
//! - Length: meters (m)
//! - Conductor cross-section: square millimeters (mm²)
//! - Resistance: ohms (Ω)
//!
//! ## Example
//!
//! ```rust
//! use ecowatt_core::units::{Amps, KilowattHours, Volts, WattHours, Watts};
//!
//! let current: Amps = Watts(3000.0) / Volts(12.0);
//! assert_eq!(current.0, 250.0);
//!
//! let energy: KilowattHours = WattHours(1500.0).into();
//! assert_eq!(energy.0, 1.5);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Electrical Quantities
// ============================================================================

/// Electric potential in volts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volts(pub f64);

/// Current in amperes
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amps(pub f64);

/// Resistance in ohms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ohms(pub f64);

// ============================================================================
// Power and Energy
// ============================================================================

/// Power in watts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watts(pub f64);

/// Power in kilowatts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilowatts(pub f64);

/// Energy in watt-hours
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WattHours(pub f64);

/// Energy in kilowatt-hours
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KilowattHours(pub f64);

impl From<Watts> for Kilowatts {
    fn from(w: Watts) -> Self {
        Kilowatts(w.0 / 1000.0)
    }
}

impl From<Kilowatts> for Watts {
    fn from(kw: Kilowatts) -> Self {
        Watts(kw.0 * 1000.0)
    }
}

impl From<WattHours> for KilowattHours {
    fn from(wh: WattHours) -> Self {
        KilowattHours(wh.0 / 1000.0)
    }
}

impl From<KilowattHours> for WattHours {
    fn from(kwh: KilowattHours) -> Self {
        WattHours(kwh.0 * 1000.0)
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Conductor cross-section in square millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqMm(pub f64);

// ============================================================================
// Physical Relations
// ============================================================================

/// I = P / U
impl Div<Volts> for Watts {
    type Output = Amps;
    fn div(self, rhs: Volts) -> Amps {
        Amps(self.0 / rhs.0)
    }
}

/// P = U * I
impl Mul<Amps> for Volts {
    type Output = Watts;
    fn mul(self, rhs: Amps) -> Watts {
        Watts(self.0 * rhs.0)
    }
}

impl Watts {
    /// Energy drawn at this power over `hours`
    pub fn over_hours(self, hours: f64) -> WattHours {
        WattHours(self.0 * hours)
    }
}

impl Amps {
    /// Resistive dissipation P = I²R
    pub fn dissipation_in(self, resistance: Ohms) -> Watts {
        Watts(self.0 * self.0 * resistance.0)
    }
}

impl Ohms {
    /// Resistance of a conductor run: R = L·ρ / S
    ///
    /// `resistivity` is in Ω·mm²/m, so the result comes out directly in ohms.
    pub fn of_conductor(length: Meters, resistivity: f64, section: SqMm) -> Self {
        Ohms((length.0 * resistivity) / section.0)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Volts);
impl_arithmetic!(Amps);
impl_arithmetic!(Ohms);
impl_arithmetic!(Watts);
impl_arithmetic!(Kilowatts);
impl_arithmetic!(WattHours);
impl_arithmetic!(KilowattHours);
impl_arithmetic!(Meters);
impl_arithmetic!(SqMm);
