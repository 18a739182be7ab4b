//! # ecowatt_core - Off-Grid Power Sizing Engine
//!
//! `ecowatt_core` holds the calculators behind EcoWatt: conductor and
//! protective-device sizing, battery runtime and capacity, load audit and
//! winter open-circuit voltage of PV strings. All inputs and outputs are
//! JSON-serializable so results can be saved into a project or handed to
//! another tool unchanged.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: pure functions, recomputed from scratch on every change
//! - **JSON-First**: all types implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//! - **Injected tables**: the standard catalog is passed by reference
//!
//! ## Quick Start
//!
//! ```rust
//! use ecowatt_core::calculations::cable::{calculate, CableDisplay, CircuitSpec, InputMode};
//! use ecowatt_core::tables::{ConductorMaterial, StandardCatalog};
//!
//! let catalog = StandardCatalog::reference();
//! let spec = CircuitSpec {
//!     system_voltage: 12.0,
//!     input_mode: InputMode::Power,
//!     input_value: 3000.0,
//!     one_way_distance_m: 10.0,
//!     allowed_voltage_drop_percent: 3.0,
//!     conductor_material: ConductorMaterial::Copper,
//! };
//!
//! let outcome = calculate(catalog, &spec).unwrap();
//! let display = CableDisplay::from_outcome(&outcome, catalog.max_cross_section());
//! assert_eq!(display.cable_size, "> 95 mm²");
//! assert_eq!(display.fuse, "320 A");
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - The four calculators
//! - [`tables`] - Standard cross-sections, ampacities and device ratings
//! - [`units`] - Type-safe unit wrappers
//! - [`fields`] - Lenient parsing of typed field values
//! - [`session`] - Event shell for interactive cable sizing
//! - [`bridge`] - Audit hand-off between calculators
//! - [`project`] - Saved projects in the shared store
//! - [`store`] - Key-value store backends
//! - [`errors`] - Structured error types

pub mod bridge;
pub mod calculations;
pub mod errors;
pub mod fields;
pub mod project;
pub mod session;
pub mod store;
pub mod tables;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use bridge::{Clock, FreshnessPolicy, HandoffRecord, HandoffStatus, SystemClock};
pub use errors::{CalcError, CalcResult};
pub use project::{ModuleKind, Project, ProjectManager};
pub use session::{CableField, CableSession};
pub use store::{KeyValueStore, MemoryStore};
pub use tables::StandardCatalog;
