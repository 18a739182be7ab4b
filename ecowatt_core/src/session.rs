//! # Cable Sizing Session
//!
//! Event shell around the cable engine. It holds the raw text of every
//! field, and each mutation re-parses all fields and recomputes the whole
//! outcome from scratch. Nothing is cached between events.
//!
//! The session is also where the engine meets the shared store: it imports
//! the audit hand-off, restores a saved cable payload from the active
//! project and exports its display strings back.
//!
//! ## Example
//!
//! ```rust
//! use ecowatt_core::session::{CableField, CableSession};
//! use ecowatt_core::calculations::cable::InputMode;
//! use ecowatt_core::tables::StandardCatalog;
//!
//! let mut session = CableSession::new(StandardCatalog::reference());
//! session.set_field(CableField::Voltage, "48");
//! session.set_mode(InputMode::Current);
//! session.set_field(CableField::Value, "20");
//! session.set_field(CableField::Distance, "30");
//! session.set_field(CableField::Drop, "2");
//! assert_eq!(session.display().cable_size, "25 mm²");
//! assert_eq!(session.display().fuse, "25 A");
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bridge::{Clock, HandoffStatus};
use crate::calculations::cable::{calculate, CableDisplay, CircuitSpec, InputMode, SizingOutcome};
use crate::errors::{CalcError, CalcResult};
use crate::fields::{format_number, parse_number};
use crate::project::{ModuleKind, ProjectManager};
use crate::store::KeyValueStore;
use crate::tables::{ConductorMaterial, StandardCatalog};

/// Initial system voltage field
pub const DEFAULT_VOLTAGE_FIELD: &str = "12";
/// Initial allowed drop field (%)
pub const DEFAULT_DROP_FIELD: &str = "3";

/// Where the load value field came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// Typed in this session
    #[default]
    Manual,
    /// Prefilled from the load audit hand-off
    Audit,
    /// Restored from the active project
    Project,
}

impl FieldSource {
    /// Badge shown next to the field, if any
    pub fn badge(&self) -> Option<&'static str> {
        match self {
            FieldSource::Manual => None,
            FieldSource::Audit => Some("(from audit)"),
            FieldSource::Project => Some("(from project)"),
        }
    }
}

/// Free-text fields of the cable calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CableField {
    Voltage,
    /// Load power or current, depending on the input mode
    Value,
    Distance,
    Drop,
}

impl CableField {
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "voltage" | "v" => Ok(CableField::Voltage),
            "value" | "power" | "current" | "load" => Ok(CableField::Value),
            "distance" | "dist" | "length" => Ok(CableField::Distance),
            "drop" | "loss" | "loss_percent" => Ok(CableField::Drop),
            _ => Err(CalcError::invalid_input(
                "field",
                s,
                "Expected voltage, value, distance or drop",
            )),
        }
    }
}

/// Raw field contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableFields {
    pub voltage: String,
    pub value: String,
    pub distance: String,
    pub drop_percent: String,
    pub material: ConductorMaterial,
    pub mode: InputMode,
}

impl Default for CableFields {
    fn default() -> Self {
        CableFields {
            voltage: DEFAULT_VOLTAGE_FIELD.to_string(),
            value: String::new(),
            distance: String::new(),
            drop_percent: DEFAULT_DROP_FIELD.to_string(),
            material: ConductorMaterial::Copper,
            mode: InputMode::Power,
        }
    }
}

impl CableFields {
    /// Parse the text fields into an engine spec. Unparseable text is zero.
    pub fn to_spec(&self) -> CircuitSpec {
        CircuitSpec {
            system_voltage: parse_number(&self.voltage, 0.0),
            input_mode: self.mode,
            input_value: parse_number(&self.value, 0.0),
            one_way_distance_m: parse_number(&self.distance, 0.0),
            allowed_voltage_drop_percent: parse_number(&self.drop_percent, 0.0),
            conductor_material: self.material,
        }
    }

    fn field_mut(&mut self, field: CableField) -> &mut String {
        match field {
            CableField::Voltage => &mut self.voltage,
            CableField::Value => &mut self.value,
            CableField::Distance => &mut self.distance,
            CableField::Drop => &mut self.drop_percent,
        }
    }
}

fn default_mode() -> String {
    InputMode::Power.code().to_string()
}

fn default_drop() -> String {
    DEFAULT_DROP_FIELD.to_string()
}

/// Cable module payload saved into the project store.
///
/// Inputs are kept as typed, outputs as displayed. `mode` and
/// `loss_percent` were added after the first seven keys: readers that only
/// know `voltage/power/dist/mat/cable_size/fuse/loss` ignore them, and
/// payloads written without them read back as watts and 3 %.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CablePayload {
    pub voltage: String,
    /// Load value (W or A, see `mode`)
    pub power: String,
    pub dist: String,
    pub mat: String,
    pub cable_size: String,
    pub fuse: String,
    pub loss: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_drop")]
    pub loss_percent: String,
}

/// Interactive cable sizing state.
pub struct CableSession<'a> {
    catalog: &'a StandardCatalog,
    fields: CableFields,
    value_source: FieldSource,
    outcome: SizingOutcome,
    error: Option<CalcError>,
    display: CableDisplay,
}

impl<'a> CableSession<'a> {
    /// Session with default fields, already computed
    pub fn new(catalog: &'a StandardCatalog) -> Self {
        CableSession::with_fields(catalog, CableFields::default())
    }

    pub fn with_fields(catalog: &'a StandardCatalog, fields: CableFields) -> Self {
        let outcome = SizingOutcome::InsufficientInput;
        let display = CableDisplay::from_outcome(&outcome, catalog.max_cross_section());
        let mut session = CableSession {
            catalog,
            fields,
            value_source: FieldSource::Manual,
            outcome,
            error: None,
            display,
        };
        session.recompute();
        session
    }

    pub fn fields(&self) -> &CableFields {
        &self.fields
    }

    pub fn outcome(&self) -> &SizingOutcome {
        &self.outcome
    }

    pub fn display(&self) -> &CableDisplay {
        &self.display
    }

    /// Structural input error of the last recompute, if any
    pub fn error(&self) -> Option<&CalcError> {
        self.error.as_ref()
    }

    pub fn value_source(&self) -> FieldSource {
        self.value_source
    }

    /// Set a text field and recompute. Typing into the value field clears
    /// its source badge.
    pub fn set_field(&mut self, field: CableField, raw: &str) {
        *self.fields.field_mut(field) = raw.to_string();
        if field == CableField::Value {
            self.value_source = FieldSource::Manual;
        }
        self.recompute();
    }

    pub fn set_material(&mut self, material: ConductorMaterial) {
        self.fields.material = material;
        self.recompute();
    }

    pub fn set_mode(&mut self, mode: InputMode) {
        self.fields.mode = mode;
        self.recompute();
    }

    /// Re-run the engine on the current fields.
    pub fn recompute(&mut self) {
        let spec = self.fields.to_spec();
        match calculate(self.catalog, &spec) {
            Ok(outcome) => {
                self.outcome = outcome;
                self.error = None;
            }
            Err(e) => {
                debug!(error = %e, "cable inputs rejected");
                self.outcome = SizingOutcome::InsufficientInput;
                self.error = Some(e);
            }
        }
        self.display = CableDisplay::from_outcome(&self.outcome, self.catalog.max_cross_section());
    }

    /// Prefill the load from an accepted audit hand-off.
    ///
    /// Switches to power input and tags the field as audit-sourced. Returns
    /// whether anything was imported.
    pub fn import_handoff(&mut self, status: HandoffStatus) -> bool {
        let Some(record) = status.accepted() else {
            return false;
        };
        let Some(watts) = record.audit.cable_power_watts() else {
            return false;
        };

        self.fields.mode = InputMode::Power;
        self.fields.value = format_number(watts);
        self.value_source = FieldSource::Audit;
        self.recompute();
        info!(watts, "cable load prefilled from audit");
        true
    }

    /// Current inputs and display strings as a project payload
    pub fn export_payload(&self) -> CablePayload {
        CablePayload {
            voltage: self.fields.voltage.clone(),
            power: self.fields.value.clone(),
            dist: self.fields.distance.clone(),
            mat: self.fields.material.code().to_string(),
            cable_size: self.display.cable_size.clone(),
            fuse: self.display.fuse.clone(),
            loss: self.display.loss_or_placeholder().to_string(),
            mode: self.fields.mode.code().to_string(),
            loss_percent: self.fields.drop_percent.clone(),
        }
    }

    /// Restore inputs from a saved payload and recompute. Saved outputs are
    /// not trusted; they are regenerated.
    pub fn apply_payload(&mut self, payload: &CablePayload) {
        self.fields = CableFields {
            voltage: payload.voltage.clone(),
            value: payload.power.clone(),
            distance: payload.dist.clone(),
            drop_percent: payload.loss_percent.clone(),
            material: ConductorMaterial::from_str_flexible(&payload.mat).unwrap_or_default(),
            mode: InputMode::from_str_flexible(&payload.mode).unwrap_or_default(),
        };
        self.value_source = FieldSource::Project;
        self.recompute();
    }

    /// Write the payload into the active project's cable slot.
    pub fn save_to_project<S: KeyValueStore, C: Clock>(&self, manager: &mut ProjectManager<S, C>) -> CalcResult<()> {
        let payload = serde_json::to_value(self.export_payload()).map_err(CalcError::serialization)?;
        manager.update_module_data(ModuleKind::Cable, payload)
    }

    /// Restore from the active project's cable slot. Returns `false` when
    /// the project has no cable payload.
    pub fn restore_from_project<S: KeyValueStore, C: Clock>(
        &mut self,
        manager: &ProjectManager<S, C>,
    ) -> CalcResult<bool> {
        let active = manager.active_project()?;
        if !active.data.has(ModuleKind::Cable) {
            return Ok(false);
        }
        let payload: CablePayload =
            serde_json::from_value(active.data.cable).map_err(CalcError::serialization)?;
        self.apply_payload(&payload);
        info!(project = %active.name, "cable inputs restored from project");
        Ok(true)
    }
}
