//! # Projects
//!
//! A project bundles the saved state of every calculator for one client.
//! Projects live in the shared key-value store:
//!
//! - [`DB_KEY`]: JSON array of all saved projects
//! - [`ACTIVE_KEY`]: the working session, which calculators write into
//!   and which is copied into the collection on save
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── id: epoch milliseconds at creation
//! ├── name
//! ├── updatedAt: epoch milliseconds of the last save
//! └── data: ModuleData { audit, battery, cable, winter } (opaque JSON each)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ecowatt_core::bridge::SystemClock;
//! use ecowatt_core::project::{ModuleKind, ProjectManager};
//! use ecowatt_core::store::MemoryStore;
//!
//! let mut manager = ProjectManager::new(MemoryStore::new(), SystemClock);
//! manager.start_project("Cabin Smith").unwrap();
//! manager
//!     .update_module_data(ModuleKind::Cable, serde_json::json!({ "cable_size": "25 mm²" }))
//!     .unwrap();
//! let saved = manager.save_active().unwrap();
//! assert_eq!(manager.all_projects().unwrap()[0].id, saved.id);
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::bridge::Clock;
use crate::errors::{CalcError, CalcResult};
use crate::store::KeyValueStore;

/// Store key of the saved project collection
pub const DB_KEY: &str = "ecowatt_db_v1";
/// Store key of the working session
pub const ACTIVE_KEY: &str = "ecowatt_active_project";
/// Name of the session template used when nothing is active
pub const DEFAULT_PROJECT_NAME: &str = "New project";
/// Name given to a template created without one
pub const UNTITLED_PROJECT_NAME: &str = "Untitled";

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Saved state of each calculator. Payloads are opaque to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleData {
    #[serde(default = "empty_object")]
    pub audit: Value,
    #[serde(default = "empty_object")]
    pub battery: Value,
    #[serde(default = "empty_object")]
    pub cable: Value,
    #[serde(default = "empty_object")]
    pub winter: Value,
}

impl Default for ModuleData {
    fn default() -> Self {
        ModuleData {
            audit: empty_object(),
            battery: empty_object(),
            cable: empty_object(),
            winter: empty_object(),
        }
    }
}

impl ModuleData {
    pub fn get(&self, kind: ModuleKind) -> &Value {
        match kind {
            ModuleKind::Audit => &self.audit,
            ModuleKind::Battery => &self.battery,
            ModuleKind::Cable => &self.cable,
            ModuleKind::Winter => &self.winter,
        }
    }

    pub fn set(&mut self, kind: ModuleKind, value: Value) {
        match kind {
            ModuleKind::Audit => self.audit = value,
            ModuleKind::Battery => self.battery = value,
            ModuleKind::Cable => self.cable = value,
            ModuleKind::Winter => self.winter = value,
        }
    }

    /// Whether a module has saved anything
    pub fn has(&self, kind: ModuleKind) -> bool {
        match self.get(kind) {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            _ => true,
        }
    }
}

/// Calculator whose payload is addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Audit,
    Battery,
    Cable,
    Winter,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 4] = [ModuleKind::Audit, ModuleKind::Battery, ModuleKind::Cable, ModuleKind::Winter];

    /// Field name inside `data`
    pub fn key(&self) -> &'static str {
        match self {
            ModuleKind::Audit => "audit",
            ModuleKind::Battery => "battery",
            ModuleKind::Cable => "cable",
            ModuleKind::Winter => "winter",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModuleKind::Audit => "Load audit",
            ModuleKind::Battery => "Battery",
            ModuleKind::Cable => "Cable & protection",
            ModuleKind::Winter => "Winter Voc",
        }
    }

    pub fn from_str_flexible(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        ModuleKind::ALL.into_iter().find(|kind| kind.key() == s)
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One client project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Creation time in epoch milliseconds, doubles as the identifier
    pub id: i64,
    pub name: String,
    #[serde(rename = "updatedAt", with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub data: ModuleData,
}

impl Project {
    /// Empty project created at `now`
    pub fn template(name: &str, now: DateTime<Utc>) -> Self {
        let name = name.trim();
        Project {
            id: now.timestamp_millis(),
            name: if name.is_empty() {
                UNTITLED_PROJECT_NAME.to_string()
            } else {
                name.to_string()
            },
            updated_at: now,
            data: ModuleData::default(),
        }
    }
}

/// Project operations over a key-value store.
pub struct ProjectManager<S: KeyValueStore, C: Clock> {
    store: S,
    clock: C,
}

impl<S: KeyValueStore, C: Clock> ProjectManager<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        ProjectManager { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// All saved projects, in save order
    pub fn all_projects(&self) -> CalcResult<Vec<Project>> {
        Ok(self.store.get_json(DB_KEY)?.unwrap_or_default())
    }

    /// The working session, or a fresh template if there is none
    pub fn active_project(&self) -> CalcResult<Project> {
        match self.store.get_json(ACTIVE_KEY)? {
            Some(project) => Ok(project),
            None => Ok(self.create_template(DEFAULT_PROJECT_NAME)),
        }
    }

    /// A new empty project. Nothing is written.
    pub fn create_template(&self, name: &str) -> Project {
        Project::template(name, self.clock.now())
    }

    /// Make a new empty project the working session.
    pub fn start_project(&mut self, name: &str) -> CalcResult<Project> {
        let project = self.create_template(name);
        self.store.set_json(ACTIVE_KEY, &project)?;
        info!(id = project.id, name = %project.name, "started project");
        Ok(project)
    }

    /// Copy the working session into the collection, replacing a saved
    /// project with the same id.
    pub fn save_active(&mut self) -> CalcResult<Project> {
        let mut active = self.active_project()?;
        active.updated_at = self.clock.now();

        let mut projects = self.all_projects()?;
        match projects.iter_mut().find(|p| p.id == active.id) {
            Some(existing) => *existing = active.clone(),
            None => projects.push(active.clone()),
        }

        self.store.set_json(DB_KEY, &projects)?;
        self.store.set_json(ACTIVE_KEY, &active)?;
        info!(id = active.id, name = %active.name, total = projects.len(), "saved project");
        Ok(active)
    }

    /// Make a saved project the working session.
    pub fn load_project(&mut self, id: i64) -> CalcResult<Project> {
        let project = self
            .all_projects()?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(CalcError::ProjectNotFound { id })?;
        self.store.set_json(ACTIVE_KEY, &project)?;
        info!(id, name = %project.name, "loaded project");
        Ok(project)
    }

    /// Replace one calculator's payload in the working session.
    pub fn update_module_data(&mut self, kind: ModuleKind, value: Value) -> CalcResult<()> {
        let mut active = self.active_project()?;
        active.data.set(kind, value);
        self.store.set_json(ACTIVE_KEY, &active)?;
        info!(module = kind.key(), "module data updated in session");
        Ok(())
    }

    /// Delete a saved project. Returns whether anything was removed.
    pub fn delete_project(&mut self, id: i64) -> CalcResult<bool> {
        let mut projects = self.all_projects()?;
        let before = projects.len();
        projects.retain(|p| p.id != id);
        if projects.len() == before {
            return Ok(false);
        }
        self.store.set_json(DB_KEY, &projects)?;
        info!(id, "deleted project");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::FixedClock;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap()
    }

    fn manager_at(now: DateTime<Utc>) -> ProjectManager<MemoryStore, FixedClock> {
        ProjectManager::new(MemoryStore::new(), FixedClock(now))
    }

    #[test]
    fn test_active_defaults_to_template() {
        let manager = manager_at(t0());
        let active = manager.active_project().unwrap();
        assert_eq!(active.name, "New project");
        assert_eq!(active.id, t0().timestamp_millis());
        assert!(!active.data.has(ModuleKind::Cable));
        // Reading does not write
        assert!(manager.store().is_empty());
    }

    #[test]
    fn test_template_name_fallback() {
        assert_eq!(Project::template("  ", t0()).name, "Untitled");
        assert_eq!(Project::template(" Cabin ", t0()).name, "Cabin");
    }

    #[test]
    fn test_wire_format() {
        let mut project = Project::template("Cabin", t0());
        project.data.set(ModuleKind::Cable, json!({ "fuse": "25 A" }));
        let value = serde_json::to_value(&project).unwrap();
        assert_eq!(value["id"], t0().timestamp_millis());
        assert_eq!(value["updatedAt"], t0().timestamp_millis());
        assert_eq!(value["data"]["cable"]["fuse"], "25 A");
        assert_eq!(value["data"]["audit"], json!({}));

        // Payloads missing from older saves default to empty objects
        let raw = r#"{"id":1,"name":"Old","updatedAt":2,"data":{"cable":{"fuse":"6 A"}}}"#;
        let old: Project = serde_json::from_str(raw).unwrap();
        assert!(old.data.has(ModuleKind::Cable));
        assert!(!old.data.has(ModuleKind::Winter));
    }

    #[test]
    fn test_save_inserts_then_replaces() {
        let mut manager = manager_at(t0());
        let started = manager.start_project("Cabin").unwrap();

        manager
            .update_module_data(ModuleKind::Battery, json!({ "result_main": "~ 107 Ah" }))
            .unwrap();
        let first = manager.save_active().unwrap();
        assert_eq!(first.id, started.id);
        assert_eq!(manager.all_projects().unwrap().len(), 1);

        manager.clock = FixedClock(t0() + Duration::minutes(5));
        manager
            .update_module_data(ModuleKind::Battery, json!({ "result_main": "~ 120 Ah" }))
            .unwrap();
        let second = manager.save_active().unwrap();

        let projects = manager.all_projects().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].data.battery["result_main"], "~ 120 Ah");
        assert_eq!(second.updated_at, t0() + Duration::minutes(5));
        assert_eq!(manager.active_project().unwrap(), second);
    }

    #[test]
    fn test_load_project_switches_session() {
        let mut manager = manager_at(t0());
        manager.start_project("First").unwrap();
        let first = manager.save_active().unwrap();

        manager.clock = FixedClock(t0() + Duration::seconds(1));
        manager.start_project("Second").unwrap();
        manager.save_active().unwrap();
        assert_eq!(manager.active_project().unwrap().name, "Second");

        let loaded = manager.load_project(first.id).unwrap();
        assert_eq!(loaded.name, "First");
        assert_eq!(manager.active_project().unwrap().id, first.id);

        let err = manager.load_project(42).unwrap_err();
        assert_eq!(err, CalcError::ProjectNotFound { id: 42 });
    }

    #[test]
    fn test_update_without_session_creates_one() {
        let mut manager = manager_at(t0());
        manager
            .update_module_data(ModuleKind::Winter, json!({ "voc": "49.5" }))
            .unwrap();
        let active = manager.active_project().unwrap();
        assert_eq!(active.name, "New project");
        assert!(active.data.has(ModuleKind::Winter));
        // Session only; the collection is untouched
        assert!(manager.all_projects().unwrap().is_empty());
    }

    #[test]
    fn test_delete_project() {
        let mut manager = manager_at(t0());
        manager.start_project("Doomed").unwrap();
        let saved = manager.save_active().unwrap();

        assert!(manager.delete_project(saved.id).unwrap());
        assert!(!manager.delete_project(saved.id).unwrap());
        assert!(manager.all_projects().unwrap().is_empty());
    }

    #[test]
    fn test_module_kind_parsing() {
        assert_eq!(ModuleKind::from_str_flexible(" Cable "), Some(ModuleKind::Cable));
        assert_eq!(ModuleKind::from_str_flexible("report"), None);
    }
}
