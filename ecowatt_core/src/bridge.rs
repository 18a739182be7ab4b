//! # Project Data Bridge
//!
//! The load audit publishes a short-lived hand-off record that the battery
//! and cable calculators pick up to prefill their fields:
//!
//! ```json
//! { "version": "1.0", "timestamp": 1767225600000,
//!   "audit": { "total_energy_wh": 2450.0, "peak_power_watts": 1780.8 } }
//! ```
//!
//! A consumer imports the record only if it parses, carries the expected
//! version and is younger than the freshness window (12 h by default).
//! Anything else is rejected as a whole; there is no partial import.
//!
//! Time comes from an injected [`Clock`] so the window can be tested.
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use ecowatt_core::bridge::{AuditSummary, FixedClock, FreshnessPolicy, HandoffRecord, HandoffStatus};
//! use ecowatt_core::store::MemoryStore;
//!
//! let published = Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap();
//! let mut store = MemoryStore::new();
//! HandoffRecord::new(AuditSummary { total_energy_wh: 2450.0, peak_power_watts: 1780.8 }, published)
//!     .publish(&mut store)
//!     .unwrap();
//!
//! let clock = FixedClock(published + chrono::Duration::hours(2));
//! let status = FreshnessPolicy::default().read(&store, &clock).unwrap();
//! assert!(matches!(status, HandoffStatus::Accepted(_)));
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculations::load_audit::LoadAuditResult;
use crate::errors::{CalcError, CalcResult};
use crate::store::KeyValueStore;

/// Store key of the hand-off record
pub const HANDOFF_KEY: &str = "ecowatt_project";
/// Protocol version written and accepted
pub const HANDOFF_VERSION: &str = "1.0";
/// Default freshness window (hours)
pub const DEFAULT_MAX_AGE_HOURS: i64 = 12;

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Audit figures carried by the hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Daily energy (Wh)
    pub total_energy_wh: f64,
    /// Recommended inverter power, i.e. simultaneous peak with headroom (W)
    pub peak_power_watts: f64,
}

impl AuditSummary {
    /// Summary of a computed audit
    pub fn from_result(result: &LoadAuditResult) -> Self {
        AuditSummary {
            total_energy_wh: result.daily_energy_wh,
            peak_power_watts: result.inverter_recommendation_watts,
        }
    }

    /// Load power to prefill into the cable calculator, `None` if there is
    /// no positive peak
    pub fn cable_power_watts(&self) -> Option<f64> {
        (self.peak_power_watts > 0.0).then(|| self.peak_power_watts.round())
    }
}

/// The hand-off record as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoffRecord {
    pub version: String,
    /// Publication time, epoch milliseconds on the wire
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub audit: AuditSummary,
}

impl HandoffRecord {
    pub fn new(audit: AuditSummary, timestamp: DateTime<Utc>) -> Self {
        HandoffRecord {
            version: HANDOFF_VERSION.to_string(),
            timestamp,
            audit,
        }
    }

    /// Record for a computed audit, stamped with the clock's time
    pub fn from_audit(result: &LoadAuditResult, clock: &impl Clock) -> Self {
        HandoffRecord::new(AuditSummary::from_result(result), clock.now())
    }

    /// Write the record under [`HANDOFF_KEY`], replacing any previous one.
    pub fn publish<S: KeyValueStore>(&self, store: &mut S) -> CalcResult<()> {
        store.set_json(HANDOFF_KEY, self)?;
        info!(
            energy_wh = self.audit.total_energy_wh,
            peak_w = self.audit.peak_power_watts,
            "published audit hand-off"
        );
        Ok(())
    }
}

/// Why a hand-off record was not imported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// Not valid JSON or not the expected shape
    Malformed { detail: String },
    VersionMismatch { found: String, expected: String },
    /// Older than the freshness window
    Stale { age_minutes: i64, max_age_minutes: i64 },
}

/// Result of looking for a hand-off.
#[derive(Debug, Clone, PartialEq)]
pub enum HandoffStatus {
    /// Nothing published
    Missing,
    Accepted(HandoffRecord),
    Rejected(RejectReason),
}

impl HandoffStatus {
    /// The accepted record, if any
    pub fn accepted(self) -> Option<HandoffRecord> {
        match self {
            HandoffStatus::Accepted(record) => Some(record),
            _ => None,
        }
    }
}

/// Acceptance rules for hand-off records.
#[derive(Debug, Clone, PartialEq)]
pub struct FreshnessPolicy {
    pub max_age: Duration,
    pub version: String,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        FreshnessPolicy {
            max_age: Duration::hours(DEFAULT_MAX_AGE_HOURS),
            version: HANDOFF_VERSION.to_string(),
        }
    }
}

impl FreshnessPolicy {
    /// Policy with a custom window. Negative or unrepresentable hour counts
    /// are rejected.
    pub fn with_max_age_hours(hours: i64) -> CalcResult<Self> {
        let max_age = Duration::try_hours(hours)
            .filter(|age| *age >= Duration::zero())
            .ok_or_else(|| {
                CalcError::invalid_input(
                    "handoff_max_age_hours",
                    hours.to_string(),
                    "Must be a non-negative number of hours within range",
                )
            })?;
        Ok(FreshnessPolicy {
            max_age,
            ..FreshnessPolicy::default()
        })
    }

    /// Evaluate a raw stored value at time `now`.
    ///
    /// Records stamped in the future are accepted; only age beyond the
    /// window rejects.
    pub fn evaluate(&self, raw: &str, now: DateTime<Utc>) -> HandoffStatus {
        let status = self.classify(raw, now);
        if let HandoffStatus::Rejected(reason) = &status {
            warn!(?reason, "audit hand-off rejected");
        }
        status
    }

    fn classify(&self, raw: &str, now: DateTime<Utc>) -> HandoffStatus {
        let record: HandoffRecord = match serde_json::from_str(raw) {
            Ok(record) => record,
            Err(e) => {
                return HandoffStatus::Rejected(RejectReason::Malformed { detail: e.to_string() });
            }
        };

        if record.version != self.version {
            return HandoffStatus::Rejected(RejectReason::VersionMismatch {
                found: record.version,
                expected: self.version.clone(),
            });
        }

        let age = now - record.timestamp;
        if age > self.max_age {
            return HandoffStatus::Rejected(RejectReason::Stale {
                age_minutes: age.num_minutes(),
                max_age_minutes: self.max_age.num_minutes(),
            });
        }

        HandoffStatus::Accepted(record)
    }

    /// Look up [`HANDOFF_KEY`] in a store and evaluate it.
    pub fn read<S: KeyValueStore, C: Clock>(&self, store: &S, clock: &C) -> CalcResult<HandoffStatus> {
        Ok(match store.get(HANDOFF_KEY)? {
            Some(raw) => self.evaluate(&raw, clock.now()),
            None => HandoffStatus::Missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::load_audit::{ApplianceRow, LoadAuditInput};
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn published() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()
    }

    fn record() -> HandoffRecord {
        HandoffRecord::new(
            AuditSummary {
                total_energy_wh: 2450.0,
                peak_power_watts: 1780.8,
            },
            published(),
        )
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["version"], "1.0");
        assert_eq!(json["timestamp"], published().timestamp_millis());
        assert_eq!(json["audit"]["total_energy_wh"], 2450.0);
        assert_eq!(json["audit"]["peak_power_watts"], 1780.8);
    }

    #[test]
    fn test_accepts_within_window() {
        let raw = serde_json::to_string(&record()).unwrap();
        let policy = FreshnessPolicy::default();

        let status = policy.evaluate(&raw, published() + Duration::hours(11));
        assert_eq!(status, HandoffStatus::Accepted(record()));

        // Exactly at the limit is still fresh
        let status = policy.evaluate(&raw, published() + Duration::hours(12));
        assert!(matches!(status, HandoffStatus::Accepted(_)));
    }

    #[test]
    fn test_rejects_stale() {
        let raw = serde_json::to_string(&record()).unwrap();
        let status = FreshnessPolicy::default().evaluate(&raw, published() + Duration::hours(13));
        assert_eq!(
            status,
            HandoffStatus::Rejected(RejectReason::Stale {
                age_minutes: 780,
                max_age_minutes: 720,
            })
        );
    }

    #[test]
    fn test_future_timestamp_accepted() {
        let raw = serde_json::to_string(&record()).unwrap();
        let status = FreshnessPolicy::default().evaluate(&raw, published() - Duration::hours(3));
        assert!(matches!(status, HandoffStatus::Accepted(_)));
    }

    #[test]
    fn test_rejects_wrong_version() {
        let mut old = record();
        old.version = "0.9".to_string();
        let raw = serde_json::to_string(&old).unwrap();
        let status = FreshnessPolicy::default().evaluate(&raw, published());
        assert!(matches!(
            status,
            HandoffStatus::Rejected(RejectReason::VersionMismatch { ref found, .. }) if found == "0.9"
        ));
    }

    #[test]
    fn test_rejects_malformed() {
        let policy = FreshnessPolicy::default();
        for raw in ["", "{", "{\"version\":\"1.0\"}", "{\"version\":\"1.0\",\"timestamp\":\"yesterday\",\"audit\":{}}"] {
            assert!(matches!(
                policy.evaluate(raw, published()),
                HandoffStatus::Rejected(RejectReason::Malformed { .. })
            ));
        }
    }

    #[test]
    fn test_custom_window() {
        let raw = serde_json::to_string(&record()).unwrap();
        let policy = FreshnessPolicy::with_max_age_hours(1).unwrap();
        assert!(matches!(
            policy.evaluate(&raw, published() + Duration::minutes(90)),
            HandoffStatus::Rejected(RejectReason::Stale { .. })
        ));
    }

    #[test]
    fn test_out_of_range_window_is_rejected() {
        let err = FreshnessPolicy::with_max_age_hours(10_i64.pow(16)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(FreshnessPolicy::with_max_age_hours(-1).is_err());
        assert_eq!(
            FreshnessPolicy::with_max_age_hours(DEFAULT_MAX_AGE_HOURS).unwrap(),
            FreshnessPolicy::default()
        );
    }

    #[test]
    fn test_publish_and_read_through_store() {
        let mut store = MemoryStore::new();
        let clock = FixedClock(published() + Duration::hours(1));
        let policy = FreshnessPolicy::default();

        assert_eq!(policy.read(&store, &clock).unwrap(), HandoffStatus::Missing);

        record().publish(&mut store).unwrap();
        let accepted = policy.read(&store, &clock).unwrap().accepted().unwrap();
        assert_eq!(accepted.audit.cable_power_watts(), Some(1781.0));
    }

    #[test]
    fn test_from_audit_uses_inverter_power() {
        let input = LoadAuditInput {
            rows: vec![ApplianceRow::new("Pump", 1000.0, 1.0, 2.0)],
            simultaneity_factor: 1.0,
        };
        let handoff = HandoffRecord::from_audit(&input.calculate(), &FixedClock(published()));
        assert_eq!(handoff.version, HANDOFF_VERSION);
        assert_eq!(handoff.timestamp, published());
        assert!((handoff.audit.total_energy_wh - 2000.0).abs() < 1e-9);
        assert!((handoff.audit.peak_power_watts - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_cable_prefill_without_peak() {
        let summary = AuditSummary {
            total_energy_wh: 100.0,
            peak_power_watts: 0.0,
        };
        assert_eq!(summary.cable_power_watts(), None);
    }
}
