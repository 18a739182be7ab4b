//! Protective device selection.
//!
//! The device is sized at 125% of the load current (continuous duty) and
//! snapped up to the next standard rating. Above the catalog the target is
//! rounded up to the next multiple of 10 A; that value is advisory only and
//! is flagged as non-standard.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::tables::{snap_up, StandardCatalog};
use crate::units::Amps;

/// Continuous-duty margin applied to the load current
pub const DEVICE_MARGIN: f64 = 1.25;

/// Selected protective device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceRating {
    /// Rating in amperes
    pub amps: f64,
    /// Margin-adjusted target the rating was chosen for
    pub target_amps: f64,
    /// `false` when the rating came from the round-up fallback and is not a
    /// catalog part
    pub standard: bool,
}

/// Margin-adjusted device target for a load current
pub fn device_target(load: Amps) -> f64 {
    load.0 * DEVICE_MARGIN
}

/// Select a protective device rating for a load current.
pub fn select(catalog: &StandardCatalog, load: Amps) -> DeviceRating {
    let target = device_target(load);
    match snap_up(catalog.device_ratings(), target) {
        Some(amps) => DeviceRating {
            amps,
            target_amps: target,
            standard: true,
        },
        None => {
            let amps = (target / 10.0).ceil() * 10.0;
            warn!(target, amps, "device target above catalog, using non-standard rating");
            DeviceRating {
                amps,
                target_amps: target,
                standard: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_and_snap() {
        let rating = select(StandardCatalog::reference(), Amps(20.0));
        assert_eq!(rating.target_amps, 25.0);
        assert_eq!(rating.amps, 25.0);
        assert!(rating.standard);

        let rating = select(StandardCatalog::reference(), Amps(21.0));
        assert_eq!(rating.amps, 32.0);
    }

    #[test]
    fn test_boundary_exact_catalog_top() {
        // 200 A * 1.25 = 250 A, an exact catalog hit
        let rating = select(StandardCatalog::reference(), Amps(200.0));
        assert_eq!(rating.amps, 250.0);
        assert!(rating.standard);
    }

    #[test]
    fn test_fallback_rounds_up_to_ten() {
        // 250 A * 1.25 = 312.5 A, above the catalog
        let rating = select(StandardCatalog::reference(), Amps(250.0));
        assert_eq!(rating.amps, 320.0);
        assert!(!rating.standard);

        // just above the top rating
        let rating = select(StandardCatalog::reference(), Amps(204.0));
        assert_eq!(rating.target_amps, 255.0);
        assert_eq!(rating.amps, 260.0);
    }

    #[test]
    fn test_small_load_gets_smallest_rating() {
        let rating = select(StandardCatalog::reference(), Amps(0.5));
        assert_eq!(rating.amps, 6.0);
    }
}
