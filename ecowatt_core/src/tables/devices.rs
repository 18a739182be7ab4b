//! Protective Device Ratings
//!
//! Standard breaker/fuse ratings (A) and the "round up to standard" helper
//! shared by every lookup that snaps a computed value onto a catalog.

/// Standard protective-device ratings (A), ascending.
pub const STANDARD_DEVICE_RATINGS_A: [f64; 15] = [
    6.0, 10.0, 16.0, 20.0, 25.0, 32.0, 40.0, 50.0, 63.0, 80.0, 100.0, 125.0, 160.0, 200.0, 250.0,
];

/// Smallest entry of an ascending table that is `>= value`.
///
/// Returns `None` when the value lies above the table (or is NaN); callers
/// decide whether that means clamp, fall back or overflow.
pub fn snap_up(ascending: &[f64], value: f64) -> Option<f64> {
    ascending.iter().copied().find(|&entry| entry >= value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_up_exact_hit() {
        assert_eq!(snap_up(&STANDARD_DEVICE_RATINGS_A, 250.0), Some(250.0));
        assert_eq!(snap_up(&STANDARD_DEVICE_RATINGS_A, 25.0), Some(25.0));
    }

    #[test]
    fn test_snap_up_rounds_to_next_entry() {
        assert_eq!(snap_up(&STANDARD_DEVICE_RATINGS_A, 25.01), Some(32.0));
        assert_eq!(snap_up(&STANDARD_DEVICE_RATINGS_A, 0.1), Some(6.0));
    }

    #[test]
    fn test_snap_up_above_table() {
        assert_eq!(snap_up(&STANDARD_DEVICE_RATINGS_A, 250.5), None);
        assert_eq!(snap_up(&STANDARD_DEVICE_RATINGS_A, f64::NAN), None);
    }
}
