//! Load normalization: power-or-current input to a single load current.

use crate::units::{Amps, Volts, Watts};

use super::{CircuitSpec, InputMode};

/// Whether the spec carries enough information to size anything.
///
/// A zero, negative or non-finite load value or distance means the engine
/// must show its placeholder instead of numbers.
pub fn has_sufficient_input(spec: &CircuitSpec) -> bool {
    spec.input_value.is_finite()
        && spec.input_value > 0.0
        && spec.one_way_distance_m.is_finite()
        && spec.one_way_distance_m > 0.0
}

/// Load current in amperes.
///
/// Power mode divides by the system voltage; current mode passes through.
pub fn load_current(spec: &CircuitSpec) -> Amps {
    match spec.input_mode {
        InputMode::Power => Watts(spec.input_value) / Volts(spec.system_voltage),
        InputMode::Current => Amps(spec.input_value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::cable::test_spec;

    #[test]
    fn test_power_mode_divides_by_voltage() {
        let spec = test_spec(InputMode::Power, 3000.0, 12.0);
        assert_eq!(load_current(&spec), Amps(250.0));
    }

    #[test]
    fn test_current_mode_passes_through() {
        let spec = test_spec(InputMode::Current, 20.0, 48.0);
        assert_eq!(load_current(&spec), Amps(20.0));
    }

    #[test]
    fn test_guard_rejects_zero_value_and_distance() {
        let mut spec = test_spec(InputMode::Current, 0.0, 48.0);
        assert!(!has_sufficient_input(&spec));

        spec.input_value = 10.0;
        spec.one_way_distance_m = 0.0;
        assert!(!has_sufficient_input(&spec));

        spec.one_way_distance_m = -3.0;
        assert!(!has_sufficient_input(&spec));

        spec.one_way_distance_m = 5.0;
        assert!(has_sufficient_input(&spec));
    }
}
