//! # Field Parsing
//!
//! Lenient parsing of user-typed numeric fields. A calculator must always
//! render something coherent, so parsing never fails: empty or unparseable
//! text becomes the field's documented default.
//!
//! Decimal commas are accepted ("3,5" is 3.5). Only the leading number is
//! read and anything after it is ignored ("12 V" is 12, "10 m 5" is 10).
//! Text that does not start with a number falls back to the default.
//!
//! ```rust
//! use ecowatt_core::fields::parse_number;
//!
//! assert_eq!(parse_number("3,5", 0.0), 3.5);
//! assert_eq!(parse_number("12 V", 0.0), 12.0);
//! assert_eq!(parse_number("1.5e3", 0.0), 1500.0);
//! assert_eq!(parse_number("", 12.0), 12.0);
//! assert_eq!(parse_number("abc", 0.7), 0.7);
//! ```

/// Parse a numeric field, falling back to `default`.
pub fn parse_number(raw: &str, default: f64) -> f64 {
    let normalized = raw.trim().replace(',', ".");
    let prefix = &normalized[..numeric_prefix_len(&normalized)];

    match prefix.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => default,
    }
}

/// Byte length of the longest leading `[+-]digits[.digits][e[+-]digits]`.
/// Zero when the text has no mantissa digit before anything else.
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let integer_end = digits_from(end);
    let mut mantissa_digits = integer_end > end;
    end = integer_end;

    if bytes.get(end) == Some(&b'.') {
        let fraction_end = digits_from(end + 1);
        mantissa_digits |= fraction_end > end + 1;
        end = fraction_end;
    }
    if !mantissa_digits {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let exponent_end = digits_from(exponent);
        if exponent_end > exponent {
            end = exponent_end;
        }
    }
    end
}

/// Format a number the way it was typed back into a field: integers without
/// a decimal point, everything else in shortest form.
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_number("48", 0.0), 48.0);
        assert_eq!(parse_number("  -25 ", 0.0), -25.0);
        assert_eq!(parse_number("0.35", 0.0), 0.35);
    }

    #[test]
    fn test_garbage_falls_back() {
        assert_eq!(parse_number("-", 5.0), 5.0);
        assert_eq!(parse_number("   ", 5.0), 5.0);
        assert_eq!(parse_number(".", 5.0), 5.0);
        assert_eq!(parse_number("v2 48", 5.0), 5.0);
        assert_eq!(parse_number("e3", 5.0), 5.0);
    }

    #[test]
    fn test_exponent_notation() {
        assert_eq!(parse_number("1e3", 0.0), 1000.0);
        assert_eq!(parse_number("1.5e3", 0.0), 1500.0);
        assert_eq!(parse_number("2E-1", 0.0), 0.2);
        assert_eq!(parse_number("1e400", 7.0), 7.0);
    }

    #[test]
    fn test_reading_stops_at_first_non_numeric() {
        assert_eq!(parse_number("12V24", 0.0), 12.0);
        assert_eq!(parse_number("10 m 5", 0.0), 10.0);
        assert_eq!(parse_number("1.2.3", 5.0), 1.2);
        assert_eq!(parse_number("3e", 0.0), 3.0);
        assert_eq!(parse_number("4e+ W", 0.0), 4.0);
        assert_eq!(parse_number("+.5", 0.0), 0.5);
        assert_eq!(parse_number("5.", 0.0), 5.0);
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(parse_number("0,8", 0.7), 0.8);
        assert_eq!(parse_number("3,0 m", 0.0), 3.0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3000.0), "3000");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(parse_number(&format_number(0.1 + 0.2), 0.0), 0.1 + 0.2);
    }
}
