//! functions for presenting calculated values to a user
use num::Zero;

/// Format a value with a fixed number of decimal places.
///
/// In contrast to the plain `format!("{value:.3}")` a negative zero (or a negative value that
/// rounds to zero) is shown without sign.
///
/// # Example
/// ```
/// use slab_optics::utils::unit_format::format_fixed;
///
/// assert_eq!(format_fixed(1.93813, 3), "1.938");
/// assert_eq!(format_fixed(-0.0, 3), "0.000");
/// assert_eq!(format_fixed(-0.0001, 3), "0.000");
/// assert_eq!(format_fixed(2.0, 0), "2");
/// ```
#[must_use]
pub fn format_fixed(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    match formatted.strip_prefix('-') {
        Some(unsigned) if unsigned.parse::<f64>().is_ok_and(|v| v.is_zero()) => {
            unsigned.to_owned()
        }
        _ => formatted,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn fixed_decimals() {
        assert_eq!(format_fixed(3.0, 3), "3.000");
        assert_eq!(format_fixed(1.0 / 3.0, 3), "0.333");
        assert_eq!(format_fixed(2.0005, 2), "2.00");
        assert_eq!(format_fixed(-1.5, 1), "-1.5");
    }
    #[test]
    fn negative_zero() {
        assert_eq!(format_fixed(-0.0, 3), "0.000");
        assert_eq!(format_fixed(-0.0004, 3), "0.000");
        assert_eq!(format_fixed(-0.0006, 3), "-0.001");
    }
    #[test]
    fn non_finite() {
        assert_eq!(format_fixed(f64::NAN, 3), "NaN");
        assert_eq!(format_fixed(f64::INFINITY, 3), "inf");
        assert_eq!(format_fixed(f64::NEG_INFINITY, 3), "-inf");
    }
}
