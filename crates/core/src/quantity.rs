//! Quantity coercion for quote lines.
//!
//! Quantities are non-negative integers. Anything a user can type is accepted
//! and coerced: negatives clamp to 0, non-numeric text becomes 0.

/// Clamp a signed quantity into the valid range.
pub fn clamp_quantity(qty: i64) -> u32 {
    if qty <= 0 {
        0
    } else {
        u32::try_from(qty).unwrap_or(u32::MAX)
    }
}

/// Coerce free-form quantity input into a quantity.
///
/// Decimal input keeps its integer part (`"2,9"` and `"2.9"` become 2).
pub fn coerce_quantity(input: &str) -> u32 {
    let text = input.trim();
    if let Ok(v) = text.parse::<i64>() {
        return clamp_quantity(v);
    }

    match text.replace(',', ".").parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => {
            if v >= f64::from(u32::MAX) {
                u32::MAX
            } else {
                v.trunc() as u32
            }
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_negative_to_zero() {
        assert_eq!(clamp_quantity(-3), 0);
        assert_eq!(clamp_quantity(0), 0);
        assert_eq!(clamp_quantity(12), 12);
        assert_eq!(clamp_quantity(i64::MAX), u32::MAX);
    }

    #[test]
    fn coerces_text_input() {
        assert_eq!(coerce_quantity("3"), 3);
        assert_eq!(coerce_quantity(" 7 "), 7);
        assert_eq!(coerce_quantity("-2"), 0);
        assert_eq!(coerce_quantity(""), 0);
        assert_eq!(coerce_quantity("abc"), 0);
        assert_eq!(coerce_quantity("2,9"), 2);
        assert_eq!(coerce_quantity("NaN"), 0);
        assert_eq!(coerce_quantity("1e40"), u32::MAX);
    }
}
