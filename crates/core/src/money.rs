//! Money in integer cents and the single comma-decimal price parser.
//!
//! The backend sends prices as locale-formatted strings (`"10,50"`,
//! `"1.234,56"`). All parsing goes through [`parse_price`] so every call site
//! shares one failure behavior.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Monetary amount in the smallest currency unit (centavos).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Line total for `quantity` units at this unit price. Saturates instead of
    /// wrapping on absurd inputs.
    pub fn times(self, quantity: u32) -> Money {
        Money(self.0.saturating_mul(i64::from(quantity)))
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl core::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        self.saturating_add(rhs)
    }
}

impl core::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

/// Formats as Brazilian currency: `R$ 1.234,56`.
impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = (abs / 100).to_string();
        let cents = abs % 100;

        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (i, ch) in units.chars().enumerate() {
            if i > 0 && (units.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{sign}R$ {grouped},{cents:02}")
    }
}

/// Parse a locale-formatted price string into [`Money`].
///
/// Accepted shapes:
/// - comma decimal separator, optional `.` grouping: `"10,50"`, `"1.234,5"`, `",99"`
/// - no comma: a single `.` is read as the decimal point (`"10.50"`), so the
///   plain "comma to period" reading of the backend format still holds
/// - optional `R$` prefix and surrounding whitespace
///
/// Negative amounts, more than two decimal places and anything non-numeric
/// are reported as [`DomainError::DataQuality`].
pub fn parse_price(raw: &str) -> DomainResult<Money> {
    const FIELD: &str = "price";

    let text = raw.trim();
    let text = text.strip_prefix("R$").unwrap_or(text).trim();

    if text.is_empty() {
        return Err(DomainError::data_quality(FIELD, raw, "empty"));
    }
    if text.starts_with('-') {
        return Err(DomainError::data_quality(FIELD, raw, "negative amount"));
    }

    let (int_part, frac_part) = if text.contains(',') {
        let mut parts = text.split(',');
        let int_part = parts.next().unwrap_or_default();
        let frac_part = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err(DomainError::data_quality(FIELD, raw, "more than one decimal separator"));
        }
        (int_part.replace('.', ""), frac_part.to_string())
    } else {
        let mut parts = text.split('.');
        let int_part = parts.next().unwrap_or_default();
        let frac_part = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err(DomainError::data_quality(FIELD, raw, "more than one decimal separator"));
        }
        (int_part.to_string(), frac_part.to_string())
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(DomainError::data_quality(FIELD, raw, "no digits"));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit()) || !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::data_quality(FIELD, raw, "not a number"));
    }
    if frac_part.len() > 2 {
        return Err(DomainError::data_quality(FIELD, raw, "more than two decimal places"));
    }

    let units: i64 = if int_part.is_empty() {
        0
    } else {
        int_part
            .parse()
            .map_err(|_| DomainError::data_quality(FIELD, raw, "amount out of range"))?
    };
    let cents: i64 = match frac_part.len() {
        0 => 0,
        1 => frac_part.parse::<i64>().unwrap_or(0) * 10,
        _ => frac_part.parse::<i64>().unwrap_or(0),
    };

    units
        .checked_mul(100)
        .and_then(|v| v.checked_add(cents))
        .map(Money)
        .ok_or_else(|| DomainError::data_quality(FIELD, raw, "amount out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_decimal_prices() {
        assert_eq!(parse_price("10,50").unwrap(), Money::from_cents(1050));
        assert_eq!(parse_price("0,5").unwrap(), Money::from_cents(50));
        assert_eq!(parse_price(",99").unwrap(), Money::from_cents(99));
        assert_eq!(parse_price("7").unwrap(), Money::from_cents(700));
    }

    #[test]
    fn parses_grouped_thousands() {
        assert_eq!(parse_price("1.234,56").unwrap(), Money::from_cents(123_456));
        assert_eq!(parse_price(" R$ 12.000,00 ").unwrap(), Money::from_cents(1_200_000));
    }

    #[test]
    fn period_is_decimal_point_when_no_comma() {
        assert_eq!(parse_price("10.50").unwrap(), Money::from_cents(1050));
    }

    #[test]
    fn malformed_prices_are_data_quality_errors() {
        for raw in ["", "abc", "1,2,3", "1.2.3", "-5,00", "1,234", "R$", "12a,00"] {
            let err = parse_price(raw).unwrap_err();
            assert!(err.is_data_quality(), "expected data quality error for {raw:?}, got {err:?}");
        }
    }

    #[test]
    fn huge_amounts_do_not_overflow() {
        let err = parse_price("99999999999999999999,00").unwrap_err();
        assert!(err.is_data_quality());
    }

    #[test]
    fn displays_brazilian_currency() {
        assert_eq!(Money::from_cents(3150).to_string(), "R$ 31,50");
        assert_eq!(Money::from_cents(123_456_789).to_string(), "R$ 1.234.567,89");
        assert_eq!(Money::from_cents(5).to_string(), "R$ 0,05");
        assert_eq!(Money::from_cents(-100).to_string(), "-R$ 1,00");
    }

    #[test]
    fn times_saturates() {
        assert_eq!(Money::from_cents(1050).times(3), Money::from_cents(3150));
        assert_eq!(Money::from_cents(i64::MAX).times(2), Money::from_cents(i64::MAX));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: formatting then parsing yields the same amount.
            #[test]
            fn display_parses_back(cents in 0i64..10_000_000_000) {
                let money = Money::from_cents(cents);
                prop_assert_eq!(parse_price(&money.to_string()).unwrap(), money);
            }
        }
    }
}
