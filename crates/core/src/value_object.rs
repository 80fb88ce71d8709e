//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** (`Money`,
/// quote lines). Two values with the same attributes are interchangeable.
///
/// ```ignore
/// let a = Money::from_cents(1050);
/// let b = forca_core::parse_price("10,50").unwrap();
/// assert_eq!(a, b);  // Equal by value, not identity
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
