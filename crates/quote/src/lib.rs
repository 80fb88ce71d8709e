//! Quote building (session-only).
//!
//! Per-product quote lines are layered over catalog records by product code.
//! Totals are always derived from scratch (`aggregate::compute`); nothing here
//! is persisted.

pub mod aggregate;
pub mod overlay;
pub mod review;

pub use aggregate::{DataQualityIssue, DataQualityIssueKind, QuoteAggregate, compute};
pub use overlay::{QuoteLine, QuoteOverlay};
pub use review::{QuoteReview, ReviewLine, list_included, remove};
