//! Aggregate calculator: total value and included-item count.
//!
//! [`compute`] is the single recomputation path. It walks included lines only,
//! prices them from the catalog records, and fails closed on bad data: a line
//! whose price cannot be parsed (or whose product is unknown) contributes zero
//! and is reported as a [`DataQualityIssue`] instead of aborting the total.

use std::collections::HashMap;

use serde::Serialize;

use forca_core::{DomainError, Entity, Money, ProductCode, ProductRecord};

use crate::overlay::QuoteOverlay;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityIssueKind {
    /// The record's price string is not a valid amount.
    UnparseablePrice { raw: String, reason: String },
    /// The line is included but no record for its code is known.
    MissingProduct,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataQualityIssue {
    pub code: ProductCode,
    #[serde(flatten)]
    pub kind: DataQualityIssueKind,
}

/// Derived quote totals. Never stored; recompute after every overlay change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuoteAggregate {
    pub total_value: Money,
    pub item_count: usize,
    /// Lines that contributed zero because of bad data, ordered by code.
    pub issues: Vec<DataQualityIssue>,
}

impl QuoteAggregate {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Compute the quote aggregate from catalog records and the overlay.
///
/// When `catalog` holds the same code twice, the first record wins.
pub fn compute(catalog: &[ProductRecord], overlay: &QuoteOverlay) -> QuoteAggregate {
    let mut by_code: HashMap<&ProductCode, &ProductRecord> = HashMap::with_capacity(catalog.len());
    for record in catalog {
        by_code.entry(record.id()).or_insert(record);
    }

    let mut aggregate = QuoteAggregate::default();

    for (code, line) in overlay.included() {
        aggregate.item_count += 1;

        let Some(record) = by_code.get(code) else {
            aggregate.issues.push(DataQualityIssue {
                code: code.clone(),
                kind: DataQualityIssueKind::MissingProduct,
            });
            continue;
        };

        match record.unit_price() {
            Ok(price) => {
                aggregate.total_value = aggregate.total_value + price.times(line.quantity);
            }
            Err(DomainError::DataQuality { value, reason, .. }) => {
                aggregate.issues.push(DataQualityIssue {
                    code: code.clone(),
                    kind: DataQualityIssueKind::UnparseablePrice { raw: value, reason },
                });
            }
            Err(other) => {
                aggregate.issues.push(DataQualityIssue {
                    code: code.clone(),
                    kind: DataQualityIssueKind::UnparseablePrice {
                        raw: record.price.clone(),
                        reason: other.to_string(),
                    },
                });
            }
        }
    }

    aggregate.issues.sort_by(|a, b| a.code.cmp(&b.code));
    for issue in &aggregate.issues {
        tracing::warn!(code = %issue.code, issue = ?issue.kind, "quote line priced at zero");
    }

    aggregate
}
