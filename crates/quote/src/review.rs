//! Quote review: read-only projection of the included lines for final
//! confirmation, plus removal.

use std::collections::HashSet;

use serde::Serialize;

use forca_core::{Money, ProductCode, ProductRecord};

use crate::aggregate::{QuoteAggregate, compute};
use crate::overlay::QuoteOverlay;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewLine {
    pub code: ProductCode,
    /// `None` when no record for the code is known.
    pub description: Option<String>,
    pub quantity: u32,
    /// `None` when the record is missing or its price is malformed.
    pub unit_price: Option<Money>,
    pub line_total: Money,
}

/// Included lines in catalog order. Lines with no matching record come last,
/// ordered by code.
pub fn list_included(catalog: &[ProductRecord], overlay: &QuoteOverlay) -> Vec<ReviewLine> {
    let mut seen: HashSet<&ProductCode> = HashSet::new();
    let mut lines = Vec::with_capacity(overlay.included_count());

    for record in catalog {
        let line = overlay.get(&record.code);
        if !line.included || !seen.insert(&record.code) {
            continue;
        }
        let unit_price = record.unit_price().ok();
        lines.push(ReviewLine {
            code: record.code.clone(),
            description: Some(record.description.clone()),
            quantity: line.quantity,
            unit_price,
            line_total: unit_price.map(|p| p.times(line.quantity)).unwrap_or(Money::ZERO),
        });
    }

    let mut orphans: Vec<ReviewLine> = overlay
        .included()
        .filter(|(code, _)| !seen.contains(code))
        .map(|(code, line)| ReviewLine {
            code: code.clone(),
            description: None,
            quantity: line.quantity,
            unit_price: None,
            line_total: Money::ZERO,
        })
        .collect();
    orphans.sort_by(|a, b| a.code.cmp(&b.code));
    lines.extend(orphans);

    lines
}

/// Take a line out of the quote.
///
/// Flips `included` off through the overlay toggle and keeps the line (and its
/// quantity) so it can be re-included. Returns `false` if the line was not
/// included, in which case nothing changes.
pub fn remove(overlay: &mut QuoteOverlay, code: &ProductCode) -> bool {
    if !overlay.get(code).included {
        return false;
    }
    overlay.toggle_included(code);
    true
}

/// Snapshot shown on the confirmation screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteReview {
    pub lines: Vec<ReviewLine>,
    pub aggregate: QuoteAggregate,
}

impl QuoteReview {
    pub fn build(catalog: &[ProductRecord], overlay: &QuoteOverlay) -> Self {
        Self {
            lines: list_included(catalog, overlay),
            aggregate: compute(catalog, overlay),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
