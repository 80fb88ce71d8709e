//! Quote line overlay: per-product quantity and inclusion flag.
//!
//! Keyed by product code and independent of pagination, so a product included
//! on page 1 stays included after paging or searching.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use forca_core::{ProductCode, ValueObject, clamp_quantity, coerce_quantity};

/// Mutable quote fields for one product.
///
/// An included line with quantity 0 is legal and contributes nothing to the
/// total. Nothing ties `included` to `quantity > 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub quantity: u32,
    pub included: bool,
}

impl ValueObject for QuoteLine {}

#[derive(Debug, Clone, Default)]
pub struct QuoteOverlay {
    lines: HashMap<ProductCode, QuoteLine>,
}

impl QuoteOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// The line for `code`, or the default line if the user never touched it.
    pub fn get(&self, code: &ProductCode) -> QuoteLine {
        self.lines.get(code).copied().unwrap_or_default()
    }

    pub fn contains(&self, code: &ProductCode) -> bool {
        self.lines.contains_key(code)
    }

    /// Set the quantity (clamped to >= 0). Creates the line if absent and
    /// leaves `included` as it was.
    pub fn set_quantity(&mut self, code: &ProductCode, qty: i64) -> QuoteLine {
        let line = self.lines.entry(code.clone()).or_default();
        line.quantity = clamp_quantity(qty);
        *line
    }

    /// Set the quantity from raw text input; non-numeric input becomes 0.
    pub fn set_quantity_input(&mut self, code: &ProductCode, input: &str) -> QuoteLine {
        let line = self.lines.entry(code.clone()).or_default();
        line.quantity = coerce_quantity(input);
        *line
    }

    /// Flip `included`. Creates the line (quantity 0) if absent.
    pub fn toggle_included(&mut self, code: &ProductCode) -> QuoteLine {
        let line = self.lines.entry(code.clone()).or_default();
        line.included = !line.included;
        *line
    }

    pub fn lines(&self) -> impl Iterator<Item = (&ProductCode, &QuoteLine)> {
        self.lines.iter()
    }

    pub fn included(&self) -> impl Iterator<Item = (&ProductCode, &QuoteLine)> {
        self.lines.iter().filter(|(_, line)| line.included)
    }

    pub fn included_count(&self) -> usize {
        self.included().count()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drop every line (start the quote over).
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
