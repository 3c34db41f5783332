//! Order list accumulated from catalog rows
//!
//! Items are keyed by identifier. Adding a row that is already in the cart
//! merges the quantity into the existing entry in place; description and
//! rate keep the values from the first add.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::catalog::CatalogRow;
use crate::core::number::{lenient_number, round2};

/// One line of the order list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub identifier: String,
    pub description: String,
    #[serde(deserialize_with = "lenient_number")]
    pub quantity: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub rate: f64,
    /// quantity x rate, rounded to 2 decimals
    #[serde(deserialize_with = "lenient_number")]
    pub amount: f64,
}

/// Result of a successful [`Cart::add_item`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended
    Added,
    /// The quantity was merged into an existing line
    Merged,
}

/// Errors raised by cart operations
#[derive(Debug, Error, Diagnostic)]
pub enum CartError {
    #[error("quantity must be a finite number greater than 0 (got {quantity})")]
    #[diagnostic(code(proforma::cart::validation))]
    Validation { quantity: f64 },
}

/// The working order list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

fn normalize_identifier(identifier: &str) -> &str {
    identifier.trim()
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a quantity of a catalog row, merging with an existing line
    pub fn add_item(&mut self, row: &CatalogRow, quantity: f64) -> Result<AddOutcome, CartError> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(CartError::Validation { quantity });
        }

        let key = normalize_identifier(&row.identifier);
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| normalize_identifier(&item.identifier) == key)
        {
            let merged = item.quantity + quantity;
            if !merged.is_finite() || !(merged * item.rate).is_finite() {
                return Err(CartError::Validation { quantity: merged });
            }
            item.quantity = merged;
            item.amount = round2(merged * item.rate);
            log::debug!("cart: merged {} x{} (now {})", key, quantity, item.quantity);
            return Ok(AddOutcome::Merged);
        }

        if !(quantity * row.rate).is_finite() {
            return Err(CartError::Validation { quantity });
        }

        self.items.push(CartItem {
            identifier: key.to_string(),
            description: row.description.clone(),
            quantity,
            rate: row.rate,
            amount: round2(quantity * row.rate),
        });
        log::debug!("cart: added {} x{}", key, quantity);
        Ok(AddOutcome::Added)
    }

    /// Remove every line with the given identifier, returning how many went
    pub fn remove_item(&mut self, identifier: &str) -> usize {
        let key = normalize_identifier(identifier);
        let before = self.items.len();
        self.items
            .retain(|item| normalize_identifier(&item.identifier) != key);
        let removed = before - self.items.len();
        log::debug!("cart: removed {} line(s) for {}", removed, key);
        removed
    }

    /// Lines in insertion order
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn total_quantity(&self) -> f64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn total_amount(&self) -> f64 {
        self.items.iter().map(|item| item.amount).sum()
    }
}
