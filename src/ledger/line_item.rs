use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{BudgetError, Result};

/// Identifier of a [`LineItem`]; a millisecond timestamp bumped to stay unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = BudgetError;

    fn from_str(value: &str) -> Result<Self> {
        value
            .trim()
            .parse::<u64>()
            .map(ItemId)
            .map_err(|_| BudgetError::invalid(format!("`{value}` is not an item id")))
    }
}

/// A single purchased entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    id: ItemId,
    name: String,
    price: f64,
}

impl LineItem {
    pub(crate) fn new(id: ItemId, name: impl Into<String>, price: f64) -> Result<Self> {
        let name = validate_name(&name.into())?;
        validate_price(price)?;
        Ok(Self { id, name, price })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Checks an item that came from outside the ledger, e.g. persisted state.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_price(self.price)
    }
}

pub(crate) fn validate_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BudgetError::invalid("item name must not be empty"));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() {
        return Err(BudgetError::invalid("item price must be a number"));
    }
    if price < 0.0 {
        return Err(BudgetError::invalid("item price must not be negative"));
    }
    Ok(())
}
