pub mod json_backend;
pub mod memory;

use tracing::{debug, warn};

use crate::{
    errors::{BudgetError, Result},
    ledger::{Ledger, LedgerSnapshot, LineItem},
};

pub use json_backend::JsonStorage;
pub use memory::MemoryStore;

pub const BUDGET_KEY: &str = "budget";
pub const ITEMS_KEY: &str = "shoppingItems";
pub const TOTAL_SPENT_KEY: &str = "totalSpent";

/// Minimal string key-value persistence, in the spirit of browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Applies a batch of changes, `Some` setting a key and `None` removing it.
    /// When one change fails, the keys already changed get their old values back.
    fn apply(&mut self, changes: &[(&str, Option<&str>)]) -> Result<()> {
        let mut undo: Vec<(&str, Option<String>)> = Vec::with_capacity(changes.len());
        for &(key, value) in changes {
            let previous = self.get(key)?;
            let outcome = match value {
                Some(value) => self.set(key, value),
                None => self.remove(key),
            };
            if let Err(err) = outcome {
                for (key, previous) in undo.into_iter().rev() {
                    let restored = match previous {
                        Some(old) => self.set(key, &old),
                        None => self.remove(key),
                    };
                    if let Err(undo_err) = restored {
                        warn!(key, error = %undo_err, "could not restore key after failed batch");
                    }
                }
                return Err(err);
            }
            undo.push((key, previous));
        }
        Ok(())
    }
}

/// Maps a ledger onto the three session keys of a [`KeyValueStore`].
pub struct SessionStore {
    backend: Box<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    pub fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }

    /// Reads the persisted session; `None` when nothing was ever saved.
    pub fn load_state(&self) -> Result<Option<LedgerSnapshot>> {
        let budget = self.backend.get(BUDGET_KEY)?;
        let items = self.backend.get(ITEMS_KEY)?;
        if budget.is_none() && items.is_none() {
            return Ok(None);
        }

        let budget = match budget {
            Some(raw) => parse_number(BUDGET_KEY, &raw)?,
            None => 0.0,
        };
        let items: Vec<LineItem> = match items {
            Some(raw) => serde_json::from_str(&raw).map_err(|err| {
                BudgetError::StorageError(format!("stored `{ITEMS_KEY}` is unreadable: {err}"))
            })?,
            None => Vec::new(),
        };
        let total_spent = match self.backend.get(TOTAL_SPENT_KEY)? {
            Some(raw) => parse_number(TOTAL_SPENT_KEY, &raw)?,
            None => items.iter().map(LineItem::price).sum(),
        };

        debug!(budget, items = items.len(), "session state loaded");
        Ok(Some(LedgerSnapshot {
            budget,
            items,
            total_spent,
        }))
    }

    /// Writes all three session keys as one batch.
    pub fn save_state(&mut self, ledger: &Ledger) -> Result<()> {
        let budget = ledger.budget().to_string();
        let items = serde_json::to_string(ledger.items())?;
        let total_spent = ledger.total_spent().to_string();
        self.backend.apply(&[
            (BUDGET_KEY, Some(budget.as_str())),
            (ITEMS_KEY, Some(items.as_str())),
            (TOTAL_SPENT_KEY, Some(total_spent.as_str())),
        ])?;
        debug!(items = ledger.item_count(), "session state saved");
        Ok(())
    }

    pub fn save_budget(&mut self, budget: f64) -> Result<()> {
        self.backend.set(BUDGET_KEY, &budget.to_string())
    }

    pub fn clear_state(&mut self) -> Result<()> {
        self.backend
            .apply(&[(BUDGET_KEY, None), (ITEMS_KEY, None), (TOTAL_SPENT_KEY, None)])?;
        debug!("session state cleared");
        Ok(())
    }
}

fn parse_number(key: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| BudgetError::StorageError(format!("stored `{key}` is not a number: {raw}")))
}
