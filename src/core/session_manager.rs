use std::path::PathBuf;

use tracing::{info, warn};

use crate::{
    errors::Result,
    ledger::{AddOutcome, ItemId, Ledger, LineItem, OveragePolicy},
    receipt::{ExportFormat, Receipt, ReceiptSink},
    storage::SessionStore,
    utils::Clock,
};

/// Outcome of opening a session from storage.
#[derive(Debug, Clone, Default)]
pub struct OpenReport {
    pub restored: bool,
    pub warnings: Vec<String>,
}

/// Facade that keeps the in-memory ledger and its persisted session in step.
///
/// Every mutating call either succeeds in both places or leaves both as they were.
pub struct SessionManager {
    ledger: Ledger,
    store: SessionStore,
}

impl SessionManager {
    /// Starts an empty session without reading the store.
    pub fn new(store: SessionStore) -> Self {
        Self {
            ledger: Ledger::new(),
            store,
        }
    }

    /// Restores the session persisted in `store`, if any.
    pub fn open(store: SessionStore) -> Result<(Self, OpenReport)> {
        let mut report = OpenReport::default();
        let ledger = match store.load_state()? {
            Some(snapshot) => {
                let restored = Ledger::restore(snapshot);
                report.restored = true;
                report.warnings = restored.warnings;
                info!(
                    items = restored.ledger.item_count(),
                    budget = restored.ledger.budget(),
                    "session restored"
                );
                restored.ledger
            }
            None => Ledger::new(),
        };
        Ok((Self { ledger, store }, report))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn has_budget(&self) -> bool {
        self.ledger.budget() > 0.0
    }

    pub fn set_budget(&mut self, value: f64) -> Result<()> {
        let before = self.ledger.clone();
        self.ledger.set_budget(value)?;
        if let Err(err) = self.store.save_budget(value) {
            self.ledger = before;
            return Err(err);
        }
        Ok(())
    }

    pub fn add_item(
        &mut self,
        name: &str,
        price: f64,
        policy: &mut dyn OveragePolicy,
    ) -> Result<AddOutcome> {
        let before = self.ledger.clone();
        let outcome = self.ledger.add_item(name, price, policy)?;
        if outcome.is_added() {
            self.persist_or_rollback(before)?;
        }
        Ok(outcome)
    }

    pub fn remove_item(&mut self, id: ItemId) -> Result<Option<LineItem>> {
        let before = self.ledger.clone();
        let removed = self.ledger.remove_item(id);
        if removed.is_some() {
            self.persist_or_rollback(before)?;
        }
        Ok(removed)
    }

    pub fn receipt(&self, clock: &dyn Clock) -> Receipt {
        Receipt::from_ledger(&self.ledger, clock.now())
    }

    /// Exports the receipt, then clears the session. A failed export changes nothing.
    pub fn finish(
        &mut self,
        sink: &dyn ReceiptSink,
        format: ExportFormat,
        clock: &dyn Clock,
    ) -> Result<PathBuf> {
        let receipt = self.receipt(clock);
        let path = sink.export(&receipt, format).map_err(|err| {
            warn!(error = %err, "finish aborted; session kept");
            err
        })?;
        self.reset()?;
        info!(path = %path.display(), "shopping session finished");
        Ok(path)
    }

    /// Clears persisted state and empties the ledger.
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear_state()?;
        self.ledger.reset();
        Ok(())
    }

    fn persist_or_rollback(&mut self, before: Ledger) -> Result<()> {
        if let Err(err) = self.store.save_state(&self.ledger) {
            warn!(error = %err, "persisting session failed; change rolled back");
            self.ledger = before;
            return Err(err);
        }
        Ok(())
    }
}
