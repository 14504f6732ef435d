use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{BudgetError, Result};

use super::{
    line_item::{validate_name, validate_price, ItemId, LineItem},
    overage::{OverageNotice, OveragePolicy},
    progress::{BandThresholds, ProgressBand},
};

/// Persistable view of a ledger. Field names follow the stored session keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub budget: f64,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub total_spent: f64,
}

/// Result of an add attempt that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added { id: ItemId, over_budget: bool },
    /// The overage policy refused the add; nothing changed.
    Declined,
}

impl AddOutcome {
    pub fn id(&self) -> Option<ItemId> {
        match self {
            AddOutcome::Added { id, .. } => Some(*id),
            AddOutcome::Declined => None,
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added { .. })
    }
}

/// A ledger rebuilt from persisted state plus whatever had to be repaired.
#[derive(Debug, Clone)]
pub struct Restored {
    pub ledger: Ledger,
    pub warnings: Vec<String>,
}

/// Budget, line items in insertion order, and the cached total spent.
///
/// `total_spent` always equals the sum of item prices once a method returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    budget: f64,
    items: Vec<LineItem>,
    total_spent: f64,
    last_id: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(budget: f64) -> Result<Self> {
        let mut ledger = Self::new();
        ledger.set_budget(budget)?;
        Ok(ledger)
    }

    /// Rebuilds a ledger from a snapshot, dropping invalid items and recomputing the total.
    pub fn restore(snapshot: LedgerSnapshot) -> Restored {
        let mut warnings = Vec::new();
        let budget = if snapshot.budget.is_finite() && snapshot.budget >= 0.0 {
            snapshot.budget
        } else {
            warnings.push(format!(
                "stored budget {} is invalid; using 0",
                snapshot.budget
            ));
            0.0
        };

        let mut ledger = Ledger {
            budget,
            ..Ledger::default()
        };
        for item in snapshot.items {
            if let Err(err) = item.validate() {
                warnings.push(format!("dropped stored item {}: {err}", item.id()));
                continue;
            }
            if ledger.item(item.id()).is_some() {
                warnings.push(format!("dropped duplicate stored item {}", item.id()));
                continue;
            }
            if item.id().0 == u64::MAX {
                warnings.push(format!("dropped stored item {}: id out of range", item.id()));
                continue;
            }
            ledger.last_id = ledger.last_id.max(item.id().0);
            ledger.items.push(item);
        }
        ledger.recompute();

        if (ledger.total_spent - snapshot.total_spent).abs() > 0.005 {
            warnings.push(format!(
                "stored total {:.2} did not match items; recomputed {:.2}",
                snapshot.total_spent, ledger.total_spent
            ));
        }
        for message in &warnings {
            warn!(%message, "repaired persisted ledger state");
        }
        Restored { ledger, warnings }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            budget: self.budget,
            items: self.items.clone(),
            total_spent: self.total_spent,
        }
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn total_spent(&self) -> f64 {
        self.total_spent
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replaces the budget. Only positive finite values are accepted.
    pub fn set_budget(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(BudgetError::invalid("budget must be a number"));
        }
        if value <= 0.0 {
            return Err(BudgetError::invalid("budget must be greater than zero"));
        }
        self.budget = value;
        debug!(budget = value, "budget updated");
        Ok(())
    }

    /// Validates and appends an item, consulting `policy` first when the add would
    /// push the total past the budget.
    pub fn add_item(
        &mut self,
        name: &str,
        price: f64,
        policy: &mut dyn OveragePolicy,
    ) -> Result<AddOutcome> {
        let name = validate_name(name)?;
        validate_price(price)?;

        let projected_total = self.total_spent + price;
        let over_budget = projected_total > self.budget;
        if over_budget {
            let notice = OverageNotice {
                budget: self.budget,
                current_total: self.total_spent,
                projected_total,
            };
            if !policy.approve(&notice) {
                debug!(%name, price, "over-budget add declined");
                return Ok(AddOutcome::Declined);
            }
        }

        let id = self.next_id()?;
        self.items.push(LineItem::new(id, name, price)?);
        self.recompute();
        debug!(%id, price, total = self.total_spent, "item added");
        Ok(AddOutcome::Added { id, over_budget })
    }

    /// Removes the item with `id`. Unknown ids are ignored.
    pub fn remove_item(&mut self, id: ItemId) -> Option<LineItem> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        let removed = self.items.remove(index);
        self.recompute();
        debug!(%id, total = self.total_spent, "item removed");
        Some(removed)
    }

    /// `budget - total_spent`; negative values are the overage.
    pub fn remaining_or_overage(&self) -> f64 {
        self.budget - self.total_spent
    }

    pub fn is_over_budget(&self) -> bool {
        self.remaining_or_overage() < 0.0
    }

    /// Share of the budget spent, clamped to `[0, 100]`.
    ///
    /// With a zero budget this is 100 once anything has been spent and 0 otherwise.
    pub fn percent_spent(&self) -> f64 {
        if self.budget <= 0.0 {
            return if self.total_spent > 0.0 { 100.0 } else { 0.0 };
        }
        (self.total_spent * 100.0 / self.budget).clamp(0.0, 100.0)
    }

    pub fn progress_band(&self, thresholds: &BandThresholds) -> ProgressBand {
        thresholds.classify(self.percent_spent())
    }

    /// Clears budget, items and total back to the empty state.
    pub fn reset(&mut self) {
        *self = Ledger::default();
        debug!("ledger reset");
    }

    fn recompute(&mut self) {
        self.total_spent = self.items.iter().map(LineItem::price).sum();
    }

    fn next_id(&mut self) -> Result<ItemId> {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let after_last = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| BudgetError::invalid("no item ids left in this session"))?;
        let id = now.max(after_last);
        self.last_id = id;
        Ok(ItemId(id))
    }
}

/// Parses a user-entered amount, ignoring thousands separators.
pub fn parse_amount(input: &str) -> Result<f64> {
    let cleaned: String = input
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Err(BudgetError::invalid("an amount is required"));
    }
    let value = cleaned
        .parse::<f64>()
        .map_err(|_| BudgetError::invalid(format!("`{}` is not a valid amount", input.trim())))?;
    if !value.is_finite() {
        return Err(BudgetError::invalid(format!(
            "`{}` is not a valid amount",
            input.trim()
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AcceptOverage, RejectOverage};

    fn sum_of(ledger: &Ledger) -> f64 {
        ledger.items().iter().map(LineItem::price).sum()
    }

    #[test]
    fn set_budget_rejects_non_positive_values() {
        let mut ledger = Ledger::new();
        assert!(ledger.set_budget(0.0).is_err());
        assert!(ledger.set_budget(-5.0).is_err());
        assert!(ledger.set_budget(f64::NAN).is_err());
        assert_eq!(ledger.budget(), 0.0);
        ledger.set_budget(250.0).unwrap();
        assert_eq!(ledger.budget(), 250.0);
    }

    #[test]
    fn invalid_items_leave_ledger_untouched() {
        let mut ledger = Ledger::with_budget(100.0).unwrap();
        ledger.add_item("Rice", 10.0, &mut AcceptOverage).unwrap();
        let before = ledger.clone();

        for (name, price) in [("", 1.0), ("  ", 1.0), ("Eggs", f64::NAN), ("Eggs", -2.0)] {
            let err = ledger
                .add_item(name, price, &mut AcceptOverage)
                .expect_err("invalid add must fail");
            assert!(matches!(err, BudgetError::InvalidInput(_)));
        }
        assert_eq!(ledger, before);
    }

    #[test]
    fn ids_are_unique_even_within_the_same_millisecond() {
        let mut ledger = Ledger::with_budget(1000.0).unwrap();
        let ids: Vec<ItemId> = (0..50)
            .filter_map(|i| {
                ledger
                    .add_item(&format!("item {i}"), 1.0, &mut AcceptOverage)
                    .unwrap()
                    .id()
            })
            .collect();
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn declined_overage_keeps_state() {
        let mut ledger = Ledger::with_budget(50.0).unwrap();
        ledger.add_item("Coffee", 30.0, &mut RejectOverage).unwrap();
        let outcome = ledger.add_item("Cheese", 25.0, &mut RejectOverage).unwrap();
        assert_eq!(outcome, AddOutcome::Declined);
        assert_eq!(ledger.item_count(), 1);
        assert_eq!(ledger.total_spent(), 30.0);
    }

    #[test]
    fn policy_sees_projected_total_before_commit() {
        let mut ledger = Ledger::with_budget(100.0).unwrap();
        ledger.add_item("A", 40.0, &mut AcceptOverage).unwrap();
        let mut notices = Vec::new();
        let mut policy = |notice: &OverageNotice| {
            notices.push(*notice);
            true
        };
        let outcome = ledger.add_item("B", 70.0, &mut policy).unwrap();
        assert!(matches!(outcome, AddOutcome::Added { over_budget: true, .. }));
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].current_total, 40.0);
        assert_eq!(notices[0].projected_total, 110.0);
        assert_eq!(notices[0].overage(), 10.0);
    }

    #[test]
    fn total_tracks_item_sum_across_mutations() {
        let mut ledger = Ledger::with_budget(20.0).unwrap();
        let prices = [0.1, 0.2, 3.33, 7.05, 0.7, 12.99, 0.01];
        let mut ids = Vec::new();
        for (i, price) in prices.iter().enumerate() {
            let outcome = ledger
                .add_item(&format!("p{i}"), *price, &mut AcceptOverage)
                .unwrap();
            ids.push(outcome.id().unwrap());
            assert_eq!(ledger.total_spent(), sum_of(&ledger));
        }
        for id in ids.iter().step_by(2) {
            ledger.remove_item(*id);
            assert_eq!(ledger.total_spent(), sum_of(&ledger));
        }
        assert_eq!(ledger.item_count(), 3);
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let mut ledger = Ledger::with_budget(10.0).unwrap();
        ledger.add_item("Salt", 2.0, &mut AcceptOverage).unwrap();
        let before = ledger.clone();
        assert!(ledger.remove_item(ItemId(7)).is_none());
        assert_eq!(ledger, before);
    }

    #[test]
    fn percent_is_clamped_and_zero_budget_is_defined() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.percent_spent(), 0.0);
        ledger.add_item("Free sample", 0.0, &mut AcceptOverage).unwrap();
        assert_eq!(ledger.percent_spent(), 0.0);
        ledger.add_item("Gum", 1.5, &mut AcceptOverage).unwrap();
        assert_eq!(ledger.percent_spent(), 100.0);

        ledger.set_budget(1.0).unwrap();
        ledger.add_item("Bulk order", 5000.0, &mut AcceptOverage).unwrap();
        assert_eq!(ledger.percent_spent(), 100.0);
    }

    #[test]
    fn restore_recomputes_total_and_drops_bad_items() {
        let good = LineItem::new(ItemId(10), "Oil", 15.0).unwrap();
        let raw = r#"{"id": 11, "name": "", "price": 3.0}"#;
        let blank: LineItem = serde_json::from_str(raw).unwrap();
        let snapshot = LedgerSnapshot {
            budget: 60.0,
            items: vec![good.clone(), blank, good.clone()],
            total_spent: 999.0,
        };
        let restored = Ledger::restore(snapshot);
        assert_eq!(restored.ledger.items(), &[good]);
        assert_eq!(restored.ledger.total_spent(), 15.0);
        assert_eq!(restored.warnings.len(), 3);

        let mut ledger = restored.ledger;
        let outcome = ledger.add_item("Flour", 4.0, &mut AcceptOverage).unwrap();
        assert!(outcome.id().unwrap() > ItemId(10));
    }

    #[test]
    fn restore_refuses_the_largest_id() {
        let huge = LineItem::new(ItemId(u64::MAX), "Salt", 2.0).unwrap();
        let below = LineItem::new(ItemId(u64::MAX - 1), "Pepper", 3.0).unwrap();
        let restored = Ledger::restore(LedgerSnapshot {
            budget: 20.0,
            items: vec![huge, below.clone()],
            total_spent: 5.0,
        });
        assert_eq!(restored.ledger.items(), &[below]);

        let mut ledger = restored.ledger;
        let outcome = ledger.add_item("Sugar", 1.0, &mut AcceptOverage).unwrap();
        assert_eq!(outcome.id(), Some(ItemId(u64::MAX)));
        let err = ledger
            .add_item("Rice", 1.0, &mut AcceptOverage)
            .expect_err("ids are exhausted");
        assert!(matches!(err, BudgetError::InvalidInput(_)));
        assert_eq!(ledger.item_count(), 2);
    }

    #[test]
    fn reset_returns_to_empty_state() {
        let mut ledger = Ledger::with_budget(80.0).unwrap();
        ledger.add_item("Fish", 95.0, &mut AcceptOverage).unwrap();
        ledger.reset();
        assert_eq!(ledger.budget(), 0.0);
        assert_eq!(ledger.total_spent(), 0.0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn parse_amount_strips_thousands_separators() {
        assert_eq!(parse_amount("1,250.50").unwrap(), 1250.5);
        assert_eq!(parse_amount(" 40 ").unwrap(), 40.0);
        assert!(parse_amount("").is_err());
        assert!(parse_amount("twelve").is_err());
        assert!(parse_amount("inf").is_err());
    }
}
