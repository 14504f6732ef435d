/// Facts handed to an [`OveragePolicy`] before an add that would exceed the budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverageNotice {
    pub budget: f64,
    pub current_total: f64,
    pub projected_total: f64,
}

impl OverageNotice {
    /// Amount by which the projected total exceeds the budget.
    pub fn overage(&self) -> f64 {
        self.projected_total - self.budget
    }
}

/// Decides whether an over-budget add is committed.
///
/// The policy runs before the ledger is mutated; returning `false` aborts the add.
pub trait OveragePolicy {
    fn approve(&mut self, notice: &OverageNotice) -> bool;
}

impl<F> OveragePolicy for F
where
    F: FnMut(&OverageNotice) -> bool,
{
    fn approve(&mut self, notice: &OverageNotice) -> bool {
        self(notice)
    }
}

/// Commits every add regardless of the budget.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptOverage;

impl OveragePolicy for AcceptOverage {
    fn approve(&mut self, _notice: &OverageNotice) -> bool {
        true
    }
}

/// Refuses any add that would push the total past the budget.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectOverage;

impl OveragePolicy for RejectOverage {
    fn approve(&mut self, _notice: &OverageNotice) -> bool {
        false
    }
}
