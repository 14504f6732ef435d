//! Shopping ledger: budget, line items and the derived running total.

#[allow(clippy::module_inception)]
pub mod ledger;
pub mod line_item;
pub mod overage;
pub mod progress;

pub use ledger::{parse_amount, AddOutcome, Ledger, LedgerSnapshot, Restored};
pub use line_item::{ItemId, LineItem};
pub use overage::{AcceptOverage, OverageNotice, OveragePolicy, RejectOverage};
pub use progress::{BandThresholds, ProgressBand};
