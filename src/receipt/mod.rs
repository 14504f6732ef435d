//! Receipt records built from a ledger and their text/markup renderings.

pub mod export;
pub mod render;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::Ledger;

pub use export::{ExportFormat, ReceiptExporter, ReceiptSink};
pub use render::{printable_document, render_html, render_text};

/// One purchased entry as printed on the receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub name: String,
    pub price: f64,
}

/// Frozen view of a ledger at the moment the receipt was issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    pub issued_at: NaiveDateTime,
    pub lines: Vec<ReceiptLine>,
    pub total_spent: f64,
    pub budget: f64,
    /// Signed `budget - total_spent`.
    pub balance: f64,
    pub over_budget: bool,
}

impl Receipt {
    pub fn from_ledger(ledger: &Ledger, issued_at: NaiveDateTime) -> Self {
        let lines = ledger
            .items()
            .iter()
            .map(|item| ReceiptLine {
                name: item.name().to_string(),
                price: item.price(),
            })
            .collect();
        let balance = ledger.remaining_or_overage();
        Self {
            id: Uuid::new_v4(),
            issued_at,
            lines,
            total_spent: ledger.total_spent(),
            budget: ledger.budget(),
            balance,
            over_budget: balance < 0.0,
        }
    }

    /// Remaining amount, or the overage when over budget; always non-negative.
    pub fn settled_amount(&self) -> f64 {
        self.balance.abs()
    }

    pub fn balance_label(&self) -> &'static str {
        if self.over_budget {
            "Overage:"
        } else {
            "Remaining:"
        }
    }

    pub fn item_count(&self) -> usize {
        self.lines.len()
    }
}

/// Presentation settings shared by every renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptStyle {
    pub store_name: String,
    pub title: String,
    pub currency: String,
}

impl Default for ReceiptStyle {
    fn default() -> Self {
        Self {
            store_name: "Basket Budget".into(),
            title: "Purchase Receipt".into(),
            currency: "SAR".into(),
        }
    }
}

impl ReceiptStyle {
    pub fn amount(&self, value: f64) -> String {
        format!("{:.2} {}", value, self.currency)
    }

    pub fn footer(&self) -> String {
        format!("Thanks for using {}", self.store_name)
    }
}
