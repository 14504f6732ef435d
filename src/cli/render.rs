use crate::{config::Config, ledger::Ledger};

use super::ui::{Table, TableColumn, TableRenderer, UiStyle};

const NAME_WIDTH: usize = 24;
const PRICE_WIDTH: usize = 12;

/// Item table followed by the spending summary.
pub fn ledger_lines(ledger: &Ledger, config: &Config, style: &UiStyle) -> Vec<String> {
    let mut lines = Vec::new();
    if ledger.is_empty() {
        lines.push("No items yet. Add one with `add <name> <price>`.".to_string());
    } else {
        let mut table = Table::new(
            None::<String>,
            vec![
                TableColumn::new("#", 3).right(),
                TableColumn::new("ID", 13),
                TableColumn::new("Name", NAME_WIDTH),
                TableColumn::new("Price", PRICE_WIDTH).right(),
            ],
        );
        for (idx, item) in ledger.items().iter().enumerate() {
            table.add_row(vec![
                (idx + 1).to_string(),
                item.id().to_string(),
                item.name().to_string(),
                money(item.price(), config),
            ]);
        }
        lines.extend(TableRenderer::lines(&table, style));
    }
    lines.push(String::new());
    lines.extend(summary_lines(ledger, config, style));
    lines
}

/// Balance, spend, progress bar and item count.
pub fn summary_lines(ledger: &Ledger, config: &Config, style: &UiStyle) -> Vec<String> {
    let balance = ledger.remaining_or_overage();
    let balance_label = if balance < 0.0 { "Overage:" } else { "Remaining:" };
    let percent = ledger.percent_spent();
    let band = ledger.progress_band(&config.thresholds());

    vec![
        format!("{:<11}{}", "Budget:", money(ledger.budget(), config)),
        format!("{:<11}{}", "Spent:", money(ledger.total_spent(), config)),
        format!("{:<11}{}", balance_label, money(balance.abs(), config)),
        format!(
            "{:<11}{} {:.0}% ({})",
            "Progress:",
            style.progress_bar(percent, band),
            percent.round(),
            band.label()
        ),
        format!("{:<11}{}", "Items:", ledger.item_count()),
    ]
}

fn money(value: f64, config: &Config) -> String {
    format!("{:.2} {}", value, config.currency)
}
