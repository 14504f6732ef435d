use super::{Receipt, ReceiptStyle};

const TEXT_WIDTH: usize = 40;
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Fixed-width plain-text receipt, one trailing newline, no trailing spaces.
pub fn render_text(receipt: &Receipt, style: &ReceiptStyle) -> String {
    let heavy = "=".repeat(TEXT_WIDTH);
    let light = "-".repeat(TEXT_WIDTH);
    let mut lines = vec![
        heavy.clone(),
        centered(&style.store_name),
        centered(&style.title),
        centered(&receipt.issued_at.format(DATE_FORMAT).to_string()),
        heavy,
    ];

    if receipt.lines.is_empty() {
        lines.push(centered("(no items)"));
    }
    for line in &receipt.lines {
        lines.push(row(&line.name, &style.amount(line.price)));
    }

    lines.push(light.clone());
    lines.push(row("Total spent:", &style.amount(receipt.total_spent)));
    lines.push(row("Budget:", &style.amount(receipt.budget)));
    lines.push(row(
        receipt.balance_label(),
        &style.amount(receipt.settled_amount()),
    ));
    if receipt.over_budget {
        lines.push(centered("!! Budget exceeded !!"));
    }
    lines.push(light);
    lines.push(centered(&style.footer()));
    lines.push(centered(&receipt.issued_at.format(TIME_FORMAT).to_string()));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Receipt markup fragment; every user-supplied string is escaped.
pub fn render_html(receipt: &Receipt, style: &ReceiptStyle) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<div class=\"receipt\" data-receipt-id=\"{}\">\n",
        receipt.id
    ));
    html.push_str("  <div class=\"receipt-header\">\n");
    html.push_str(&format!(
        "    <div class=\"logo\"><span>{}</span></div>\n",
        escape_html(&style.store_name)
    ));
    html.push_str(&format!("    <h2>{}</h2>\n", escape_html(&style.title)));
    html.push_str(&format!(
        "    <div class=\"receipt-date\">{}</div>\n",
        receipt.issued_at.format(DATE_FORMAT)
    ));
    html.push_str("  </div>\n");

    html.push_str("  <div class=\"receipt-body\">\n");
    html.push_str("    <div class=\"receipt-items\">\n");
    for line in &receipt.lines {
        html.push_str(&format!(
            "      <div class=\"receipt-item\"><span class=\"item-name\">{}</span><span class=\"item-price\">{}</span></div>\n",
            escape_html(&line.name),
            escape_html(&style.amount(line.price))
        ));
    }
    html.push_str("    </div>\n");

    html.push_str("    <div class=\"receipt-totals\">\n");
    html.push_str(&total_row("Total spent:", &style.amount(receipt.total_spent)));
    html.push_str(&total_row("Budget:", &style.amount(receipt.budget)));
    let balance_class = if receipt.over_budget {
        "receipt-total negative"
    } else {
        "receipt-total"
    };
    html.push_str(&format!(
        "      <div class=\"{}\"><strong>{}</strong><strong>{}</strong></div>\n",
        balance_class,
        receipt.balance_label(),
        escape_html(&style.amount(receipt.settled_amount()))
    ));
    html.push_str("    </div>\n");
    if receipt.over_budget {
        html.push_str(
            "    <div class=\"budget-warning\"><span>You have exceeded your budget</span></div>\n",
        );
    }
    html.push_str("  </div>\n");

    html.push_str("  <div class=\"receipt-footer\">\n");
    html.push_str(&format!("    <p>{}</p>\n", escape_html(&style.footer())));
    html.push_str(&format!(
        "    <p>{}</p>\n",
        receipt.issued_at.format(TIME_FORMAT)
    ));
    html.push_str("  </div>\n");
    html.push_str("</div>\n");
    html
}

/// Standalone page that prints itself once loaded.
pub fn printable_document(receipt: &Receipt, style: &ReceiptStyle) -> String {
    let mut doc = String::new();
    doc.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
    doc.push_str(&format!(
        "<title>{}</title>\n",
        escape_html(&style.title)
    ));
    doc.push_str(PRINT_STYLES);
    doc.push_str("</head>\n<body>\n");
    doc.push_str(&render_html(receipt, style));
    doc.push_str("<script>window.onload = function() { window.print(); };</script>\n");
    doc.push_str("</body>\n</html>\n");
    doc
}

const PRINT_STYLES: &str = "<style>
body { padding: 20px; font-family: sans-serif; }
.receipt { max-width: 400px; margin: 0 auto; }
.receipt-header { text-align: center; margin-bottom: 20px; }
.receipt-date { color: #666; margin-top: 5px; }
.receipt-item, .receipt-total { display: flex; justify-content: space-between; margin: 10px 0; }
.receipt-totals { margin-top: 20px; border-top: 1px dashed #ddd; padding-top: 15px; }
.negative { color: #e74c3c; }
.budget-warning { background: #fff8e6; padding: 10px; border-left: 3px solid #f39c12; margin-top: 15px; }
.receipt-footer { margin-top: 30px; text-align: center; color: #666; font-size: 14px; }
@media print { @page { size: auto; margin: 0; } }
</style>
";

fn total_row(label: &str, amount: &str) -> String {
    format!(
        "      <div class=\"receipt-total\"><span>{}</span><span>{}</span></div>\n",
        label,
        escape_html(amount)
    )
}

fn centered(text: &str) -> String {
    let text = truncate(text, TEXT_WIDTH);
    format!("{:^width$}", text, width = TEXT_WIDTH)
        .trim_end()
        .to_string()
}

fn row(label: &str, amount: &str) -> String {
    let amount_len = amount.chars().count();
    let room = TEXT_WIDTH.saturating_sub(amount_len + 1).max(1);
    let label = truncate(label, room);
    let gap = TEXT_WIDTH
        .saturating_sub(label.chars().count() + amount_len)
        .max(1);
    format!("{}{}{}", label, " ".repeat(gap), amount)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
