use basket_budget::{
    ledger::{AcceptOverage, Ledger},
    receipt::{render_html, render_text, Receipt, ReceiptStyle},
};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

fn issued_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 14)
        .unwrap()
        .and_hms_opt(18, 5, 0)
        .unwrap()
}

fn ledger_with(budget: f64, items: &[(&str, f64)]) -> Ledger {
    let mut ledger = Ledger::with_budget(budget).unwrap();
    for (name, price) in items {
        ledger.add_item(name, *price, &mut AcceptOverage).unwrap();
    }
    ledger
}

#[test]
fn text_receipt_layout() {
    let receipt = Receipt::from_ledger(&ledger_with(100.0, &[("A", 40.0)]), issued_at());
    let text = render_text(&receipt, &ReceiptStyle::default());
    insta::assert_snapshot!(text.trim_end(), @r###"
    ========================================
                 Basket Budget
                Purchase Receipt
                   2025-03-14
    ========================================
    A                              40.00 SAR
    ----------------------------------------
    Total spent:                   40.00 SAR
    Budget:                       100.00 SAR
    Remaining:                     60.00 SAR
    ----------------------------------------
         Thanks for using Basket Budget
                     18:05
    "###);
}

#[test]
fn receipt_totals_follow_the_ledger() {
    let receipt = Receipt::from_ledger(&ledger_with(100.0, &[("A", 40.0)]), issued_at());
    assert_eq!(receipt.total_spent, 40.0);
    assert_eq!(receipt.budget, 100.0);
    assert_eq!(receipt.balance, 60.0);
    assert!(!receipt.over_budget);
    assert_eq!(receipt.item_count(), 1);
}

#[test]
fn over_budget_receipt_shows_overage() {
    let receipt = Receipt::from_ledger(
        &ledger_with(100.0, &[("A", 40.0), ("B", 70.0)]),
        issued_at(),
    );
    let text = render_text(&receipt, &ReceiptStyle::default());
    let overage = Regex::new(r"(?m)^Overage:\s+10\.00 SAR$").unwrap();
    assert!(overage.is_match(&text), "{text}");
    assert!(text.contains("!! Budget exceeded !!"));

    let names: Vec<_> = receipt.lines.iter().map(|line| line.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn every_text_line_fits_the_paper_width() {
    let receipt = Receipt::from_ledger(
        &ledger_with(
            500.0,
            &[("An extraordinarily long product description", 12.5), ("Tea", 3.0)],
        ),
        issued_at(),
    );
    let text = render_text(&receipt, &ReceiptStyle::default());
    for line in text.lines() {
        assert!(line.chars().count() <= 40, "too wide: {line:?}");
        assert_eq!(line, line.trim_end());
    }
}

#[test]
fn html_receipt_uses_style_and_escapes_names() {
    let receipt = Receipt::from_ledger(
        &ledger_with(20.0, &[("Fish & <Chips>", 25.0)]),
        issued_at(),
    );
    let style = ReceiptStyle {
        currency: "EUR".into(),
        ..ReceiptStyle::default()
    };
    let html = render_html(&receipt, &style);
    assert!(html.contains("Fish &amp; &lt;Chips&gt;"));
    assert!(html.contains("25.00 EUR"));
    assert!(html.contains("budget-warning"));
    let id = Regex::new(r#"data-receipt-id="[0-9a-f-]{36}""#).unwrap();
    assert!(id.is_match(&html));
}
