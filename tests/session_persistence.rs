mod common;

use assert_fs::prelude::*;
use basket_budget::{
    core::SessionManager,
    ledger::{AcceptOverage, RejectOverage},
    receipt::{ExportFormat, ReceiptExporter, ReceiptSink, ReceiptStyle},
    storage::{JsonStorage, SessionStore},
    utils::FixedClock,
    BudgetError,
};
use chrono::NaiveDate;
use predicates::prelude::*;
use regex::Regex;

fn clock() -> FixedClock {
    FixedClock(
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap(),
    )
}

fn open_at(path: &std::path::Path) -> SessionManager {
    let storage = JsonStorage::open(path).unwrap();
    SessionManager::open(SessionStore::new(Box::new(storage)))
        .unwrap()
        .0
}

#[test]
fn session_survives_a_restart() {
    let base = common::temp_base();
    {
        let mut session = common::open_session(&base);
        session.set_budget(100.0).unwrap();
        session.add_item("Milk", 4.5, &mut RejectOverage).unwrap();
        session.add_item("Bread", 3.25, &mut RejectOverage).unwrap();
    }

    let session = common::open_session(&base);
    let names: Vec<_> = session.ledger().items().iter().map(|item| item.name()).collect();
    assert_eq!(names, vec!["Milk", "Bread"]);
    assert_eq!(session.ledger().budget(), 100.0);
    assert_eq!(session.ledger().total_spent(), 7.75);
}

#[test]
fn stored_total_is_recomputed_from_items() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("session.json");
    file.write_str(
        r#"{
  "budget": "100",
  "shoppingItems": "[{\"id\":1,\"name\":\"A\",\"price\":40.0},{\"id\":2,\"name\":\"\",\"price\":5.0}]",
  "totalSpent": "999"
}"#,
    )
    .unwrap();

    let storage = JsonStorage::open(file.path()).unwrap();
    let (session, report) = SessionManager::open(SessionStore::new(Box::new(storage))).unwrap();
    assert!(report.restored);
    assert_eq!(report.warnings.len(), 2);
    assert_eq!(session.ledger().item_count(), 1);
    assert_eq!(session.ledger().total_spent(), 40.0);
}

#[test]
fn writes_leave_no_temp_files_behind() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("session.json");
    let mut session = open_at(file.path());
    session.set_budget(20.0).unwrap();
    session.add_item("Tea", 3.0, &mut AcceptOverage).unwrap();

    file.assert(predicate::path::exists());
    file.assert(predicate::str::contains("shoppingItems"));
    temp.child("session.json.tmp")
        .assert(predicate::path::missing());
}

#[test]
fn finish_exports_then_clears_the_session() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("session.json");
    let receipts = temp.child("receipts");
    let mut session = open_at(file.path());
    session.set_budget(100.0).unwrap();
    session.add_item("A", 40.0, &mut AcceptOverage).unwrap();

    let exporter = ReceiptExporter::new(receipts.path(), ReceiptStyle::default());
    let path = session
        .finish(&exporter, ExportFormat::Text, &clock())
        .unwrap();

    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(Regex::new(r"^receipt_\d{4}-\d{2}-\d{2}\.txt$").unwrap().is_match(&name));
    let saved = receipts.child(&name);
    saved.assert(predicate::str::contains("Remaining:"));
    saved.assert(predicate::str::contains("60.00 SAR"));

    assert!(session.ledger().is_empty());
    assert_eq!(session.ledger().budget(), 0.0);
    assert!(open_at(file.path()).ledger().is_empty());
}

#[test]
fn failed_finish_keeps_ledger_and_store() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("session.json");
    let blocker = temp.child("blocked");
    blocker.write_str("not a directory").unwrap();

    let mut session = open_at(file.path());
    session.set_budget(100.0).unwrap();
    session.add_item("A", 40.0, &mut AcceptOverage).unwrap();
    let before = session.ledger().clone();

    let exporter = ReceiptExporter::new(blocker.path().join("receipts"), ReceiptStyle::default());
    let err = session
        .finish(&exporter, ExportFormat::Html, &clock())
        .unwrap_err();
    assert!(matches!(err, BudgetError::ExportFailure(_)));
    assert_eq!(session.ledger(), &before);
    assert_eq!(open_at(file.path()).ledger(), &before);
}

#[test]
fn repeated_exports_do_not_clobber() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut session = open_at(temp.child("session.json").path());
    session.set_budget(10.0).unwrap();

    let exporter = ReceiptExporter::new(temp.child("out").path(), ReceiptStyle::default());
    let receipt = session.receipt(&clock());
    let first = exporter.export(&receipt, ExportFormat::Html).unwrap();
    let second = exporter.export(&receipt, ExportFormat::Html).unwrap();
    assert_ne!(first, second);
    assert!(second.ends_with("receipt_2025-06-02_2.html"));
}
