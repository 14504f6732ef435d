use basket_budget::{
    ledger::{AcceptOverage, AddOutcome, ItemId, Ledger, OverageNotice, RejectOverage},
    BudgetError,
};

fn assert_total_matches(ledger: &Ledger) {
    let sum: f64 = ledger.items().iter().map(|item| item.price()).sum();
    assert!((ledger.total_spent() - sum).abs() < 1e-9);
}

#[test]
fn budget_scenario_with_confirmed_overage() {
    let mut ledger = Ledger::new();
    ledger.set_budget(100.0).unwrap();

    let a = ledger.add_item("A", 40.0, &mut RejectOverage).unwrap();
    assert!(a.is_added());
    assert_eq!(ledger.total_spent(), 40.0);
    assert_eq!(ledger.remaining_or_overage(), 60.0);
    assert_eq!(ledger.percent_spent(), 40.0);

    let mut asked = Vec::new();
    let b = ledger
        .add_item("B", 70.0, &mut |notice: &OverageNotice| {
            asked.push(*notice);
            true
        })
        .unwrap();
    assert!(matches!(b, AddOutcome::Added { over_budget: true, .. }));
    assert_eq!(asked.len(), 1);
    assert_eq!(asked[0].projected_total, 110.0);
    assert_eq!(asked[0].overage(), 10.0);

    assert_eq!(ledger.total_spent(), 110.0);
    assert_eq!(ledger.remaining_or_overage(), -10.0);
    assert_eq!(ledger.percent_spent(), 100.0);
    assert!(ledger.is_over_budget());

    let removed = ledger.remove_item(a.id().unwrap()).unwrap();
    assert_eq!(removed.name(), "A");
    assert_eq!(ledger.total_spent(), 70.0);
    assert_total_matches(&ledger);
}

#[test]
fn declined_overage_changes_nothing() {
    let mut ledger = Ledger::with_budget(50.0).unwrap();
    ledger.add_item("Rice", 30.0, &mut AcceptOverage).unwrap();
    let before = ledger.clone();

    let outcome = ledger.add_item("Lamb", 45.0, &mut RejectOverage).unwrap();
    assert_eq!(outcome, AddOutcome::Declined);
    assert_eq!(ledger, before);
}

#[test]
fn invalid_items_are_rejected_without_side_effects() {
    let mut ledger = Ledger::with_budget(10.0).unwrap();
    ledger.add_item("Salt", 1.0, &mut AcceptOverage).unwrap();
    let before = ledger.clone();

    for (name, price) in [("   ", 1.0), ("Pepper", -0.5), ("Pepper", f64::NAN), ("Pepper", f64::INFINITY)] {
        let err = ledger.add_item(name, price, &mut AcceptOverage).unwrap_err();
        assert!(matches!(err, BudgetError::InvalidInput(_)), "{name} {price}");
        assert_eq!(ledger, before);
    }
}

#[test]
fn removing_unknown_id_is_a_no_op() {
    let mut ledger = Ledger::with_budget(10.0).unwrap();
    ledger.add_item("Salt", 1.0, &mut AcceptOverage).unwrap();
    let before = ledger.clone();

    assert!(ledger.remove_item(ItemId(42)).is_none());
    assert_eq!(ledger, before);
}

#[test]
fn total_tracks_any_sequence_of_mutations() {
    let mut ledger = Ledger::with_budget(1_000.0).unwrap();
    let mut ids = Vec::new();
    for step in 0..40u32 {
        if step % 3 == 2 {
            let id = ids.remove((step as usize * 7) % ids.len());
            ledger.remove_item(id);
        } else {
            let price = f64::from(step) * 1.37 + 0.1;
            let outcome = ledger
                .add_item(&format!("item-{step}"), price, &mut AcceptOverage)
                .unwrap();
            ids.push(outcome.id().unwrap());
        }
        assert_total_matches(&ledger);
        let percent = ledger.percent_spent();
        assert!((0.0..=100.0).contains(&percent));
    }

    let unique: std::collections::HashSet<_> = ledger.items().iter().map(|item| item.id()).collect();
    assert_eq!(unique.len(), ledger.item_count());
}

#[test]
fn zero_budget_percent_falls_back() {
    let mut ledger = Ledger::new();
    assert_eq!(ledger.percent_spent(), 0.0);
    ledger.add_item("Gum", 2.0, &mut AcceptOverage).unwrap();
    assert_eq!(ledger.percent_spent(), 100.0);
}

#[test]
fn reset_clears_everything() {
    let mut ledger = Ledger::with_budget(100.0).unwrap();
    ledger.add_item("A", 40.0, &mut AcceptOverage).unwrap();
    ledger.reset();

    assert_eq!(ledger.budget(), 0.0);
    assert_eq!(ledger.total_spent(), 0.0);
    assert!(ledger.is_empty());
}

#[test]
fn budget_must_be_positive() {
    let mut ledger = Ledger::with_budget(25.0).unwrap();
    for bad in [0.0, -5.0, f64::NAN] {
        assert!(matches!(ledger.set_budget(bad), Err(BudgetError::InvalidInput(_))));
    }
    assert_eq!(ledger.budget(), 25.0);
}
