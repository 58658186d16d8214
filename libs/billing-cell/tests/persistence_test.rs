use tempfile::tempdir;

use billing_cell::services::ledger::BillingLedger;
use billing_cell::{ClaimStatus, InvoiceStatus, PaymentMethod};
use shared_store::JsonFileStore;

fn open_ledger(dir: &std::path::Path) -> BillingLedger {
    BillingLedger::new(
        Box::new(JsonFileStore::in_dir(dir, "billing")),
        Box::new(JsonFileStore::in_dir(dir, "insurance_claims")),
    )
}

#[test]
fn ledger_survives_a_reload_from_disk() {
    let dir = tempdir().unwrap();

    {
        let mut ledger = open_ledger(dir.path());
        ledger.create("P0001".to_string(), Some("A0001".to_string()));
        ledger.add_item(
            "INV0001",
            "Cleaning".to_string(),
            1,
            120.0,
            Some("D1110".to_string()),
        );
        ledger.record_payment(
            "INV0001",
            60.0,
            PaymentMethod::Check,
            "chk-42".to_string(),
            String::new(),
        );
    }

    let ledger = open_ledger(dir.path());
    let invoice = ledger.get("INV0001").expect("invoice persisted");

    assert_eq!(invoice.status, InvoiceStatus::PartiallyPaid);
    assert_eq!(invoice.items.len(), 1);
    assert_eq!(invoice.items[0].service_code.as_deref(), Some("D1110"));
    assert_eq!(invoice.payments.len(), 1);
    assert_eq!(invoice.payments[0].reference, "chk-42");
    assert!((invoice.paid_amount - 60.0).abs() < 1e-9);
    assert!((invoice.balance_due - 69.6).abs() < 1e-9);
}

#[test]
fn claims_survive_a_reload_from_disk() {
    let dir = tempdir().unwrap();

    {
        let mut ledger = open_ledger(dir.path());
        ledger.create("P0001".to_string(), None);
        ledger.add_item("INV0001", "Crown".to_string(), 1, 500.0, None);
        ledger.create_claim(
            "P0001".to_string(),
            "INV0001".to_string(),
            "Delta Dental".to_string(),
            "DD-123".to_string(),
        );
        ledger.update_claim_status(
            "CLM0001",
            ClaimStatus::Approved,
            432.0,
            108.0,
            "80% plan".to_string(),
        );
    }

    let ledger = open_ledger(dir.path());
    let claim = ledger.get_claim("CLM0001").expect("claim persisted");

    assert_eq!(claim.status, ClaimStatus::Approved);
    assert!((claim.claim_amount - 540.0).abs() < 1e-9);
    assert!((claim.approved_amount - 432.0).abs() < 1e-9);
    assert!(claim.response_date.is_some());
    assert_eq!(claim.notes, "80% plan");
}
