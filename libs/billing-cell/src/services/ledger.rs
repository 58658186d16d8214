use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::info;

use shared_store::CollectionStore;

use crate::models::{
    BillingItem, ClaimStatus, InsuranceClaim, InsuranceInfo, Invoice, InvoiceStatus, Payment,
    PaymentMethod,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BillingStats {
    pub total_invoices: usize,
    pub total_claims: usize,
    pub total_billed: f64,
    pub total_paid: f64,
    pub total_outstanding: f64,
    pub collection_rate: f64,
    pub invoice_status_distribution: BTreeMap<String, usize>,
    pub claim_status_distribution: BTreeMap<String, usize>,
    pub overdue_invoices: usize,
}

/// Invoice and insurance-claim ledger over the shared collection stores.
/// Mutations flush the affected collection in full, same as the other cells.
pub struct BillingLedger {
    store: Box<dyn CollectionStore<Invoice>>,
    claim_store: Box<dyn CollectionStore<InsuranceClaim>>,
    invoices: HashMap<String, Invoice>,
    claims: HashMap<String, InsuranceClaim>,
}

impl BillingLedger {
    pub fn new(
        store: Box<dyn CollectionStore<Invoice>>,
        claim_store: Box<dyn CollectionStore<InsuranceClaim>>,
    ) -> Self {
        let invoices = store.load_all();
        let claims = claim_store.load_all();
        info!("Loaded {} invoices, {} claims", invoices.len(), claims.len());
        Self {
            store,
            claim_store,
            invoices,
            claims,
        }
    }

    fn flush(&self) {
        self.store.save_all(&self.invoices);
    }

    fn flush_claims(&self) {
        self.claim_store.save_all(&self.claims);
    }

    fn next_id(&self) -> String {
        format!("INV{:04}", self.invoices.len() + 1)
    }

    fn next_claim_id(&self) -> String {
        format!("CLM{:04}", self.claims.len() + 1)
    }

    pub fn create(&mut self, patient_id: String, appointment_id: Option<String>) -> Invoice {
        let invoice = Invoice::new(self.next_id(), patient_id, appointment_id);
        self.invoices
            .insert(invoice.invoice_id.clone(), invoice.clone());
        self.flush();
        invoice
    }

    pub fn get(&self, invoice_id: &str) -> Option<Invoice> {
        self.invoices.get(invoice_id).cloned()
    }

    pub fn all(&self) -> Vec<Invoice> {
        let mut invoices: Vec<Invoice> = self.invoices.values().cloned().collect();
        invoices.sort_by(|a, b| a.invoice_id.cmp(&b.invoice_id));
        invoices
    }

    pub fn by_patient(&self, patient_id: &str) -> Vec<Invoice> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .values()
            .filter(|inv| inv.patient_id == patient_id)
            .cloned()
            .collect();
        invoices.sort_by(|a, b| a.invoice_id.cmp(&b.invoice_id));
        invoices
    }

    pub fn by_status(&self, status: InvoiceStatus) -> Vec<Invoice> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .values()
            .filter(|inv| inv.status == status)
            .cloned()
            .collect();
        invoices.sort_by(|a, b| a.invoice_id.cmp(&b.invoice_id));
        invoices
    }

    pub fn overdue(&self) -> Vec<Invoice> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .values()
            .filter(|inv| inv.is_overdue())
            .cloned()
            .collect();
        invoices.sort_by(|a, b| a.invoice_id.cmp(&b.invoice_id));
        invoices
    }

    pub fn add_item(
        &mut self,
        invoice_id: &str,
        description: String,
        quantity: u32,
        unit_price: f64,
        service_code: Option<String>,
    ) -> bool {
        match self.invoices.get_mut(invoice_id) {
            Some(invoice) => {
                let item_id = format!("ITEM{:03}", invoice.items.len() + 1);
                invoice.add_item(BillingItem::new(
                    item_id,
                    description,
                    quantity,
                    unit_price,
                    service_code,
                ));
                self.flush();
                true
            }
            None => false,
        }
    }

    pub fn record_payment(
        &mut self,
        invoice_id: &str,
        amount: f64,
        payment_method: PaymentMethod,
        reference: String,
        notes: String,
    ) -> Option<Payment> {
        let invoice = self.invoices.get_mut(invoice_id)?;
        let payment = invoice
            .add_payment(amount, payment_method, reference, notes)
            .clone();
        self.flush();
        Some(payment)
    }

    pub fn set_insurance_info(&mut self, invoice_id: &str, info: InsuranceInfo) -> bool {
        match self.invoices.get_mut(invoice_id) {
            Some(invoice) => {
                invoice.set_insurance_info(info);
                self.flush();
                true
            }
            None => false,
        }
    }

    /// Submit a claim for an invoice. The claim amount is the invoice total
    /// at submission time; an unknown invoice id still yields a claim with a
    /// zero amount, matching the lenient record cells elsewhere.
    pub fn create_claim(
        &mut self,
        patient_id: String,
        invoice_id: String,
        insurance_provider: String,
        policy_number: String,
    ) -> InsuranceClaim {
        let claim_amount = self
            .invoices
            .get(&invoice_id)
            .map(|inv| inv.total_amount)
            .unwrap_or(0.0);
        let claim = InsuranceClaim::new(
            self.next_claim_id(),
            patient_id,
            invoice_id,
            insurance_provider,
            policy_number,
            claim_amount,
        );
        self.claims.insert(claim.claim_id.clone(), claim.clone());
        self.flush_claims();
        claim
    }

    pub fn get_claim(&self, claim_id: &str) -> Option<InsuranceClaim> {
        self.claims.get(claim_id).cloned()
    }

    pub fn all_claims(&self) -> Vec<InsuranceClaim> {
        let mut claims: Vec<InsuranceClaim> = self.claims.values().cloned().collect();
        claims.sort_by(|a, b| a.claim_id.cmp(&b.claim_id));
        claims
    }

    pub fn claims_by_patient(&self, patient_id: &str) -> Vec<InsuranceClaim> {
        let mut claims: Vec<InsuranceClaim> = self
            .claims
            .values()
            .filter(|claim| claim.patient_id == patient_id)
            .cloned()
            .collect();
        claims.sort_by(|a, b| a.claim_id.cmp(&b.claim_id));
        claims
    }

    pub fn claims_by_status(&self, status: ClaimStatus) -> Vec<InsuranceClaim> {
        let mut claims: Vec<InsuranceClaim> = self
            .claims
            .values()
            .filter(|claim| claim.status == status)
            .cloned()
            .collect();
        claims.sort_by(|a, b| a.claim_id.cmp(&b.claim_id));
        claims
    }

    pub fn update_claim_status(
        &mut self,
        claim_id: &str,
        status: ClaimStatus,
        approved_amount: f64,
        denied_amount: f64,
        notes: String,
    ) -> Option<InsuranceClaim> {
        let claim = self.claims.get_mut(claim_id)?;
        claim.record_response(status, approved_amount, denied_amount, notes);
        let updated = claim.clone();
        self.flush_claims();
        Some(updated)
    }

    pub fn statistics(&self) -> BillingStats {
        let total_invoices = self.invoices.len();
        let total_billed: f64 = self.invoices.values().map(|inv| inv.total_amount).sum();
        let total_paid: f64 = self.invoices.values().map(|inv| inv.paid_amount).sum();
        let total_outstanding: f64 = self.invoices.values().map(|inv| inv.balance_due).sum();
        let collection_rate = if total_billed > 0.0 {
            total_paid / total_billed * 100.0
        } else {
            0.0
        };

        let mut invoice_status_distribution: BTreeMap<String, usize> = InvoiceStatus::all()
            .iter()
            .map(|status| (status.to_string(), 0))
            .collect();
        for invoice in self.invoices.values() {
            *invoice_status_distribution
                .get_mut(&invoice.status.to_string())
                .expect("all statuses pre-seeded") += 1;
        }

        let mut claim_status_distribution: BTreeMap<String, usize> = ClaimStatus::all()
            .iter()
            .map(|status| (status.to_string(), 0))
            .collect();
        for claim in self.claims.values() {
            *claim_status_distribution
                .get_mut(&claim.status.to_string())
                .expect("all statuses pre-seeded") += 1;
        }

        BillingStats {
            total_invoices,
            total_claims: self.claims.len(),
            total_billed,
            total_paid,
            total_outstanding,
            collection_rate,
            invoice_status_distribution,
            claim_status_distribution,
            overdue_invoices: self.overdue().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_store::MemoryStore;

    fn ledger() -> BillingLedger {
        BillingLedger::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()))
    }

    #[test]
    fn ids_are_sequential_with_inv_prefix() {
        let mut ledger = ledger();
        let a = ledger.create("P0001".to_string(), None);
        let b = ledger.create("P0002".to_string(), Some("A0001".to_string()));
        assert_eq!(a.invoice_id, "INV0001");
        assert_eq!(b.invoice_id, "INV0002");
        assert_eq!(b.appointment_id.as_deref(), Some("A0001"));
    }

    #[test]
    fn item_ids_are_scoped_to_the_invoice() {
        let mut ledger = ledger();
        ledger.create("P0001".to_string(), None);
        ledger.create("P0002".to_string(), None);

        assert!(ledger.add_item("INV0001", "Cleaning".to_string(), 1, 120.0, None));
        assert!(ledger.add_item("INV0002", "X-ray".to_string(), 1, 80.0, None));

        let second = ledger.get("INV0002").unwrap();
        assert_eq!(second.items[0].item_id, "ITEM001");
        assert!(!ledger.add_item("INV9999", "ghost".to_string(), 1, 1.0, None));
    }

    #[test]
    fn payments_update_totals_and_status() {
        let mut ledger = ledger();
        ledger.create("P0001".to_string(), None);
        ledger.add_item("INV0001", "Filling".to_string(), 1, 100.0, None);

        let payment = ledger
            .record_payment(
                "INV0001",
                108.0,
                PaymentMethod::CreditCard,
                "ref-1".to_string(),
                String::new(),
            )
            .unwrap();
        assert_eq!(payment.payment_id, "PAY001");

        let invoice = ledger.get("INV0001").unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert!(invoice.balance_due.abs() < 1e-9);

        assert!(ledger
            .record_payment("INV9999", 10.0, PaymentMethod::Cash, String::new(), String::new())
            .is_none());
    }

    #[test]
    fn patient_filter_returns_only_their_invoices() {
        let mut ledger = ledger();
        ledger.create("P0001".to_string(), None);
        ledger.create("P0002".to_string(), None);
        ledger.create("P0001".to_string(), None);

        let theirs = ledger.by_patient("P0001");
        assert_eq!(theirs.len(), 2);
        assert!(theirs.iter().all(|inv| inv.patient_id == "P0001"));
    }

    #[test]
    fn statistics_aggregate_money_and_status() {
        let mut ledger = ledger();
        ledger.create("P0001".to_string(), None);
        ledger.add_item("INV0001", "Filling".to_string(), 1, 100.0, None);
        ledger.record_payment(
            "INV0001",
            54.0,
            PaymentMethod::Cash,
            String::new(),
            String::new(),
        );
        ledger.create("P0002".to_string(), None);

        let stats = ledger.statistics();
        assert_eq!(stats.total_invoices, 2);
        assert!((stats.total_billed - 108.0).abs() < 1e-9);
        assert!((stats.total_paid - 54.0).abs() < 1e-9);
        assert!((stats.total_outstanding - 54.0).abs() < 1e-9);
        assert!((stats.collection_rate - 50.0).abs() < 1e-9);
        assert_eq!(stats.invoice_status_distribution["partially_paid"], 1);
        assert_eq!(stats.invoice_status_distribution["draft"], 1);
        assert_eq!(stats.overdue_invoices, 0);
    }

    #[test]
    fn claim_takes_its_amount_from_the_invoice() {
        let mut ledger = ledger();
        ledger.create("P0001".to_string(), None);
        ledger.add_item("INV0001", "Crown".to_string(), 1, 500.0, None);

        let claim = ledger.create_claim(
            "P0001".to_string(),
            "INV0001".to_string(),
            "Delta Dental".to_string(),
            "DD-123".to_string(),
        );
        assert_eq!(claim.claim_id, "CLM0001");
        assert_eq!(claim.status, ClaimStatus::Submitted);
        assert!((claim.claim_amount - 540.0).abs() < 1e-9);

        let orphan = ledger.create_claim(
            "P0002".to_string(),
            "INV9999".to_string(),
            "Aetna".to_string(),
            "A-1".to_string(),
        );
        assert_eq!(orphan.claim_id, "CLM0002");
        assert_eq!(orphan.claim_amount, 0.0);
    }

    #[test]
    fn claim_response_moves_status_and_filters_follow() {
        let mut ledger = ledger();
        ledger.create("P0001".to_string(), None);
        ledger.create_claim(
            "P0001".to_string(),
            "INV0001".to_string(),
            "Delta Dental".to_string(),
            "DD-123".to_string(),
        );
        ledger.create_claim(
            "P0002".to_string(),
            "INV0001".to_string(),
            "Aetna".to_string(),
            "A-1".to_string(),
        );

        let updated = ledger
            .update_claim_status(
                "CLM0001",
                ClaimStatus::Approved,
                100.0,
                8.0,
                "partial plan".to_string(),
            )
            .unwrap();
        assert_eq!(updated.status, ClaimStatus::Approved);
        assert!(updated.response_date.is_some());

        assert_eq!(ledger.claims_by_status(ClaimStatus::Approved).len(), 1);
        assert_eq!(ledger.claims_by_status(ClaimStatus::Submitted).len(), 1);
        assert_eq!(ledger.claims_by_patient("P0001").len(), 1);
        assert!(ledger
            .update_claim_status("CLM9999", ClaimStatus::Denied, 0.0, 0.0, String::new())
            .is_none());
    }

    #[test]
    fn statistics_count_claims_by_status() {
        let mut ledger = ledger();
        ledger.create("P0001".to_string(), None);
        ledger.create_claim(
            "P0001".to_string(),
            "INV0001".to_string(),
            "Delta Dental".to_string(),
            "DD-123".to_string(),
        );
        ledger.update_claim_status("CLM0001", ClaimStatus::Denied, 0.0, 0.0, String::new());

        let stats = ledger.statistics();
        assert_eq!(stats.total_claims, 1);
        assert_eq!(stats.claim_status_distribution["denied"], 1);
        assert_eq!(stats.claim_status_distribution["submitted"], 0);
    }

    #[test]
    fn empty_ledger_statistics_avoid_division_by_zero() {
        let ledger = ledger();
        let stats = ledger.statistics();
        assert_eq!(stats.total_invoices, 0);
        assert_eq!(stats.collection_rate, 0.0);
    }

    #[test]
    fn insurance_info_is_attached_to_the_invoice() {
        let mut ledger = ledger();
        ledger.create("P0001".to_string(), None);
        assert!(ledger.set_insurance_info(
            "INV0001",
            InsuranceInfo {
                provider: "Delta Dental".to_string(),
                policy_number: "DD-123".to_string(),
                group_number: String::new(),
                coverage_percentage: 80.0,
            }
        ));
        let invoice = ledger.get("INV0001").unwrap();
        assert_eq!(
            invoice.insurance_info.unwrap().provider,
            "Delta Dental"
        );
        assert!(!ledger.set_insurance_info(
            "INV9999",
            InsuranceInfo {
                provider: "Aetna".to_string(),
                policy_number: "A-1".to_string(),
                group_number: String::new(),
                coverage_percentage: 0.0,
            }
        ));
    }
}
