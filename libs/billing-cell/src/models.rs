use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TAX_RATE: f64 = 0.08;
pub const PAYMENT_TERMS_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    PartiallyPaid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn all() -> &'static [InvoiceStatus] {
        &[
            InvoiceStatus::Draft,
            InvoiceStatus::Sent,
            InvoiceStatus::Paid,
            InvoiceStatus::PartiallyPaid,
            InvoiceStatus::Overdue,
            InvoiceStatus::Cancelled,
        ]
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "draft"),
            InvoiceStatus::Sent => write!(f, "sent"),
            InvoiceStatus::Paid => write!(f, "paid"),
            InvoiceStatus::PartiallyPaid => write!(f, "partially_paid"),
            InvoiceStatus::Overdue => write!(f, "overdue"),
            InvoiceStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Check,
    Insurance,
    Online,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillingItem {
    pub item_id: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub service_code: Option<String>,
    pub total: f64,
}

impl BillingItem {
    pub fn new(
        item_id: String,
        description: String,
        quantity: u32,
        unit_price: f64,
        service_code: Option<String>,
    ) -> Self {
        let total = quantity as f64 * unit_price;
        Self {
            item_id,
            description,
            quantity,
            unit_price,
            service_code,
            total,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub payment_id: String,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub reference: String,
    pub notes: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsuranceInfo {
    pub provider: String,
    pub policy_number: String,
    #[serde(default)]
    pub group_number: String,
    #[serde(default)]
    pub coverage_percentage: f64,
}

/// Invoice with derived money fields. `subtotal`, `tax_amount`,
/// `total_amount` and `balance_due` are recomputed on every item or
/// payment mutation and stored, so the persisted document is complete
/// without re-deriving anything on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub invoice_id: String,
    pub patient_id: String,
    pub appointment_id: Option<String>,
    pub created_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub items: Vec<BillingItem>,
    pub subtotal: f64,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub balance_due: f64,
    #[serde(default)]
    pub notes: String,
    pub insurance_info: Option<InsuranceInfo>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl Invoice {
    pub fn new(invoice_id: String, patient_id: String, appointment_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            invoice_id,
            patient_id,
            appointment_id,
            created_date: now,
            due_date: now + Duration::days(PAYMENT_TERMS_DAYS),
            status: InvoiceStatus::Draft,
            items: Vec::new(),
            subtotal: 0.0,
            tax_rate: DEFAULT_TAX_RATE,
            tax_amount: 0.0,
            total_amount: 0.0,
            paid_amount: 0.0,
            balance_due: 0.0,
            notes: String::new(),
            insurance_info: None,
            payments: Vec::new(),
        }
    }

    fn recalculate(&mut self) {
        self.subtotal = self.items.iter().map(|item| item.total).sum();
        self.tax_amount = self.subtotal * self.tax_rate;
        self.total_amount = self.subtotal + self.tax_amount;
        self.balance_due = self.total_amount - self.paid_amount;
    }

    pub fn add_item(&mut self, item: BillingItem) {
        self.items.push(item);
        self.recalculate();
    }

    pub fn remove_item(&mut self, item_id: &str) {
        self.items.retain(|item| item.item_id != item_id);
        self.recalculate();
    }

    /// Apply a payment and move the status forward. A balance at or below
    /// zero marks the invoice paid; anything in between is a partial.
    pub fn add_payment(
        &mut self,
        amount: f64,
        payment_method: PaymentMethod,
        reference: String,
        notes: String,
    ) -> &Payment {
        let payment = Payment {
            payment_id: format!("PAY{:03}", self.payments.len() + 1),
            amount,
            payment_method,
            reference,
            notes,
            date: Utc::now(),
        };
        self.paid_amount += amount;
        self.balance_due = self.total_amount - self.paid_amount;

        if self.balance_due <= 0.0 {
            self.status = InvoiceStatus::Paid;
        } else if self.paid_amount > 0.0 {
            self.status = InvoiceStatus::PartiallyPaid;
        }

        self.payments.push(payment);
        self.payments.last().expect("just pushed")
    }

    pub fn set_insurance_info(&mut self, info: InsuranceInfo) {
        self.insurance_info = Some(info);
    }

    pub fn is_overdue(&self) -> bool {
        Utc::now() > self.due_date && self.balance_due > 0.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Submitted,
    Approved,
    Denied,
    Paid,
}

impl ClaimStatus {
    pub fn all() -> &'static [ClaimStatus] {
        &[
            ClaimStatus::Submitted,
            ClaimStatus::Approved,
            ClaimStatus::Denied,
            ClaimStatus::Paid,
        ]
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimStatus::Submitted => write!(f, "submitted"),
            ClaimStatus::Approved => write!(f, "approved"),
            ClaimStatus::Denied => write!(f, "denied"),
            ClaimStatus::Paid => write!(f, "paid"),
        }
    }
}

/// Claim against a patient's insurance for an invoice. The claim amount is
/// copied from the invoice total at submission; the insurer's answer lands
/// in `approved_amount`/`denied_amount` with a response timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsuranceClaim {
    pub claim_id: String,
    pub patient_id: String,
    pub invoice_id: String,
    pub insurance_provider: String,
    pub policy_number: String,
    pub submitted_date: DateTime<Utc>,
    pub status: ClaimStatus,
    pub claim_amount: f64,
    pub approved_amount: f64,
    pub denied_amount: f64,
    pub response_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
}

impl InsuranceClaim {
    pub fn new(
        claim_id: String,
        patient_id: String,
        invoice_id: String,
        insurance_provider: String,
        policy_number: String,
        claim_amount: f64,
    ) -> Self {
        Self {
            claim_id,
            patient_id,
            invoice_id,
            insurance_provider,
            policy_number,
            submitted_date: Utc::now(),
            status: ClaimStatus::Submitted,
            claim_amount,
            approved_amount: 0.0,
            denied_amount: 0.0,
            response_date: None,
            notes: String::new(),
        }
    }

    pub fn record_response(
        &mut self,
        status: ClaimStatus,
        approved_amount: f64,
        denied_amount: f64,
        notes: String,
    ) {
        self.status = status;
        self.approved_amount = approved_amount;
        self.denied_amount = denied_amount;
        self.notes = notes;
        self.response_date = Some(Utc::now());
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceRequest {
    pub patient_id: String,
    pub appointment_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceItemRequest {
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub service_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub amount: f64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsuranceInfoRequest {
    pub provider: String,
    pub policy_number: String,
    #[serde(default)]
    pub group_number: String,
    #[serde(default)]
    pub coverage_percentage: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateClaimRequest {
    pub patient_id: String,
    pub invoice_id: String,
    pub insurance_provider: String,
    pub policy_number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaimStatusRequest {
    pub status: ClaimStatus,
    #[serde(default)]
    pub approved_amount: f64,
    #[serde(default)]
    pub denied_amount: f64,
    #[serde(default)]
    pub notes: String,
}
