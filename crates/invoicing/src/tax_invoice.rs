use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use tradeerp_admin::CompanyId;
use tradeerp_core::{
    Currency, DocumentNumber, DomainError, DomainResult, Entity, SettlementStatus,
    checked_add, checked_mul, ensure_positive_amount, remaining_balance, typed_id,
};
use tradeerp_projects::{DeliveryCompletedEvent, DeliveryId, ProjectId};

typed_id!(TaxInvoiceId, "tax invoice id");
typed_id!(PaymentId, "payment id");

/// Stored invoice status. Payment progress is never stored; see
/// [`TaxInvoice::settlement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxInvoiceStatus {
    Draft,
    Issued,
    Canceled,
}

impl TaxInvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxInvoiceStatus::Draft => "DRAFT",
            TaxInvoiceStatus::Issued => "ISSUED",
            TaxInvoiceStatus::Canceled => "CANCELED",
        }
    }
}

/// Tax on `supply_amount`, rounded half away from zero to two places.
pub fn compute_tax(supply_amount: Decimal, tax_rate: Decimal) -> DomainResult<Decimal> {
    Ok(checked_mul(supply_amount, tax_rate)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTaxInvoice {
    pub project_id: ProjectId,
    pub customer_id: CompanyId,
    pub supply_amount: Decimal,
    pub currency: Currency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxInvoice {
    id: TaxInvoiceId,
    invoice_number: DocumentNumber,
    project_id: ProjectId,
    customer_id: CompanyId,
    delivery_id: Option<DeliveryId>,
    supply_amount: Decimal,
    tax_amount: Decimal,
    total_amount: Decimal,
    currency: Currency,
    status: TaxInvoiceStatus,
    issue_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaxInvoice {
    /// Draft a manual invoice.
    pub fn draft(
        id: TaxInvoiceId,
        invoice_number: DocumentNumber,
        input: NewTaxInvoice,
        tax_rate: Decimal,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Self::build(id, invoice_number, input, None, tax_rate, now)
    }

    /// Draft the invoice for a completed delivery.
    pub fn draft_for_delivery(
        id: TaxInvoiceId,
        invoice_number: DocumentNumber,
        event: &DeliveryCompletedEvent,
        tax_rate: Decimal,
    ) -> DomainResult<Self> {
        let input = NewTaxInvoice {
            project_id: event.project_id,
            customer_id: event.customer_id,
            supply_amount: event.amount,
            currency: event.currency.clone(),
        };
        Self::build(
            id,
            invoice_number,
            input,
            Some(event.delivery_id),
            tax_rate,
            event.occurred_at,
        )
    }

    fn build(
        id: TaxInvoiceId,
        invoice_number: DocumentNumber,
        input: NewTaxInvoice,
        delivery_id: Option<DeliveryId>,
        tax_rate: Decimal,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        ensure_positive_amount("supply_amount", input.supply_amount)?;
        if tax_rate < Decimal::ZERO {
            return Err(DomainError::validation("tax rate must not be negative"));
        }
        let tax_amount = compute_tax(input.supply_amount, tax_rate)?;
        let total_amount = checked_add(input.supply_amount, tax_amount)?;
        Ok(Self {
            id,
            invoice_number,
            project_id: input.project_id,
            customer_id: input.customer_id,
            delivery_id,
            supply_amount: input.supply_amount,
            tax_amount,
            total_amount,
            currency: input.currency,
            status: TaxInvoiceStatus::Draft,
            issue_date: None,
            due_date: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn invoice_number(&self) -> &DocumentNumber {
        &self.invoice_number
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn customer_id(&self) -> CompanyId {
        self.customer_id
    }

    pub fn delivery_id(&self) -> Option<DeliveryId> {
        self.delivery_id
    }

    pub fn supply_amount(&self) -> Decimal {
        self.supply_amount
    }

    pub fn tax_amount(&self) -> Decimal {
        self.tax_amount
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn status(&self) -> TaxInvoiceStatus {
        self.status
    }

    pub fn issue_date(&self) -> Option<NaiveDate> {
        self.issue_date
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn settlement(&self, paid: Decimal) -> SettlementStatus {
        SettlementStatus::calculate(self.total_amount, paid)
    }

    pub fn remaining(&self, paid: Decimal) -> Decimal {
        remaining_balance(self.total_amount, paid)
    }

    /// DRAFT → ISSUED; the due date follows the payment terms.
    pub fn issue(&mut self, payment_terms_days: u32, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != TaxInvoiceStatus::Draft {
            return Err(self.invalid_status("issue"));
        }
        let issue_date = now.date_naive();
        self.issue_date = Some(issue_date);
        self.due_date = Some(issue_date + Duration::days(i64::from(payment_terms_days)));
        self.status = TaxInvoiceStatus::Issued;
        self.updated_at = now;
        Ok(())
    }

    pub fn cancel(&mut self, paid_so_far: Decimal, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status == TaxInvoiceStatus::Canceled {
            return Err(self.invalid_status("cancel"));
        }
        if paid_so_far > Decimal::ZERO {
            return Err(DomainError::business(
                "INVOICE_HAS_PAYMENTS",
                format!(
                    "tax invoice {} already has {paid_so_far} received",
                    self.invoice_number
                ),
            ));
        }
        self.status = TaxInvoiceStatus::Canceled;
        self.updated_at = now;
        Ok(())
    }

    pub fn ensure_accepts_payment(&self, paid_so_far: Decimal, amount: Decimal) -> DomainResult<()> {
        ensure_positive_amount("amount", amount)?;
        if self.status != TaxInvoiceStatus::Issued {
            return Err(self.invalid_status("receive a payment for"));
        }
        if checked_add(paid_so_far, amount)? > self.total_amount {
            return Err(DomainError::business(
                "INVOICE_OVERPAYMENT",
                format!(
                    "payment of {amount} exceeds the remaining balance {} of {}",
                    self.remaining(paid_so_far),
                    self.invoice_number
                ),
            ));
        }
        Ok(())
    }

    fn invalid_status(&self, action: &str) -> DomainError {
        DomainError::business(
            "INVOICE_INVALID_STATUS",
            format!(
                "cannot {action} tax invoice {} in status {}",
                self.invoice_number,
                self.status.as_str()
            ),
        )
    }
}

impl Entity for TaxInvoice {
    type Id = TaxInvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    pub amount: Decimal,
    #[serde(default)]
    pub reference: Option<String>,
}

/// A customer payment received against one tax invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payment {
    id: PaymentId,
    tax_invoice_id: TaxInvoiceId,
    amount: Decimal,
    received_at: DateTime<Utc>,
    reference: Option<String>,
}

impl Payment {
    pub fn record(
        id: PaymentId,
        invoice: &TaxInvoice,
        paid_so_far: Decimal,
        input: NewPayment,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        invoice.ensure_accepts_payment(paid_so_far, input.amount)?;
        Ok(Self {
            id,
            tax_invoice_id: *invoice.id(),
            amount: input.amount,
            received_at: now,
            reference: input.reference.filter(|r| !r.trim().is_empty()),
        })
    }

    pub fn tax_invoice_id(&self) -> TaxInvoiceId {
        self.tax_invoice_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}

impl Entity for Payment {
    type Id = PaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
