use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument};

use tradeerp_core::{DomainError, DomainResult, Entity, checked_sum};
use tradeerp_invoicing::{NewPayment, NewTaxInvoice, Payment, PaymentId, TaxInvoice, TaxInvoiceId};

use super::{ServiceResult, in_transaction};
use crate::config::AppConfig;
use crate::store::{Database, Tables};

/// Sum of customer payments received against `id`.
pub(crate) fn received_to_date(tables: &Tables, id: &TaxInvoiceId) -> DomainResult<Decimal> {
    let id = *id;
    let amounts = tables
        .payments()
        .filter(move |p| p.tax_invoice_id() == id)
        .map(|p| p.amount());
    checked_sum(amounts)
}

/// Tax invoices and the customer payments received against them.
#[derive(Debug, Clone)]
pub struct InvoicingService {
    db: Arc<Database>,
    tax_rate: Decimal,
    payment_terms_days: u32,
}

impl InvoicingService {
    pub fn new(db: Arc<Database>, config: &AppConfig) -> Self {
        Self {
            db,
            tax_rate: config.tax_rate,
            payment_terms_days: config.payment_terms_days,
        }
    }

    /// Draft an invoice by hand (delivery invoices are drafted by a handler).
    #[instrument(skip(self))]
    pub fn draft_invoice(&self, input: NewTaxInvoice) -> ServiceResult<TaxInvoiceId> {
        in_transaction(&self.db, |tx| {
            let project = tx.projects().require(&input.project_id, "project")?;
            if project.customer_id() != input.customer_id {
                return Err(DomainError::business(
                    "INVOICE_CUSTOMER_MISMATCH",
                    format!("customer is not the customer of project {}", project.code()),
                )
                .into());
            }
            if project.currency() != &input.currency {
                return Err(DomainError::business(
                    "CURRENCY_MISMATCH",
                    format!(
                        "invoice currency {} does not match project currency {}",
                        input.currency,
                        project.currency()
                    ),
                )
                .into());
            }
            let invoice = TaxInvoice::draft(
                TaxInvoiceId::generate(),
                tx.next_number("TI"),
                input,
                self.tax_rate,
                tx.now(),
            )?;
            let id = *invoice.id();
            info!(tax_invoice_id = %id, total = %invoice.total_amount(), "tax invoice drafted");
            tx.tax_invoices_mut().insert(invoice);
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn issue_invoice(&self, id: TaxInvoiceId) -> ServiceResult<TaxInvoiceId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            tx.tax_invoices_mut()
                .require_mut(&id, "tax invoice")?
                .issue(self.payment_terms_days, now)?;
            info!(tax_invoice_id = %id, "tax invoice issued");
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn cancel_invoice(&self, id: TaxInvoiceId) -> ServiceResult<TaxInvoiceId> {
        in_transaction(&self.db, |tx| {
            let received = received_to_date(tx, &id)?;
            let now = tx.now();
            tx.tax_invoices_mut()
                .require_mut(&id, "tax invoice")?
                .cancel(received, now)?;
            info!(tax_invoice_id = %id, "tax invoice canceled");
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn record_payment(&self, id: TaxInvoiceId, input: NewPayment) -> ServiceResult<PaymentId> {
        in_transaction(&self.db, |tx| {
            let received = received_to_date(tx, &id)?;
            let invoice = tx.tax_invoices().require(&id, "tax invoice")?;
            let payment = Payment::record(PaymentId::generate(), invoice, received, input, tx.now())?;
            let payment_id = *payment.id();
            info!(tax_invoice_id = %id, payment_id = %payment_id, amount = %payment.amount(), "payment received");
            tx.payments_mut().insert(payment);
            Ok(payment_id)
        })
    }
}
