use rust_decimal::Decimal;
use tracing::info;

use tradeerp_core::{DomainResult, Entity};
use tradeerp_events::EventHandler;
use tradeerp_invoicing::{TaxInvoice, TaxInvoiceId};
use tradeerp_projects::DeliveryCompletedEvent;

use crate::store::Transaction;

/// Delivery completed → draft the tax invoice for what was delivered.
#[derive(Debug, Clone)]
pub struct DraftInvoiceOnDeliveryCompleted {
    tax_rate: Decimal,
}

impl DraftInvoiceOnDeliveryCompleted {
    pub fn new(tax_rate: Decimal) -> Self {
        Self { tax_rate }
    }
}

impl EventHandler<Transaction, DeliveryCompletedEvent> for DraftInvoiceOnDeliveryCompleted {
    fn name(&self) -> &'static str {
        "invoicing.draft_for_delivery"
    }

    fn handle(&self, tx: &mut Transaction, event: &DeliveryCompletedEvent) -> DomainResult<()> {
        let invoice = TaxInvoice::draft_for_delivery(
            TaxInvoiceId::generate(),
            tx.next_number("TI"),
            event,
            self.tax_rate,
        )?;
        info!(
            tax_invoice_id = %invoice.id(),
            delivery_id = %event.delivery_id,
            total = %invoice.total_amount(),
            "tax invoice drafted"
        );
        tx.tax_invoices_mut().insert(invoice);
        Ok(())
    }
}
