use tracing::info;

use tradeerp_core::DomainResult;
use tradeerp_events::EventHandler;
use tradeerp_purchasing::{PurchaseOrderCanceledEvent, PurchaseOrderReceivedEvent};

use crate::store::Transaction;

/// PO received → the originating request is done (VENDOR_SELECTED → CLOSED).
#[derive(Debug, Clone, Copy)]
pub struct ClosePurchaseRequestOnOrderReceived;

impl EventHandler<Transaction, PurchaseOrderReceivedEvent> for ClosePurchaseRequestOnOrderReceived {
    fn name(&self) -> &'static str {
        "purchasing.close_request"
    }

    fn handle(&self, tx: &mut Transaction, event: &PurchaseOrderReceivedEvent) -> DomainResult<()> {
        tx.purchase_requests_mut()
            .require_mut(&event.purchase_request_id, "purchase request")?
            .close(event.occurred_at)?;
        info!(purchase_request_id = %event.purchase_request_id, "purchase request closed");
        Ok(())
    }
}

/// PO canceled → reopen vendor selection on the request.
#[derive(Debug, Clone, Copy)]
pub struct RevertSelectionOnOrderCanceled;

impl EventHandler<Transaction, PurchaseOrderCanceledEvent> for RevertSelectionOnOrderCanceled {
    fn name(&self) -> &'static str {
        "purchasing.revert_selection"
    }

    fn handle(&self, tx: &mut Transaction, event: &PurchaseOrderCanceledEvent) -> DomainResult<()> {
        tx.purchase_requests_mut()
            .require_mut(&event.purchase_request_id, "purchase request")?
            .revert_vendor_selection(&event.rfq_item_id, event.occurred_at)?;
        info!(
            purchase_request_id = %event.purchase_request_id,
            rfq_item_id = %event.rfq_item_id,
            "vendor selection reverted"
        );
        Ok(())
    }
}
