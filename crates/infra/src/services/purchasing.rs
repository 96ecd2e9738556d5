use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument};

use tradeerp_admin::CompanyId;
use tradeerp_core::{DomainError, Entity};
use tradeerp_events::EventPublisher;
use tradeerp_purchasing::{
    NewPurchaseRequest, PurchaseOrder, PurchaseOrderId, PurchaseRequest, PurchaseRequestId,
    RfqItemId,
};

use super::{ServiceResult, in_transaction};
use crate::store::{Database, Tables, Transaction};

/// The RFQ → vendor selection → purchase order workflow.
#[derive(Debug, Clone)]
pub struct PurchasingService<P> {
    db: Arc<Database>,
    publisher: P,
}

fn open_order_for(tables: &Tables, request_id: PurchaseRequestId) -> Option<&PurchaseOrder> {
    tables
        .purchase_orders()
        .find(move |po| po.purchase_request_id() == request_id && po.is_open())
}

impl<P: EventPublisher<Transaction>> PurchasingService<P> {
    pub fn new(db: Arc<Database>, publisher: P) -> Self {
        Self { db, publisher }
    }

    #[instrument(skip(self))]
    pub fn create_request(&self, input: NewPurchaseRequest) -> ServiceResult<PurchaseRequestId> {
        in_transaction(&self.db, |tx| {
            if let Some(project_id) = input.project_id {
                tx.projects().require(&project_id, "project")?;
            }
            let request = PurchaseRequest::create(
                PurchaseRequestId::generate(),
                tx.next_number("PR"),
                input,
                tx.now(),
            )?;
            let id = *request.id();
            info!(purchase_request_id = %id, number = %request.request_number(), "purchase request created");
            tx.purchase_requests_mut().insert(request);
            Ok(id)
        })
    }

    /// Send RFQs to active vendors; returns the new item ids.
    #[instrument(skip(self))]
    pub fn send_rfq(
        &self,
        id: PurchaseRequestId,
        vendor_ids: Vec<CompanyId>,
    ) -> ServiceResult<Vec<RfqItemId>> {
        in_transaction(&self.db, |tx| {
            for vendor_id in &vendor_ids {
                tx.companies()
                    .require(vendor_id, "company")?
                    .ensure_active_vendor()?;
            }
            let now = tx.now();
            let items = tx
                .purchase_requests_mut()
                .require_mut(&id, "purchase request")?
                .send_rfq(&vendor_ids, now)?;
            info!(purchase_request_id = %id, vendors = items.len(), "rfq sent");
            Ok(items)
        })
    }

    #[instrument(skip(self))]
    pub fn record_reply(
        &self,
        id: PurchaseRequestId,
        item_id: RfqItemId,
        amount: Decimal,
        lead_time_days: u32,
    ) -> ServiceResult<PurchaseRequestId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            tx.purchase_requests_mut()
                .require_mut(&id, "purchase request")?
                .record_reply(&item_id, amount, lead_time_days, now)?;
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn mark_no_response(
        &self,
        id: PurchaseRequestId,
        item_id: RfqItemId,
    ) -> ServiceResult<PurchaseRequestId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            tx.purchase_requests_mut()
                .require_mut(&id, "purchase request")?
                .mark_no_response(&item_id, now)?;
            Ok(id)
        })
    }

    /// Select the winning RFQ item; every other replied item is rejected in
    /// the same unit of work.
    #[instrument(skip(self))]
    pub fn select_vendor(
        &self,
        id: PurchaseRequestId,
        item_id: RfqItemId,
    ) -> ServiceResult<PurchaseRequestId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            tx.purchase_requests_mut()
                .require_mut(&id, "purchase request")?
                .select_vendor(&item_id, now)?;
            info!(purchase_request_id = %id, rfq_item_id = %item_id, "vendor selected");
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn cancel_request(&self, id: PurchaseRequestId) -> ServiceResult<PurchaseRequestId> {
        in_transaction(&self.db, |tx| {
            if let Some(po) = open_order_for(tx, id) {
                return Err(DomainError::business(
                    "PURCHASE_REQUEST_HAS_OPEN_ORDER",
                    format!("cancel purchase order {} first", po.po_number()),
                )
                .into());
            }
            let now = tx.now();
            tx.purchase_requests_mut()
                .require_mut(&id, "purchase request")?
                .cancel(now)?;
            info!(purchase_request_id = %id, "purchase request canceled");
            Ok(id)
        })
    }

    /// Raise a DRAFT purchase order from the request's selected item.
    #[instrument(skip(self))]
    pub fn create_order(
        &self,
        request_id: PurchaseRequestId,
        item_id: RfqItemId,
    ) -> ServiceResult<PurchaseOrderId> {
        in_transaction(&self.db, |tx| {
            if let Some(po) = open_order_for(tx, request_id) {
                return Err(DomainError::business(
                    "PO_ALREADY_EXISTS",
                    format!(
                        "purchase request already has open purchase order {}",
                        po.po_number()
                    ),
                )
                .into());
            }
            let request = tx
                .purchase_requests()
                .require(&request_id, "purchase request")?;
            let order = PurchaseOrder::create_from_selection(
                PurchaseOrderId::generate(),
                tx.next_number("PO"),
                request,
                &item_id,
                tx.now(),
            )?;
            let id = *order.id();
            info!(
                purchase_order_id = %id,
                po_number = %order.po_number(),
                total = %order.total_amount(),
                "purchase order created"
            );
            tx.purchase_orders_mut().insert(order);
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn send_order(&self, id: PurchaseOrderId) -> ServiceResult<PurchaseOrderId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            tx.purchase_orders_mut()
                .require_mut(&id, "purchase order")?
                .send(now)?;
            info!(purchase_order_id = %id, "purchase order sent");
            Ok(id)
        })
    }

    /// SENT → CONFIRMED; the payable is created by the confirmed-order handler.
    #[instrument(skip(self))]
    pub fn confirm_order(&self, id: PurchaseOrderId) -> ServiceResult<PurchaseOrderId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            let event = tx
                .purchase_orders_mut()
                .require_mut(&id, "purchase order")?
                .confirm(now)?;
            self.publisher.publish(tx, event)?;
            info!(purchase_order_id = %id, "purchase order confirmed");
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn receive_order(&self, id: PurchaseOrderId) -> ServiceResult<PurchaseOrderId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            let event = tx
                .purchase_orders_mut()
                .require_mut(&id, "purchase order")?
                .receive(now)?;
            self.publisher.publish(tx, event)?;
            info!(purchase_order_id = %id, "purchase order received");
            Ok(id)
        })
    }

    /// Cancel the order; handlers void its payable and reopen vendor selection.
    #[instrument(skip(self))]
    pub fn cancel_order(
        &self,
        id: PurchaseOrderId,
        reason: Option<String>,
    ) -> ServiceResult<PurchaseOrderId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            let event = tx
                .purchase_orders_mut()
                .require_mut(&id, "purchase order")?
                .cancel(reason, now)?;
            self.publisher.publish(tx, event)?;
            info!(purchase_order_id = %id, "purchase order canceled");
            Ok(id)
        })
    }
}
