//! Purchase order events consumed by other modules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tradeerp_admin::CompanyId;
use tradeerp_core::{Currency, DocumentNumber};
use tradeerp_events::DomainEvent;

use crate::order::{PurchaseOrderId, PurchaseOrderStatus};
use crate::request::{PurchaseRequestId, RfqItemId};

/// The vendor confirmed the order; a payable is owed from here on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseOrderConfirmedEvent {
    pub purchase_order_id: PurchaseOrderId,
    pub vendor_id: CompanyId,
    pub po_number: DocumentNumber,
    pub total_amount: Decimal,
    pub currency: Currency,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent for PurchaseOrderConfirmedEvent {
    fn event_type(&self) -> &'static str {
        "purchasing.order.confirmed"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Goods arrived for the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseOrderReceivedEvent {
    pub purchase_order_id: PurchaseOrderId,
    pub purchase_request_id: PurchaseRequestId,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent for PurchaseOrderReceivedEvent {
    fn event_type(&self) -> &'static str {
        "purchasing.order.received"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// The order was canceled before receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseOrderCanceledEvent {
    pub purchase_order_id: PurchaseOrderId,
    pub purchase_request_id: PurchaseRequestId,
    pub rfq_item_id: RfqItemId,
    pub previous_status: PurchaseOrderStatus,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent for PurchaseOrderCanceledEvent {
    fn event_type(&self) -> &'static str {
        "purchasing.order.canceled"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
