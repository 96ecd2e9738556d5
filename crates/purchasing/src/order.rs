use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradeerp_admin::CompanyId;
use tradeerp_core::{Currency, DocumentNumber, DomainError, DomainResult, Entity, typed_id};

use crate::events::{
    PurchaseOrderCanceledEvent, PurchaseOrderConfirmedEvent, PurchaseOrderReceivedEvent,
};
use crate::request::{PurchaseRequest, PurchaseRequestId, PurchaseRequestStatus, RfqItemId, RfqItemStatus};

typed_id!(
    /// Purchase order identifier.
    PurchaseOrderId,
    "purchase order id"
);

/// Purchase order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseOrderStatus {
    Draft,
    Sent,
    Confirmed,
    Received,
    Canceled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Draft => "DRAFT",
            PurchaseOrderStatus::Sent => "SENT",
            PurchaseOrderStatus::Confirmed => "CONFIRMED",
            PurchaseOrderStatus::Received => "RECEIVED",
            PurchaseOrderStatus::Canceled => "CANCELED",
        }
    }
}

/// Entity: PurchaseOrder, raised from a selected RFQ item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseOrder {
    id: PurchaseOrderId,
    po_number: DocumentNumber,
    purchase_request_id: PurchaseRequestId,
    rfq_item_id: RfqItemId,
    vendor_id: CompanyId,
    total_amount: Decimal,
    currency: Currency,
    status: PurchaseOrderStatus,
    expected_delivery: Option<NaiveDate>,
    cancel_reason: Option<String>,
    sent_at: Option<DateTime<Utc>>,
    confirmed_at: Option<DateTime<Utc>>,
    received_at: Option<DateTime<Utc>>,
    canceled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PurchaseOrder {
    /// Raise a DRAFT order from the request's selected item.
    ///
    /// The "one open order per request" rule needs the store and is checked
    /// by the purchasing service.
    pub fn create_from_selection(
        id: PurchaseOrderId,
        po_number: DocumentNumber,
        request: &PurchaseRequest,
        item_id: &RfqItemId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if request.status() != PurchaseRequestStatus::VendorSelected {
            return Err(DomainError::business(
                "PURCHASE_REQUEST_INVALID_STATUS",
                format!(
                    "purchase request {} has no selected vendor (status {})",
                    request.request_number(),
                    request.status().as_str()
                ),
            ));
        }
        let item = request
            .item(item_id)
            .ok_or_else(|| DomainError::not_found(format!("rfq item {item_id}")))?;
        if item.status() != RfqItemStatus::Selected {
            return Err(DomainError::business(
                "RFQ_ITEM_INVALID_STATUS",
                format!("rfq item {item_id} is {}, expected SELECTED", item.status().as_str()),
            ));
        }
        let total_amount = item
            .quoted_amount()
            .ok_or_else(|| DomainError::validation("selected rfq item has no quoted amount"))?;
        let expected_delivery = item
            .lead_time_days()
            .map(|days| (now + chrono::Duration::days(i64::from(days))).date_naive());

        Ok(Self {
            id,
            po_number,
            purchase_request_id: *request.id(),
            rfq_item_id: item_id.clone(),
            vendor_id: item.vendor_id(),
            total_amount,
            currency: request.currency().clone(),
            status: PurchaseOrderStatus::Draft,
            expected_delivery,
            cancel_reason: None,
            sent_at: None,
            confirmed_at: None,
            received_at: None,
            canceled_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn po_number(&self) -> &DocumentNumber {
        &self.po_number
    }

    pub fn purchase_request_id(&self) -> PurchaseRequestId {
        self.purchase_request_id
    }

    pub fn rfq_item_id(&self) -> &RfqItemId {
        &self.rfq_item_id
    }

    pub fn vendor_id(&self) -> CompanyId {
        self.vendor_id
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn status(&self) -> PurchaseOrderStatus {
        self.status
    }

    pub fn expected_delivery(&self) -> Option<NaiveDate> {
        self.expected_delivery
    }

    pub fn cancel_reason(&self) -> Option<&str> {
        self.cancel_reason.as_deref()
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    pub fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        self.confirmed_at
    }

    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        self.received_at
    }

    pub fn canceled_at(&self) -> Option<DateTime<Utc>> {
        self.canceled_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_open(&self) -> bool {
        self.status != PurchaseOrderStatus::Canceled
    }

    /// DRAFT → SENT.
    pub fn send(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_status(PurchaseOrderStatus::Draft, "send")?;
        self.status = PurchaseOrderStatus::Sent;
        self.sent_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// SENT → CONFIRMED.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> DomainResult<PurchaseOrderConfirmedEvent> {
        self.ensure_status(PurchaseOrderStatus::Sent, "confirm")?;
        self.status = PurchaseOrderStatus::Confirmed;
        self.confirmed_at = Some(now);
        self.updated_at = now;

        Ok(PurchaseOrderConfirmedEvent {
            purchase_order_id: self.id,
            vendor_id: self.vendor_id,
            po_number: self.po_number.clone(),
            total_amount: self.total_amount,
            currency: self.currency.clone(),
            occurred_at: now,
        })
    }

    /// CONFIRMED → RECEIVED.
    pub fn receive(&mut self, now: DateTime<Utc>) -> DomainResult<PurchaseOrderReceivedEvent> {
        self.ensure_status(PurchaseOrderStatus::Confirmed, "receive")?;
        self.status = PurchaseOrderStatus::Received;
        self.received_at = Some(now);
        self.updated_at = now;

        Ok(PurchaseOrderReceivedEvent {
            purchase_order_id: self.id,
            purchase_request_id: self.purchase_request_id,
            occurred_at: now,
        })
    }

    /// Cancel from DRAFT, SENT or CONFIRMED.
    pub fn cancel(
        &mut self,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<PurchaseOrderCanceledEvent> {
        if matches!(
            self.status,
            PurchaseOrderStatus::Received | PurchaseOrderStatus::Canceled
        ) {
            return Err(self.invalid_status("cancel"));
        }
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let previous_status = self.status;
        self.status = PurchaseOrderStatus::Canceled;
        self.cancel_reason = reason.clone();
        self.canceled_at = Some(now);
        self.updated_at = now;

        Ok(PurchaseOrderCanceledEvent {
            purchase_order_id: self.id,
            purchase_request_id: self.purchase_request_id,
            rfq_item_id: self.rfq_item_id.clone(),
            previous_status,
            reason,
            occurred_at: now,
        })
    }

    fn ensure_status(&self, expected: PurchaseOrderStatus, action: &str) -> DomainResult<()> {
        if self.status != expected {
            return Err(self.invalid_status(action));
        }
        Ok(())
    }

    fn invalid_status(&self, action: &str) -> DomainError {
        DomainError::business(
            "PO_INVALID_STATUS",
            format!(
                "cannot {action} purchase order {} in status {}",
                self.po_number,
                self.status.as_str()
            ),
        )
    }
}

impl Entity for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
