//! Purchase requests and their RFQ items.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradeerp_admin::CompanyId;
use tradeerp_core::{
    Currency, DocumentNumber, DomainError, DomainResult, Entity, EntityId,
    ensure_positive_amount, typed_id,
};
use tradeerp_projects::ProjectId;

typed_id!(
    /// Purchase request identifier.
    PurchaseRequestId,
    "purchase request id"
);

/// Opaque RFQ item identifier (`rfq-<32 hex>`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RfqItemId(String);

impl RfqItemId {
    pub fn generate() -> Self {
        Self(format!("rfq-{}", EntityId::new().as_uuid().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RfqItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for RfqItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(DomainError::invalid_id("rfq item id must not be empty"));
        }
        Ok(Self(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseRequestStatus {
    Draft,
    RfqSent,
    VendorSelected,
    Closed,
    Canceled,
}

impl PurchaseRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseRequestStatus::Draft => "DRAFT",
            PurchaseRequestStatus::RfqSent => "RFQ_SENT",
            PurchaseRequestStatus::VendorSelected => "VENDOR_SELECTED",
            PurchaseRequestStatus::Closed => "CLOSED",
            PurchaseRequestStatus::Canceled => "CANCELED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RfqItemStatus {
    Sent,
    Replied,
    Selected,
    Rejected,
    NoResponse,
}

impl RfqItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RfqItemStatus::Sent => "SENT",
            RfqItemStatus::Replied => "REPLIED",
            RfqItemStatus::Selected => "SELECTED",
            RfqItemStatus::Rejected => "REJECTED",
            RfqItemStatus::NoResponse => "NO_RESPONSE",
        }
    }
}

/// One vendor's side of an RFQ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RfqItem {
    id: RfqItemId,
    vendor_id: CompanyId,
    status: RfqItemStatus,
    quoted_amount: Option<Decimal>,
    lead_time_days: Option<u32>,
    sent_at: DateTime<Utc>,
    replied_at: Option<DateTime<Utc>>,
}

impl RfqItem {
    pub fn id(&self) -> &RfqItemId {
        &self.id
    }

    pub fn vendor_id(&self) -> CompanyId {
        self.vendor_id
    }

    pub fn status(&self) -> RfqItemStatus {
        self.status
    }

    pub fn quoted_amount(&self) -> Option<Decimal> {
        self.quoted_amount
    }

    pub fn lead_time_days(&self) -> Option<u32> {
        self.lead_time_days
    }

    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }

    pub fn replied_at(&self) -> Option<DateTime<Utc>> {
        self.replied_at
    }

    fn invalid_status(&self, expected: RfqItemStatus) -> DomainError {
        DomainError::business(
            "RFQ_ITEM_INVALID_STATUS",
            format!(
                "rfq item {} is {}, expected {}",
                self.id,
                self.status.as_str(),
                expected.as_str()
            ),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPurchaseRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    pub currency: Currency,
    #[serde(default)]
    pub needed_by: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseRequest {
    id: PurchaseRequestId,
    request_number: DocumentNumber,
    title: String,
    description: Option<String>,
    project_id: Option<ProjectId>,
    currency: Currency,
    needed_by: Option<NaiveDate>,
    status: PurchaseRequestStatus,
    items: Vec<RfqItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PurchaseRequest {
    pub fn create(
        id: PurchaseRequestId,
        request_number: DocumentNumber,
        input: NewPurchaseRequest,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::validation("title must not be empty"));
        }
        Ok(Self {
            id,
            request_number,
            title,
            description: input.description,
            project_id: input.project_id,
            currency: input.currency,
            needed_by: input.needed_by,
            status: PurchaseRequestStatus::Draft,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn request_number(&self) -> &DocumentNumber {
        &self.request_number
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn needed_by(&self) -> Option<NaiveDate> {
        self.needed_by
    }

    pub fn status(&self) -> PurchaseRequestStatus {
        self.status
    }

    pub fn items(&self) -> &[RfqItem] {
        &self.items
    }

    pub fn item(&self, item_id: &RfqItemId) -> Option<&RfqItem> {
        self.items.iter().find(|i| &i.id == item_id)
    }

    pub fn selected_item(&self) -> Option<&RfqItem> {
        self.items
            .iter()
            .find(|i| i.status == RfqItemStatus::Selected)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Send RFQs to `vendor_ids`; one new item per vendor.
    ///
    /// Allowed while DRAFT or RFQ_SENT so late vendors can be added. A vendor
    /// already on the request (or listed twice) is rejected.
    pub fn send_rfq(
        &mut self,
        vendor_ids: &[CompanyId],
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<RfqItemId>> {
        if !matches!(
            self.status,
            PurchaseRequestStatus::Draft | PurchaseRequestStatus::RfqSent
        ) {
            return Err(self.invalid_status("send an RFQ for"));
        }
        if vendor_ids.is_empty() {
            return Err(DomainError::validation("vendor_ids must not be empty"));
        }
        for (idx, vendor_id) in vendor_ids.iter().enumerate() {
            let repeated = vendor_ids[..idx].contains(vendor_id)
                || self.items.iter().any(|i| &i.vendor_id == vendor_id);
            if repeated {
                return Err(DomainError::business(
                    "RFQ_DUPLICATE_VENDOR",
                    format!(
                        "vendor {vendor_id} already has an RFQ on request {}",
                        self.request_number
                    ),
                ));
            }
        }

        let mut created = Vec::with_capacity(vendor_ids.len());
        for vendor_id in vendor_ids {
            let id = RfqItemId::generate();
            self.items.push(RfqItem {
                id: id.clone(),
                vendor_id: *vendor_id,
                status: RfqItemStatus::Sent,
                quoted_amount: None,
                lead_time_days: None,
                sent_at: now,
                replied_at: None,
            });
            created.push(id);
        }
        self.status = PurchaseRequestStatus::RfqSent;
        self.updated_at = now;
        Ok(created)
    }

    /// Record a vendor's quote (SENT → REPLIED).
    pub fn record_reply(
        &mut self,
        item_id: &RfqItemId,
        amount: Decimal,
        lead_time_days: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_status(PurchaseRequestStatus::RfqSent, "record a reply on")?;
        ensure_positive_amount("amount", amount)?;
        let item = self.item_mut(item_id)?;
        if item.status != RfqItemStatus::Sent {
            return Err(item.invalid_status(RfqItemStatus::Sent));
        }
        item.status = RfqItemStatus::Replied;
        item.quoted_amount = Some(amount);
        item.lead_time_days = Some(lead_time_days);
        item.replied_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// SENT → NO_RESPONSE.
    pub fn mark_no_response(&mut self, item_id: &RfqItemId, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_status(PurchaseRequestStatus::RfqSent, "update an RFQ item on")?;
        let item = self.item_mut(item_id)?;
        if item.status != RfqItemStatus::Sent {
            return Err(item.invalid_status(RfqItemStatus::Sent));
        }
        item.status = RfqItemStatus::NoResponse;
        self.updated_at = now;
        Ok(())
    }

    /// Select the winning vendor.
    ///
    /// The item must be REPLIED. It becomes SELECTED, every other REPLIED
    /// item becomes REJECTED and the request moves to VENDOR_SELECTED. All or
    /// nothing: on error no item is touched.
    pub fn select_vendor(&mut self, item_id: &RfqItemId, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_status(PurchaseRequestStatus::RfqSent, "select a vendor for")?;
        let item = self.item_mut(item_id)?;
        if item.status != RfqItemStatus::Replied {
            return Err(item.invalid_status(RfqItemStatus::Replied));
        }

        for item in &mut self.items {
            if &item.id == item_id {
                item.status = RfqItemStatus::Selected;
            } else if item.status == RfqItemStatus::Replied {
                item.status = RfqItemStatus::Rejected;
            }
        }
        self.status = PurchaseRequestStatus::VendorSelected;
        self.updated_at = now;
        Ok(())
    }

    /// Undo a selection after its purchase order was canceled.
    ///
    /// The selected item and every REJECTED sibling go back to REPLIED so a
    /// new vendor can be chosen; the request returns to RFQ_SENT.
    pub fn revert_vendor_selection(
        &mut self,
        item_id: &RfqItemId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_status(PurchaseRequestStatus::VendorSelected, "revert the selection of")?;
        let item = self.item_mut(item_id)?;
        if item.status != RfqItemStatus::Selected {
            return Err(item.invalid_status(RfqItemStatus::Selected));
        }

        for item in &mut self.items {
            if matches!(item.status, RfqItemStatus::Selected | RfqItemStatus::Rejected) {
                item.status = RfqItemStatus::Replied;
            }
        }
        self.status = PurchaseRequestStatus::RfqSent;
        self.updated_at = now;
        Ok(())
    }

    /// VENDOR_SELECTED → CLOSED (goods received).
    pub fn close(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_status(PurchaseRequestStatus::VendorSelected, "close")?;
        self.status = PurchaseRequestStatus::Closed;
        self.updated_at = now;
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if matches!(
            self.status,
            PurchaseRequestStatus::Closed | PurchaseRequestStatus::Canceled
        ) {
            return Err(self.invalid_status("cancel"));
        }
        self.status = PurchaseRequestStatus::Canceled;
        self.updated_at = now;
        Ok(())
    }

    fn ensure_status(&self, expected: PurchaseRequestStatus, action: &str) -> DomainResult<()> {
        if self.status != expected {
            return Err(self.invalid_status(action));
        }
        Ok(())
    }

    fn invalid_status(&self, action: &str) -> DomainError {
        DomainError::business(
            "PURCHASE_REQUEST_INVALID_STATUS",
            format!(
                "cannot {action} purchase request {} in status {}",
                self.request_number,
                self.status.as_str()
            ),
        )
    }

    fn item_mut(&mut self, item_id: &RfqItemId) -> DomainResult<&mut RfqItem> {
        self.items
            .iter_mut()
            .find(|i| &i.id == item_id)
            .ok_or_else(|| DomainError::not_found(format!("rfq item {item_id}")))
    }
}

impl Entity for PurchaseRequest {
    type Id = PurchaseRequestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
