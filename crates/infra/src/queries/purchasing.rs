use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradeerp_admin::CompanyId;
use tradeerp_core::{Currency, DocumentNumber, DomainResult, Entity};
use tradeerp_projects::ProjectId;
use tradeerp_purchasing::{
    PurchaseOrder, PurchaseOrderId, PurchaseOrderStatus, PurchaseRequest, PurchaseRequestId,
    PurchaseRequestStatus, RfqItemId, RfqItemStatus,
};

use super::{Page, PageRequest, company_names, name_of};
use crate::store::Tables;

// ─────────────────────────────────────────────────────────────────────────────
// Purchase requests
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfqItemView {
    pub id: RfqItemId,
    pub vendor_id: CompanyId,
    pub vendor_name: String,
    pub status: RfqItemStatus,
    pub quoted_amount: Option<Decimal>,
    pub lead_time_days: Option<u32>,
    pub sent_at: DateTime<Utc>,
    pub replied_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseRequestView {
    pub id: PurchaseRequestId,
    pub request_number: DocumentNumber,
    pub title: String,
    pub description: Option<String>,
    pub project_id: Option<ProjectId>,
    pub currency: Currency,
    pub needed_by: Option<NaiveDate>,
    pub status: PurchaseRequestStatus,
    pub items: Vec<RfqItemView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn request_view(r: &PurchaseRequest, names: &HashMap<CompanyId, &str>) -> PurchaseRequestView {
    PurchaseRequestView {
        id: *r.id(),
        request_number: r.request_number().clone(),
        title: r.title().to_string(),
        description: r.description().map(str::to_string),
        project_id: r.project_id(),
        currency: r.currency().clone(),
        needed_by: r.needed_by(),
        status: r.status(),
        items: r
            .items()
            .iter()
            .map(|item| RfqItemView {
                id: item.id().clone(),
                vendor_id: item.vendor_id(),
                vendor_name: name_of(names, item.vendor_id()),
                status: item.status(),
                quoted_amount: item.quoted_amount(),
                lead_time_days: item.lead_time_days(),
                sent_at: item.sent_at(),
                replied_at: item.replied_at(),
            })
            .collect(),
        created_at: r.created_at(),
        updated_at: r.updated_at(),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseRequestFilter {
    pub status: Option<PurchaseRequestStatus>,
    pub project_id: Option<ProjectId>,
}

pub fn list_requests(
    tables: &Tables,
    filter: &PurchaseRequestFilter,
    page: PageRequest,
) -> Page<PurchaseRequestView> {
    let names = company_names(tables);
    Page::collect(
        tables
            .purchase_requests()
            .iter()
            .rev()
            .filter(|r| filter.status.is_none_or(|s| r.status() == s))
            .filter(|r| filter.project_id.is_none_or(|p| r.project_id() == Some(p)))
            .map(|r| request_view(r, &names)),
        page,
    )
}

pub fn request_detail(tables: &Tables, id: PurchaseRequestId) -> DomainResult<PurchaseRequestView> {
    let request = tables.purchase_requests().require(&id, "purchase request")?;
    Ok(request_view(request, &company_names(tables)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Purchase orders
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseOrderView {
    pub id: PurchaseOrderId,
    pub po_number: DocumentNumber,
    pub purchase_request_id: PurchaseRequestId,
    pub request_number: String,
    pub rfq_item_id: RfqItemId,
    pub vendor_id: CompanyId,
    pub vendor_name: String,
    pub total_amount: Decimal,
    pub currency: Currency,
    pub status: PurchaseOrderStatus,
    pub expected_delivery: Option<NaiveDate>,
    pub cancel_reason: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

fn order_view(
    o: &PurchaseOrder,
    numbers: &HashMap<PurchaseRequestId, &str>,
    names: &HashMap<CompanyId, &str>,
) -> PurchaseOrderView {
    PurchaseOrderView {
        id: *o.id(),
        po_number: o.po_number().clone(),
        purchase_request_id: o.purchase_request_id(),
        request_number: numbers
            .get(&o.purchase_request_id())
            .map(|n| n.to_string())
            .unwrap_or_default(),
        rfq_item_id: o.rfq_item_id().clone(),
        vendor_id: o.vendor_id(),
        vendor_name: name_of(names, o.vendor_id()),
        total_amount: o.total_amount(),
        currency: o.currency().clone(),
        status: o.status(),
        expected_delivery: o.expected_delivery(),
        cancel_reason: o.cancel_reason().map(str::to_string),
        sent_at: o.sent_at(),
        confirmed_at: o.confirmed_at(),
        received_at: o.received_at(),
        canceled_at: o.canceled_at(),
        created_at: o.created_at(),
    }
}

fn request_numbers(tables: &Tables) -> HashMap<PurchaseRequestId, &str> {
    tables
        .purchase_requests()
        .iter()
        .map(|r| (*r.id(), r.request_number().as_str()))
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseOrderFilter {
    pub status: Option<PurchaseOrderStatus>,
    pub vendor_id: Option<CompanyId>,
    pub purchase_request_id: Option<PurchaseRequestId>,
}

pub fn list_orders(
    tables: &Tables,
    filter: &PurchaseOrderFilter,
    page: PageRequest,
) -> Page<PurchaseOrderView> {
    let numbers = request_numbers(tables);
    let names = company_names(tables);
    Page::collect(
        tables
            .purchase_orders()
            .iter()
            .rev()
            .filter(|o| filter.status.is_none_or(|s| o.status() == s))
            .filter(|o| filter.vendor_id.is_none_or(|v| o.vendor_id() == v))
            .filter(|o| {
                filter
                    .purchase_request_id
                    .is_none_or(|r| o.purchase_request_id() == r)
            })
            .map(|o| order_view(o, &numbers, &names)),
        page,
    )
}

pub fn order_detail(tables: &Tables, id: PurchaseOrderId) -> DomainResult<PurchaseOrderView> {
    let order = tables.purchase_orders().require(&id, "purchase order")?;
    Ok(order_view(order, &request_numbers(tables), &company_names(tables)))
}
