//! Read side: flattened views for list and detail endpoints.
//!
//! Mappers take the committed [`Tables`] and build each view in one pass,
//! resolving names through indexes built once per query. Payment progress is
//! recalculated from payment rows on every read; it is never stored.

pub mod admin;
pub mod invoicing;
pub mod payables;
pub mod projects;
pub mod purchasing;
pub mod sales;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use tradeerp_accounting::AccountsPayableId;
use tradeerp_admin::{CompanyId, UserId};
use tradeerp_core::{DomainResult, Entity};
use tradeerp_invoicing::TaxInvoiceId;
use tradeerp_projects::{DeliveryId, ProjectId};
use tradeerp_purchasing::{PurchaseOrderId, PurchaseRequestId};
use tradeerp_sales::QuotationId;

use crate::store::{Database, Tables};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

fn default_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Zero-based page request (`?page=0&size=20`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn effective_size(&self) -> u32 {
        self.size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// One page of a list view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: usize,
}

impl<T> Page<T> {
    /// Count everything, keep only the requested window.
    pub fn collect(iter: impl Iterator<Item = T>, request: PageRequest) -> Self {
        let size = request.effective_size();
        let start = request.page as usize * size as usize;
        let end = start + size as usize;
        let mut items = Vec::new();
        let mut total = 0;
        for (idx, item) in iter.enumerate() {
            if idx >= start && idx < end {
                items.push(item);
            }
            total += 1;
        }
        Self {
            items,
            page: request.page,
            size,
            total,
        }
    }
}

/// Company id → name, built once per query.
pub(crate) fn company_names(tables: &Tables) -> HashMap<CompanyId, &str> {
    tables
        .companies()
        .iter()
        .map(|c| (*c.id(), c.name()))
        .collect()
}

pub(crate) fn name_of(names: &HashMap<CompanyId, &str>, id: CompanyId) -> String {
    names.get(&id).map(|n| n.to_string()).unwrap_or_default()
}

/// Entry point for the read side; every call reads one committed snapshot.
#[derive(Debug, Clone)]
pub struct Queries {
    db: Arc<Database>,
}

impl Queries {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    pub fn companies(
        &self,
        filter: &admin::CompanyFilter,
        page: PageRequest,
    ) -> Page<admin::CompanyView> {
        self.db.read(|t| admin::list_companies(t, filter, page))
    }

    pub fn company(&self, id: CompanyId) -> DomainResult<admin::CompanyView> {
        self.db.read(|t| admin::company_detail(t, id))
    }

    pub fn users(&self, filter: &admin::UserFilter, page: PageRequest) -> Page<admin::UserView> {
        self.db.read(|t| admin::list_users(t, filter, page))
    }

    pub fn user(&self, id: UserId) -> DomainResult<admin::UserView> {
        self.db.read(|t| admin::user_detail(t, id))
    }

    pub fn projects(
        &self,
        filter: &projects::ProjectFilter,
        page: PageRequest,
    ) -> Page<projects::ProjectView> {
        self.db.read(|t| projects::list_projects(t, filter, page))
    }

    pub fn project(&self, id: ProjectId) -> DomainResult<projects::ProjectView> {
        self.db.read(|t| projects::project_detail(t, id))
    }

    pub fn deliveries(
        &self,
        filter: &projects::DeliveryFilter,
        page: PageRequest,
    ) -> Page<projects::DeliveryView> {
        self.db.read(|t| projects::list_deliveries(t, filter, page))
    }

    pub fn delivery(&self, id: DeliveryId) -> DomainResult<projects::DeliveryView> {
        self.db.read(|t| projects::delivery_detail(t, id))
    }

    pub fn quotations(
        &self,
        filter: &sales::QuotationFilter,
        page: PageRequest,
    ) -> Page<sales::QuotationView> {
        self.db.read(|t| sales::list_quotations(t, filter, page))
    }

    pub fn quotation(&self, id: QuotationId) -> DomainResult<sales::QuotationView> {
        self.db.read(|t| sales::quotation_detail(t, id))
    }

    pub fn purchase_requests(
        &self,
        filter: &purchasing::PurchaseRequestFilter,
        page: PageRequest,
    ) -> Page<purchasing::PurchaseRequestView> {
        self.db.read(|t| purchasing::list_requests(t, filter, page))
    }

    pub fn purchase_request(
        &self,
        id: PurchaseRequestId,
    ) -> DomainResult<purchasing::PurchaseRequestView> {
        self.db.read(|t| purchasing::request_detail(t, id))
    }

    pub fn purchase_orders(
        &self,
        filter: &purchasing::PurchaseOrderFilter,
        page: PageRequest,
    ) -> Page<purchasing::PurchaseOrderView> {
        self.db.read(|t| purchasing::list_orders(t, filter, page))
    }

    pub fn purchase_order(&self, id: PurchaseOrderId) -> DomainResult<purchasing::PurchaseOrderView> {
        self.db.read(|t| purchasing::order_detail(t, id))
    }

    pub fn payables(
        &self,
        filter: &payables::PayableFilter,
        page: PageRequest,
    ) -> Page<payables::AccountsPayableView> {
        let today = Self::today();
        self.db.read(|t| payables::list_payables(t, filter, page, today))
    }

    pub fn payable(&self, id: AccountsPayableId) -> DomainResult<payables::AccountsPayableDetail> {
        let today = Self::today();
        self.db.read(|t| payables::payable_detail(t, id, today))
    }

    pub fn tax_invoices(
        &self,
        filter: &invoicing::TaxInvoiceFilter,
        page: PageRequest,
    ) -> Page<invoicing::TaxInvoiceView> {
        let today = Self::today();
        self.db.read(|t| invoicing::list_invoices(t, filter, page, today))
    }

    pub fn tax_invoice(&self, id: TaxInvoiceId) -> DomainResult<invoicing::TaxInvoiceDetail> {
        let today = Self::today();
        self.db.read(|t| invoicing::invoice_detail(t, id, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_keeps_window_and_counts_all() {
        let page = Page::collect(0..45, PageRequest::new(2, 20));
        assert_eq!(page.items, (40..45).collect::<Vec<_>>());
        assert_eq!(page.total, 45);
        assert_eq!(page.size, 20);
    }

    #[test]
    fn page_size_is_clamped() {
        let page = Page::collect(0..500, PageRequest::new(0, 1000));
        assert_eq!(page.size, MAX_PAGE_SIZE);
        assert_eq!(page.items.len(), MAX_PAGE_SIZE as usize);

        let page = Page::collect(0..3, PageRequest::new(0, 0));
        assert_eq!(page.items, vec![0]);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = Page::collect(0..5, PageRequest::new(3, 20));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
    }
}
