use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradeerp_admin::CompanyId;
use tradeerp_core::{Currency, DocumentNumber, DomainResult, EntityId, Entity};
use tradeerp_projects::{Delivery, DeliveryId, DeliveryStatus, Project, ProjectId, ProjectStatus};

use super::{Page, PageRequest, company_names, name_of};
use crate::store::Tables;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectView {
    pub id: ProjectId,
    pub code: DocumentNumber,
    pub name: String,
    pub customer_id: CompanyId,
    pub customer_name: String,
    pub status: ProjectStatus,
    pub currency: Currency,
    pub contract_amount: Option<Decimal>,
    pub awarded_quotation_id: Option<EntityId>,
    /// Sum of deliveries that are not canceled.
    pub scheduled_amount: Decimal,
    pub delivered_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct DeliveryTotals {
    scheduled: Decimal,
    delivered: Decimal,
}

fn delivery_totals(tables: &Tables) -> HashMap<ProjectId, DeliveryTotals> {
    let mut totals: HashMap<ProjectId, DeliveryTotals> = HashMap::new();
    for d in tables.deliveries().iter() {
        let entry = totals.entry(d.project_id()).or_default();
        if d.status().is_committed() {
            entry.scheduled += d.amount();
        }
        if d.status() == DeliveryStatus::Delivered {
            entry.delivered += d.amount();
        }
    }
    totals
}

fn project_view(
    p: &Project,
    names: &HashMap<CompanyId, &str>,
    totals: &HashMap<ProjectId, DeliveryTotals>,
) -> ProjectView {
    let (scheduled_amount, delivered_amount) = totals
        .get(p.id())
        .map(|t| (t.scheduled, t.delivered))
        .unwrap_or_default();
    ProjectView {
        id: *p.id(),
        code: p.code().clone(),
        name: p.name().to_string(),
        customer_id: p.customer_id(),
        customer_name: name_of(names, p.customer_id()),
        status: p.status(),
        currency: p.currency().clone(),
        contract_amount: p.contract_amount(),
        awarded_quotation_id: p.awarded_quotation_id(),
        scheduled_amount,
        delivered_amount,
        created_at: p.created_at(),
        updated_at: p.updated_at(),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub customer_id: Option<CompanyId>,
}

pub fn list_projects(tables: &Tables, filter: &ProjectFilter, page: PageRequest) -> Page<ProjectView> {
    let names = company_names(tables);
    let totals = delivery_totals(tables);
    Page::collect(
        tables
            .projects()
            .iter()
            .rev()
            .filter(|p| filter.status.is_none_or(|s| p.status() == s))
            .filter(|p| filter.customer_id.is_none_or(|c| p.customer_id() == c))
            .map(|p| project_view(p, &names, &totals)),
        page,
    )
}

pub fn project_detail(tables: &Tables, id: ProjectId) -> DomainResult<ProjectView> {
    let project = tables.projects().require(&id, "project")?;
    Ok(project_view(project, &company_names(tables), &delivery_totals(tables)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryView {
    pub id: DeliveryId,
    pub delivery_number: DocumentNumber,
    pub project_id: ProjectId,
    pub project_code: String,
    pub customer_id: CompanyId,
    pub customer_name: String,
    pub description: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub status: DeliveryStatus,
    pub scheduled_date: NaiveDate,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

fn delivery_view(
    d: &Delivery,
    codes: &HashMap<ProjectId, &str>,
    names: &HashMap<CompanyId, &str>,
) -> DeliveryView {
    DeliveryView {
        id: *d.id(),
        delivery_number: d.delivery_number().clone(),
        project_id: d.project_id(),
        project_code: codes
            .get(&d.project_id())
            .map(|c| c.to_string())
            .unwrap_or_default(),
        customer_id: d.customer_id(),
        customer_name: name_of(names, d.customer_id()),
        description: d.description().to_string(),
        amount: d.amount(),
        currency: d.currency().clone(),
        status: d.status(),
        scheduled_date: d.scheduled_date(),
        shipped_at: d.shipped_at(),
        delivered_at: d.delivered_at(),
        created_at: d.created_at(),
    }
}

pub(crate) fn project_codes(tables: &Tables) -> HashMap<ProjectId, &str> {
    tables
        .projects()
        .iter()
        .map(|p| (*p.id(), p.code().as_str()))
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryFilter {
    pub project_id: Option<ProjectId>,
    pub status: Option<DeliveryStatus>,
}

pub fn list_deliveries(tables: &Tables, filter: &DeliveryFilter, page: PageRequest) -> Page<DeliveryView> {
    let codes = project_codes(tables);
    let names = company_names(tables);
    Page::collect(
        tables
            .deliveries()
            .iter()
            .rev()
            .filter(|d| filter.project_id.is_none_or(|p| d.project_id() == p))
            .filter(|d| filter.status.is_none_or(|s| d.status() == s))
            .map(|d| delivery_view(d, &codes, &names)),
        page,
    )
}

pub fn delivery_detail(tables: &Tables, id: DeliveryId) -> DomainResult<DeliveryView> {
    let delivery = tables.deliveries().require(&id, "delivery")?;
    Ok(delivery_view(delivery, &project_codes(tables), &company_names(tables)))
}
