use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradeerp_admin::CompanyId;
use tradeerp_core::{Currency, DocumentNumber, DomainResult, Entity};
use tradeerp_projects::ProjectId;
use tradeerp_sales::{Quotation, QuotationId, QuotationStatus};

use super::projects::project_codes;
use super::{Page, PageRequest, company_names, name_of};
use crate::store::Tables;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotationLineView {
    pub line_no: u32,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotationView {
    pub id: QuotationId,
    pub quotation_number: DocumentNumber,
    pub project_id: ProjectId,
    pub project_code: String,
    pub customer_id: CompanyId,
    pub customer_name: String,
    pub status: QuotationStatus,
    pub currency: Currency,
    pub valid_until: NaiveDate,
    pub total_amount: Decimal,
    pub lines: Vec<QuotationLineView>,
    pub created_at: DateTime<Utc>,
}

fn quotation_view(
    q: &Quotation,
    codes: &HashMap<ProjectId, &str>,
    names: &HashMap<CompanyId, &str>,
) -> QuotationView {
    QuotationView {
        id: *q.id(),
        quotation_number: q.quotation_number().clone(),
        project_id: q.project_id(),
        project_code: codes
            .get(&q.project_id())
            .map(|c| c.to_string())
            .unwrap_or_default(),
        customer_id: q.customer_id(),
        customer_name: name_of(names, q.customer_id()),
        status: q.status(),
        currency: q.currency().clone(),
        valid_until: q.valid_until(),
        total_amount: q.total_amount(),
        lines: q
            .lines()
            .iter()
            .map(|l| QuotationLineView {
                line_no: l.line_no,
                description: l.description.clone(),
                quantity: l.quantity,
                unit_price: l.unit_price,
                amount: l.amount(),
            })
            .collect(),
        created_at: q.created_at(),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuotationFilter {
    pub project_id: Option<ProjectId>,
    pub status: Option<QuotationStatus>,
}

pub fn list_quotations(
    tables: &Tables,
    filter: &QuotationFilter,
    page: PageRequest,
) -> Page<QuotationView> {
    let codes = project_codes(tables);
    let names = company_names(tables);
    Page::collect(
        tables
            .quotations()
            .iter()
            .rev()
            .filter(|q| filter.project_id.is_none_or(|p| q.project_id() == p))
            .filter(|q| filter.status.is_none_or(|s| q.status() == s))
            .map(|q| quotation_view(q, &codes, &names)),
        page,
    )
}

pub fn quotation_detail(tables: &Tables, id: QuotationId) -> DomainResult<QuotationView> {
    let quotation = tables.quotations().require(&id, "quotation")?;
    Ok(quotation_view(quotation, &project_codes(tables), &company_names(tables)))
}
