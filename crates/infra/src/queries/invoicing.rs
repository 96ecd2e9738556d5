use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradeerp_admin::CompanyId;
use tradeerp_core::{Currency, DocumentNumber, DomainResult, Entity, SettlementStatus};
use tradeerp_invoicing::{Payment, PaymentId, TaxInvoice, TaxInvoiceId, TaxInvoiceStatus};
use tradeerp_projects::{DeliveryId, ProjectId};

use super::projects::project_codes;
use super::{Page, PageRequest, company_names, name_of};
use crate::services::received_to_date;
use crate::store::Tables;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxInvoiceView {
    pub id: TaxInvoiceId,
    pub invoice_number: DocumentNumber,
    pub project_id: ProjectId,
    pub project_code: String,
    pub customer_id: CompanyId,
    pub customer_name: String,
    pub delivery_id: Option<DeliveryId>,
    pub supply_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub currency: Currency,
    pub status: TaxInvoiceStatus,
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub payment_status: SettlementStatus,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub overdue: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentView {
    pub id: PaymentId,
    pub amount: Decimal,
    pub received_at: DateTime<Utc>,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxInvoiceDetail {
    #[serde(flatten)]
    pub invoice: TaxInvoiceView,
    pub payments: Vec<PaymentView>,
}

impl From<&Payment> for PaymentView {
    fn from(p: &Payment) -> Self {
        Self {
            id: *p.id(),
            amount: p.amount(),
            received_at: p.received_at(),
            reference: p.reference().map(str::to_string),
        }
    }
}

struct Indexes<'a> {
    codes: HashMap<ProjectId, &'a str>,
    names: HashMap<CompanyId, &'a str>,
}

fn invoice_view(
    inv: &TaxInvoice,
    paid: Decimal,
    idx: &Indexes<'_>,
    today: NaiveDate,
) -> TaxInvoiceView {
    let payment_status = inv.settlement(paid);
    let overdue = inv.status() == TaxInvoiceStatus::Issued
        && payment_status != SettlementStatus::Paid
        && inv.due_date().is_some_and(|due| due < today);
    TaxInvoiceView {
        id: *inv.id(),
        invoice_number: inv.invoice_number().clone(),
        project_id: inv.project_id(),
        project_code: idx
            .codes
            .get(&inv.project_id())
            .map(|c| c.to_string())
            .unwrap_or_default(),
        customer_id: inv.customer_id(),
        customer_name: name_of(&idx.names, inv.customer_id()),
        delivery_id: inv.delivery_id(),
        supply_amount: inv.supply_amount(),
        tax_amount: inv.tax_amount(),
        total_amount: inv.total_amount(),
        currency: inv.currency().clone(),
        status: inv.status(),
        paid_amount: paid,
        remaining_amount: inv.remaining(paid),
        payment_status,
        issue_date: inv.issue_date(),
        due_date: inv.due_date(),
        overdue,
        created_at: inv.created_at(),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxInvoiceFilter {
    pub status: Option<TaxInvoiceStatus>,
    pub payment_status: Option<SettlementStatus>,
    pub project_id: Option<ProjectId>,
    pub customer_id: Option<CompanyId>,
}

pub fn list_invoices(
    tables: &Tables,
    filter: &TaxInvoiceFilter,
    page: PageRequest,
    today: NaiveDate,
) -> Page<TaxInvoiceView> {
    let idx = Indexes {
        codes: project_codes(tables),
        names: company_names(tables),
    };
    let mut received: HashMap<TaxInvoiceId, Decimal> = HashMap::new();
    for p in tables.payments().iter() {
        let sum = received.entry(p.tax_invoice_id()).or_default();
        *sum = sum.saturating_add(p.amount());
    }
    Page::collect(
        tables
            .tax_invoices()
            .iter()
            .rev()
            .filter(|inv| filter.status.is_none_or(|s| inv.status() == s))
            .filter(|inv| filter.project_id.is_none_or(|p| inv.project_id() == p))
            .filter(|inv| filter.customer_id.is_none_or(|c| inv.customer_id() == c))
            .map(|inv| {
                let paid = received.get(inv.id()).copied().unwrap_or_default();
                invoice_view(inv, paid, &idx, today)
            })
            .filter(|v| filter.payment_status.is_none_or(|s| v.payment_status == s)),
        page,
    )
}

pub fn invoice_detail(
    tables: &Tables,
    id: TaxInvoiceId,
    today: NaiveDate,
) -> DomainResult<TaxInvoiceDetail> {
    let inv = tables.tax_invoices().require(&id, "tax invoice")?;
    let idx = Indexes {
        codes: project_codes(tables),
        names: company_names(tables),
    };
    let payments = tables
        .payments()
        .iter()
        .filter(|p| p.tax_invoice_id() == id)
        .map(PaymentView::from)
        .collect();
    let received = received_to_date(tables, &id)?;
    Ok(TaxInvoiceDetail {
        invoice: invoice_view(inv, received, &idx, today),
        payments,
    })
}
