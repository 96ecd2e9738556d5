use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradeerp_accounting::{AccountsPayable, AccountsPayableId, VendorPayment, VendorPaymentId};
use tradeerp_admin::CompanyId;
use tradeerp_core::{Currency, DocumentNumber, DomainResult, Entity, SettlementStatus};
use tradeerp_purchasing::PurchaseOrderId;

use super::{Page, PageRequest, company_names, name_of};
use crate::handlers::paid_to_date;
use crate::store::Tables;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountsPayableView {
    pub id: AccountsPayableId,
    pub ap_number: DocumentNumber,
    pub purchase_order_id: PurchaseOrderId,
    pub po_number: DocumentNumber,
    pub vendor_id: CompanyId,
    pub vendor_name: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub status: SettlementStatus,
    pub due_date: NaiveDate,
    pub overdue: bool,
    pub voided: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorPaymentView {
    pub id: VendorPaymentId,
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
    pub reference: Option<String>,
}

impl From<&VendorPayment> for VendorPaymentView {
    fn from(p: &VendorPayment) -> Self {
        Self {
            id: *p.id(),
            amount: p.amount(),
            paid_at: p.paid_at(),
            reference: p.reference().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountsPayableDetail {
    #[serde(flatten)]
    pub payable: AccountsPayableView,
    pub payments: Vec<VendorPaymentView>,
}

fn payable_view(
    ap: &AccountsPayable,
    paid: Decimal,
    names: &HashMap<CompanyId, &str>,
    today: NaiveDate,
) -> AccountsPayableView {
    let status = ap.settlement(paid);
    AccountsPayableView {
        id: *ap.id(),
        ap_number: ap.ap_number().clone(),
        purchase_order_id: ap.purchase_order_id(),
        po_number: ap.po_number().clone(),
        vendor_id: ap.vendor_id(),
        vendor_name: name_of(names, ap.vendor_id()),
        amount: ap.amount(),
        currency: ap.currency().clone(),
        paid_amount: paid,
        remaining_amount: ap.remaining(paid),
        status,
        due_date: ap.due_date(),
        overdue: !ap.is_voided() && status != SettlementStatus::Paid && ap.due_date() < today,
        voided: ap.is_voided(),
        created_at: ap.created_at(),
    }
}

/// `?status=PARTIALLY_PAID&vendor_id=...&include_voided=true`
///
/// `status` filters on the calculated status. Voided payables are hidden
/// unless `include_voided` is set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayableFilter {
    pub status: Option<SettlementStatus>,
    pub vendor_id: Option<CompanyId>,
    #[serde(default)]
    pub include_voided: bool,
    #[serde(default)]
    pub overdue_only: bool,
}

pub fn list_payables(
    tables: &Tables,
    filter: &PayableFilter,
    page: PageRequest,
    today: NaiveDate,
) -> Page<AccountsPayableView> {
    let names = company_names(tables);
    let mut paid: HashMap<AccountsPayableId, Decimal> = HashMap::new();
    for p in tables.vendor_payments().iter() {
        let sum = paid.entry(p.accounts_payable_id()).or_default();
        *sum = sum.saturating_add(p.amount());
    }
    Page::collect(
        tables
            .payables()
            .iter()
            .rev()
            .filter(|ap| filter.include_voided || !ap.is_voided())
            .filter(|ap| filter.vendor_id.is_none_or(|v| ap.vendor_id() == v))
            .map(|ap| {
                let paid = paid.get(ap.id()).copied().unwrap_or_default();
                payable_view(ap, paid, &names, today)
            })
            .filter(|v| filter.status.is_none_or(|s| v.status == s))
            .filter(|v| !filter.overdue_only || v.overdue),
        page,
    )
}

pub fn payable_detail(
    tables: &Tables,
    id: AccountsPayableId,
    today: NaiveDate,
) -> DomainResult<AccountsPayableDetail> {
    let ap = tables.payables().require(&id, "accounts payable")?;
    let paid = paid_to_date(tables, &id)?;
    let payments = tables
        .vendor_payments()
        .iter()
        .filter(|p| p.accounts_payable_id() == id)
        .map(VendorPaymentView::from)
        .collect();
    Ok(AccountsPayableDetail {
        payable: payable_view(ap, paid, &company_names(tables), today),
        payments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradeerp_accounting::NewVendorPayment;
    use tradeerp_purchasing::PurchaseOrderConfirmedEvent;

    fn payable(tables: &mut Tables, amount: i64) -> AccountsPayableId {
        let now = Utc::now();
        let event = PurchaseOrderConfirmedEvent {
            purchase_order_id: PurchaseOrderId::generate(),
            vendor_id: CompanyId::generate(),
            po_number: DocumentNumber::format("PO", now, 1),
            total_amount: Decimal::from(amount),
            currency: Currency::krw(),
            occurred_at: now,
        };
        let ap = AccountsPayable::from_confirmed_order(
            AccountsPayableId::generate(),
            DocumentNumber::format("AP", now, 1),
            &event,
            30,
        )
        .unwrap();
        let id = *ap.id();
        tables.payables_mut().insert(ap);
        id
    }

    fn pay(tables: &mut Tables, id: AccountsPayableId, amount: i64) {
        let paid = paid_to_date(tables, &id).unwrap();
        let ap = tables.payables().get(&id).unwrap().clone();
        let payment = VendorPayment::record(
            VendorPaymentId::generate(),
            &ap,
            paid,
            NewVendorPayment {
                amount: Decimal::from(amount),
                reference: None,
            },
            Utc::now(),
        )
        .unwrap();
        tables.vendor_payments_mut().insert(payment);
    }

    #[test]
    fn partial_payment_is_calculated_on_read() {
        let mut tables = Tables::default();
        let id = payable(&mut tables, 1000);
        pay(&mut tables, id, 400);

        let today = Utc::now().date_naive();
        let detail = payable_detail(&tables, id, today).unwrap();
        assert_eq!(detail.payable.status, SettlementStatus::PartiallyPaid);
        assert_eq!(detail.payable.paid_amount, Decimal::from(400));
        assert_eq!(detail.payable.remaining_amount, Decimal::from(600));
        assert_eq!(detail.payments.len(), 1);
        assert!(!detail.payable.overdue);
    }

    #[test]
    fn status_filter_uses_calculated_status() {
        let mut tables = Tables::default();
        let pending = payable(&mut tables, 500);
        let paid = payable(&mut tables, 300);
        pay(&mut tables, paid, 300);

        let today = Utc::now().date_naive();
        let filter = PayableFilter {
            status: Some(SettlementStatus::Paid),
            ..PayableFilter::default()
        };
        let page = list_payables(&tables, &filter, PageRequest::default(), today);
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, paid);

        let all = list_payables(&tables, &PayableFilter::default(), PageRequest::default(), today);
        assert_eq!(all.total, 2);
        assert_eq!(all.items[1].id, pending);
    }

    #[test]
    fn unpaid_past_due_date_is_overdue() {
        let mut tables = Tables::default();
        let id = payable(&mut tables, 1000);
        let far_future = Utc::now().date_naive() + chrono::Duration::days(365);

        let detail = payable_detail(&tables, id, far_future).unwrap();
        assert!(detail.payable.overdue);
    }
}
