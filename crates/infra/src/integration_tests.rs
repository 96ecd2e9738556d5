//! End-to-end workflows through the services with the full handler set.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use tradeerp_accounting::{AccountsPayableId, NewVendorPayment, VendorPayment, VendorPaymentId};
use tradeerp_admin::{CompanyId, CompanyKind, ContactInfo, NewCompany};
use tradeerp_core::{Currency, DomainError, DomainResult, SettlementStatus};
use tradeerp_events::EventHandler;
use tradeerp_invoicing::{NewPayment, Payment, PaymentId, TaxInvoiceId, TaxInvoiceStatus};
use tradeerp_projects::{NewDelivery, NewProject, ProjectId, ProjectStatus};
use tradeerp_purchasing::{
    NewPurchaseRequest, PurchaseOrderCanceledEvent, PurchaseOrderId, PurchaseOrderStatus,
    PurchaseRequestId, PurchaseRequestStatus, RfqItemId, RfqItemStatus,
};
use tradeerp_sales::{NewQuotation, NewQuotationLine, QuotationId, QuotationStatus};

use crate::handlers::{paid_to_date, register_all};
use crate::queries::invoicing::TaxInvoiceFilter;
use crate::queries::payables::PayableFilter;
use crate::queries::sales::QuotationFilter;
use crate::services::{
    AdminService, InvoicingService, PayablesService, ProjectService, PurchasingService,
    SalesService, received_to_date,
};
use crate::{
    ActivityFeed, AppConfig, Database, EventBus, InProcessProjectLocks, PageRequest, Queries,
    ServiceError, Transaction,
};

struct Harness {
    db: Arc<Database>,
    admin: AdminService,
    purchasing: PurchasingService<Arc<EventBus>>,
    payables: PayablesService,
    sales: SalesService<Arc<EventBus>>,
    projects: ProjectService<Arc<EventBus>, InProcessProjectLocks>,
    invoicing: InvoicingService,
    queries: Queries,
    feed: Arc<ActivityFeed>,
}

fn harness() -> Harness {
    let db = Arc::new(Database::new());
    let config = AppConfig::default();
    let feed = Arc::new(ActivityFeed::new(64));
    let mut bus = EventBus::new();
    register_all(&mut bus, &config, Arc::clone(&feed));
    let bus = Arc::new(bus);
    Harness {
        db: Arc::clone(&db),
        admin: AdminService::new(Arc::clone(&db)),
        purchasing: PurchasingService::new(Arc::clone(&db), Arc::clone(&bus)),
        payables: PayablesService::new(Arc::clone(&db)),
        sales: SalesService::new(Arc::clone(&db), Arc::clone(&bus)),
        projects: ProjectService::new(Arc::clone(&db), bus, InProcessProjectLocks::new()),
        invoicing: InvoicingService::new(Arc::clone(&db), &config),
        queries: Queries::new(db),
        feed,
    }
}

fn company(h: &Harness, name: &str, reg: &str, kind: CompanyKind) -> CompanyId {
    h.admin
        .register_company(NewCompany {
            name: name.to_string(),
            registration_number: reg.to_string(),
            kind,
            contact: ContactInfo::default(),
        })
        .unwrap()
}

/// Request with one replied RFQ item of `amount`, selected.
fn selected_request(h: &Harness, amount: i64) -> (PurchaseRequestId, RfqItemId) {
    let vendor = company(h, "Hanbit Steel", &format!("V-{amount}"), CompanyKind::Vendor);
    let request = h
        .purchasing
        .create_request(NewPurchaseRequest {
            title: "Steel plates".into(),
            description: None,
            project_id: None,
            currency: Currency::krw(),
            needed_by: None,
        })
        .unwrap();
    let items = h.purchasing.send_rfq(request, vec![vendor]).unwrap();
    let item = items[0].clone();
    h.purchasing
        .record_reply(request, item.clone(), Decimal::from(amount), 14)
        .unwrap();
    h.purchasing.select_vendor(request, item.clone()).unwrap();
    (request, item)
}

fn confirmed_order(h: &Harness, amount: i64) -> (PurchaseRequestId, RfqItemId, PurchaseOrderId) {
    let (request, item) = selected_request(h, amount);
    let po = h.purchasing.create_order(request, item.clone()).unwrap();
    h.purchasing.send_order(po).unwrap();
    h.purchasing.confirm_order(po).unwrap();
    (request, item, po)
}

fn business_code(err: &ServiceError) -> Option<&'static str> {
    err.domain_error().and_then(DomainError::code)
}

fn all_payables(h: &Harness) -> crate::Page<crate::queries::payables::AccountsPayableView> {
    h.queries.payables(
        &PayableFilter {
            include_voided: true,
            ..PayableFilter::default()
        },
        PageRequest::default(),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Purchasing → payables
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn confirming_an_order_creates_one_pending_payable_and_receiving_closes_the_request() {
    let h = harness();
    let (request, _, po) = confirmed_order(&h, 5000);

    let payables = all_payables(&h);
    assert_eq!(payables.total, 1);
    let ap = &payables.items[0];
    assert_eq!(ap.purchase_order_id, po);
    assert_eq!(ap.amount, Decimal::from(5000));
    assert_eq!(ap.status, SettlementStatus::Pending);
    assert_eq!(ap.due_date, Utc::now().date_naive() + Duration::days(30));

    h.purchasing.receive_order(po).unwrap();
    let request = h.queries.purchase_request(request).unwrap();
    assert_eq!(request.status, PurchaseRequestStatus::Closed);
    assert_eq!(
        h.queries.purchase_order(po).unwrap().status,
        PurchaseOrderStatus::Received
    );
}

#[test]
fn confirming_a_draft_order_fails_without_creating_a_payable() {
    let h = harness();
    let (request, item) = selected_request(&h, 5000);
    let po = h.purchasing.create_order(request, item).unwrap();

    let err = h.purchasing.confirm_order(po).unwrap_err();
    assert_eq!(business_code(&err), Some("PO_INVALID_STATUS"));
    assert_eq!(all_payables(&h).total, 0);
    assert_eq!(
        h.queries.purchase_order(po).unwrap().status,
        PurchaseOrderStatus::Draft
    );
}

#[test]
fn second_open_order_for_a_request_is_rejected() {
    let h = harness();
    let (request, item) = selected_request(&h, 700);
    h.purchasing.create_order(request, item.clone()).unwrap();

    let err = h.purchasing.create_order(request, item).unwrap_err();
    assert_eq!(business_code(&err), Some("PO_ALREADY_EXISTS"));
}

#[test]
fn canceling_a_confirmed_order_voids_the_payable_and_reopens_selection() {
    let h = harness();
    let (request, item, po) = confirmed_order(&h, 5000);

    h.purchasing
        .cancel_order(po, Some("vendor cannot deliver".into()))
        .unwrap();

    let payables = all_payables(&h);
    assert_eq!(payables.total, 1);
    assert!(payables.items[0].voided);

    let request = h.queries.purchase_request(request).unwrap();
    assert_eq!(request.status, PurchaseRequestStatus::RfqSent);
    let item = request.items.iter().find(|i| i.id == item).unwrap();
    assert_eq!(item.status, RfqItemStatus::Replied);

    let order = h.queries.purchase_order(po).unwrap();
    assert_eq!(order.status, PurchaseOrderStatus::Canceled);
    assert_eq!(order.cancel_reason.as_deref(), Some("vendor cannot deliver"));
}

#[test]
fn canceled_order_allows_a_new_order_after_reselection() {
    let h = harness();
    let (request, item, po) = confirmed_order(&h, 900);
    h.purchasing.cancel_order(po, None).unwrap();

    h.purchasing.select_vendor(request, item.clone()).unwrap();
    let second = h.purchasing.create_order(request, item).unwrap();
    assert_ne!(second, po);
}

#[test]
fn canceling_a_received_order_is_rejected() {
    let h = harness();
    let (_, _, po) = confirmed_order(&h, 5000);
    h.purchasing.receive_order(po).unwrap();

    let err = h.purchasing.cancel_order(po, None).unwrap_err();
    assert_eq!(business_code(&err), Some("PO_INVALID_STATUS"));
    assert_eq!(
        h.queries.purchase_order(po).unwrap().status,
        PurchaseOrderStatus::Received
    );
}

#[test]
fn canceling_an_order_with_vendor_payments_rolls_back() {
    let h = harness();
    let (request, _, po) = confirmed_order(&h, 1000);
    let ap = all_payables(&h).items[0].id;
    h.payables
        .record_payment(
            ap,
            NewVendorPayment {
                amount: Decimal::from(100),
                reference: None,
            },
        )
        .unwrap();

    let err = h.purchasing.cancel_order(po, None).unwrap_err();
    match &err {
        ServiceError::Publish(e) => assert_eq!(e.handler, "accounting.void_payable"),
        other => panic!("Expected Publish, got {other:?}"),
    }
    assert_eq!(business_code(&err), Some("AP_HAS_PAYMENTS"));

    assert_eq!(
        h.queries.purchase_order(po).unwrap().status,
        PurchaseOrderStatus::Confirmed
    );
    assert_eq!(
        h.queries.purchase_request(request).unwrap().status,
        PurchaseRequestStatus::VendorSelected
    );
    assert!(!all_payables(&h).items[0].voided);
}

/// Commits a vendor payment from inside a cancellation, before the payable
/// is voided.
struct PayWhileCanceling {
    payables: PayablesService,
    ap: AccountsPayableId,
}

impl EventHandler<Transaction, PurchaseOrderCanceledEvent> for PayWhileCanceling {
    fn name(&self) -> &'static str {
        "test.pay_while_canceling"
    }

    fn handle(&self, _tx: &mut Transaction, _event: &PurchaseOrderCanceledEvent) -> DomainResult<()> {
        self.payables
            .record_payment(
                self.ap,
                NewVendorPayment {
                    amount: Decimal::from(400),
                    reference: None,
                },
            )
            .expect("payment commits on its own");
        Ok(())
    }
}

#[test]
fn payment_committed_during_a_cancel_fails_the_cancel() {
    let h = harness();
    let (request, _, po) = confirmed_order(&h, 1000);
    let ap = all_payables(&h).items[0].id;

    let mut bus = EventBus::new();
    bus.subscribe::<PurchaseOrderCanceledEvent, _>(PayWhileCanceling {
        payables: h.payables.clone(),
        ap,
    });
    register_all(&mut bus, &AppConfig::default(), Arc::clone(&h.feed));
    let purchasing = PurchasingService::new(Arc::clone(&h.db), Arc::new(bus));

    let err = purchasing.cancel_order(po, None).unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::Conflict(_))), "{err:?}");

    let detail = h.queries.payable(ap).unwrap();
    assert!(!detail.payable.voided);
    assert_eq!(detail.payable.paid_amount, Decimal::from(400));
    assert_eq!(detail.payable.status, SettlementStatus::PartiallyPaid);
    assert_eq!(
        h.queries.purchase_order(po).unwrap().status,
        PurchaseOrderStatus::Confirmed
    );
    assert_eq!(
        h.queries.purchase_request(request).unwrap().status,
        PurchaseRequestStatus::VendorSelected
    );
}

/// Stage a vendor payment the way `record_payment` does, without committing.
fn staged_vendor_payment(h: &Harness, ap: AccountsPayableId, amount: i64) -> Transaction {
    let mut tx = h.db.begin();
    let paid = paid_to_date(&tx, &ap).unwrap();
    let payable = tx.payables().require(&ap, "accounts payable").unwrap();
    let payment = VendorPayment::record(
        VendorPaymentId::generate(),
        payable,
        paid,
        NewVendorPayment {
            amount: Decimal::from(amount),
            reference: None,
        },
        tx.now(),
    )
    .unwrap();
    tx.vendor_payments_mut().insert(payment);
    tx
}

#[test]
fn concurrent_payments_on_different_payables_both_commit() {
    let h = harness();
    confirmed_order(&h, 1000);
    confirmed_order(&h, 2000);
    let payables = all_payables(&h);
    let (first, second) = (payables.items[0].id, payables.items[1].id);

    let a = staged_vendor_payment(&h, first, 100);
    let b = staged_vendor_payment(&h, second, 200);
    h.db.commit(a).unwrap();
    h.db.commit(b).unwrap();

    assert_eq!(h.queries.payable(first).unwrap().payable.paid_amount, Decimal::from(100));
    assert_eq!(h.queries.payable(second).unwrap().payable.paid_amount, Decimal::from(200));
}

#[test]
fn concurrent_payments_on_one_payable_cannot_overpay() {
    let h = harness();
    confirmed_order(&h, 1000);
    let ap = all_payables(&h).items[0].id;

    let a = staged_vendor_payment(&h, ap, 700);
    let b = staged_vendor_payment(&h, ap, 700);
    h.db.commit(a).unwrap();
    let err = h.db.commit(b).unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    let detail = h.queries.payable(ap).unwrap();
    assert_eq!(detail.payable.paid_amount, Decimal::from(700));
    assert_eq!(detail.payments.len(), 1);
}

#[test]
fn partial_vendor_payment_reports_remaining_balance() {
    let h = harness();
    confirmed_order(&h, 1000);
    let ap = all_payables(&h).items[0].id;

    h.payables
        .record_payment(
            ap,
            NewVendorPayment {
                amount: Decimal::from(400),
                reference: Some("wire 0001".into()),
            },
        )
        .unwrap();

    let detail = h.queries.payable(ap).unwrap();
    assert_eq!(detail.payable.status, SettlementStatus::PartiallyPaid);
    assert_eq!(detail.payable.remaining_amount, Decimal::from(600));

    let err = h
        .payables
        .record_payment(
            ap,
            NewVendorPayment {
                amount: Decimal::from(601),
                reference: None,
            },
        )
        .unwrap_err();
    assert_eq!(business_code(&err), Some("AP_OVERPAYMENT"));

    h.payables
        .record_payment(
            ap,
            NewVendorPayment {
                amount: Decimal::from(600),
                reference: None,
            },
        )
        .unwrap();
    let detail = h.queries.payable(ap).unwrap();
    assert_eq!(detail.payable.status, SettlementStatus::Paid);
    assert_eq!(detail.payments.len(), 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Sales → projects → invoicing
// ─────────────────────────────────────────────────────────────────────────────

fn project_with_quotations(h: &Harness, count: usize) -> (ProjectId, Vec<QuotationId>) {
    let customer = company(h, "Daehan Shipbuilding", "C-100", CompanyKind::Customer);
    let project = h
        .projects
        .create_project(NewProject {
            name: "Hull block supply".into(),
            customer_id: customer,
            currency: Currency::krw(),
        })
        .unwrap();
    let quotations = (0..count)
        .map(|_| {
            let id = h
                .sales
                .create_quotation(NewQuotation {
                    project_id: project,
                    valid_until: Utc::now().date_naive() + Duration::days(30),
                    lines: vec![NewQuotationLine {
                        description: "Hull block".into(),
                        quantity: Decimal::from(2),
                        unit_price: Decimal::from(500_000),
                    }],
                })
                .unwrap();
            h.sales.send_quotation(id).unwrap();
            id
        })
        .collect();
    (project, quotations)
}

#[test]
fn accepting_a_quotation_awards_the_project() {
    let h = harness();
    let (project, quotations) = project_with_quotations(&h, 1);

    h.sales.accept_quotation(quotations[0]).unwrap();

    let view = h.queries.project(project).unwrap();
    assert_eq!(view.status, ProjectStatus::InProgress);
    assert_eq!(view.contract_amount, Some(Decimal::from(1_000_000)));
    assert_eq!(view.awarded_quotation_id, Some(quotations[0].0));
}

#[test]
fn second_acceptance_on_an_awarded_project_rolls_back() {
    let h = harness();
    let (_, quotations) = project_with_quotations(&h, 2);
    h.sales.accept_quotation(quotations[0]).unwrap();

    let err = h.sales.accept_quotation(quotations[1]).unwrap_err();
    assert_eq!(business_code(&err), Some("PROJECT_ALREADY_AWARDED"));
    assert_eq!(
        h.queries.quotation(quotations[1]).unwrap().status,
        QuotationStatus::Sent
    );
}

#[test]
fn completing_a_delivery_drafts_a_tax_invoice() {
    let h = harness();
    let (project, quotations) = project_with_quotations(&h, 1);
    h.sales.accept_quotation(quotations[0]).unwrap();

    let delivery = h
        .projects
        .schedule_delivery(NewDelivery {
            project_id: project,
            description: "First two blocks".into(),
            amount: Decimal::from(400_000),
            scheduled_date: Utc::now().date_naive(),
        })
        .unwrap();
    h.projects.ship_delivery(delivery).unwrap();
    h.projects.complete_delivery(delivery).unwrap();

    let invoices = h
        .queries
        .tax_invoices(&TaxInvoiceFilter::default(), PageRequest::default());
    assert_eq!(invoices.total, 1);
    let invoice = &invoices.items[0];
    assert_eq!(invoice.delivery_id, Some(delivery));
    assert_eq!(invoice.status, TaxInvoiceStatus::Draft);
    assert_eq!(invoice.supply_amount, Decimal::from(400_000));
    assert_eq!(invoice.tax_amount, Decimal::from(40_000));
    assert_eq!(invoice.total_amount, Decimal::from(440_000));
    assert_eq!(invoice.payment_status, SettlementStatus::Pending);

    let view = h.queries.project(project).unwrap();
    assert_eq!(view.delivered_amount, Decimal::from(400_000));
}

#[test]
fn deliveries_cannot_exceed_the_contract() {
    let h = harness();
    let (project, quotations) = project_with_quotations(&h, 1);
    h.sales.accept_quotation(quotations[0]).unwrap();

    let delivery = |amount: i64| NewDelivery {
        project_id: project,
        description: "blocks".into(),
        amount: Decimal::from(amount),
        scheduled_date: Utc::now().date_naive(),
    };
    h.projects.schedule_delivery(delivery(800_000)).unwrap();
    let err = h.projects.schedule_delivery(delivery(300_000)).unwrap_err();
    assert_eq!(business_code(&err), Some("DELIVERY_EXCEEDS_CONTRACT"));
}

#[test]
fn out_of_range_delivery_is_rejected_and_the_project_stays_usable() {
    let h = harness();
    let (project, quotations) = project_with_quotations(&h, 1);
    h.sales.accept_quotation(quotations[0]).unwrap();

    let delivery = |amount: Decimal| NewDelivery {
        project_id: project,
        description: "blocks".into(),
        amount,
        scheduled_date: Utc::now().date_naive(),
    };
    h.projects.schedule_delivery(delivery(Decimal::from(100))).unwrap();
    let err = h.projects.schedule_delivery(delivery(Decimal::MAX)).unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))), "{err:?}");

    h.projects.schedule_delivery(delivery(Decimal::from(100))).unwrap();
}

#[test]
fn out_of_range_quotation_is_rejected_and_listing_still_works() {
    let h = harness();
    let (project, _) = project_with_quotations(&h, 1);
    let huge = Decimal::from(1_000_000_000_000_000_i64);

    let err = h
        .sales
        .create_quotation(NewQuotation {
            project_id: project,
            valid_until: Utc::now().date_naive() + Duration::days(30),
            lines: vec![NewQuotationLine {
                description: "Everything".into(),
                quantity: huge,
                unit_price: huge,
            }],
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))), "{err:?}");

    let list = h
        .queries
        .quotations(&QuotationFilter::default(), PageRequest::default());
    assert_eq!(list.total, 1);
}

/// Issued tax invoice of 440,000 for a delivered 400,000.
fn issued_invoice(h: &Harness) -> TaxInvoiceId {
    let (project, quotations) = project_with_quotations(h, 1);
    h.sales.accept_quotation(quotations[0]).unwrap();
    let delivery = h
        .projects
        .schedule_delivery(NewDelivery {
            project_id: project,
            description: "First two blocks".into(),
            amount: Decimal::from(400_000),
            scheduled_date: Utc::now().date_naive(),
        })
        .unwrap();
    h.projects.ship_delivery(delivery).unwrap();
    h.projects.complete_delivery(delivery).unwrap();
    let invoice = h
        .queries
        .tax_invoices(&TaxInvoiceFilter::default(), PageRequest::default())
        .items[0]
        .id;
    h.invoicing.issue_invoice(invoice).unwrap();
    invoice
}

#[test]
fn invoice_canceled_while_a_payment_is_staged_rejects_the_payment() {
    let h = harness();
    let invoice = issued_invoice(&h);

    let mut payment_tx = h.db.begin();
    let received = received_to_date(&payment_tx, &invoice).unwrap();
    let issued = payment_tx.tax_invoices().require(&invoice, "tax invoice").unwrap();
    let payment = Payment::record(
        PaymentId::generate(),
        issued,
        received,
        NewPayment {
            amount: Decimal::from(1000),
            reference: None,
        },
        payment_tx.now(),
    )
    .unwrap();
    payment_tx.payments_mut().insert(payment);

    h.invoicing.cancel_invoice(invoice).unwrap();
    let err = h.db.commit(payment_tx).unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    let detail = h.queries.tax_invoice(invoice).unwrap();
    assert_eq!(detail.invoice.status, TaxInvoiceStatus::Canceled);
    assert!(detail.payments.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Activity feed
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn activity_feed_only_shows_committed_events() {
    let h = harness();
    let (_, _, po) = confirmed_order(&h, 1000);
    let ap = all_payables(&h).items[0].id;
    h.payables
        .record_payment(
            ap,
            NewVendorPayment {
                amount: Decimal::from(1),
                reference: None,
            },
        )
        .unwrap();

    // Rolled back by the void handler; nothing recorded.
    assert!(h.purchasing.cancel_order(po, None).is_err());

    let recent = h.feed.recent(10);
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].event_type, "purchasing.order.confirmed");
}
