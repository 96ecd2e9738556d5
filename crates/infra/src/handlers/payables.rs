use rust_decimal::Decimal;
use tracing::info;

use tradeerp_accounting::{AccountsPayable, AccountsPayableId};
use tradeerp_core::{DomainError, DomainResult, Entity, checked_sum};
use tradeerp_events::EventHandler;
use tradeerp_purchasing::{PurchaseOrderCanceledEvent, PurchaseOrderConfirmedEvent};

use crate::store::{Tables, Transaction};

/// Sum of vendor payments recorded against `id`.
pub(crate) fn paid_to_date(tables: &Tables, id: &AccountsPayableId) -> DomainResult<Decimal> {
    let id = *id;
    let amounts = tables
        .vendor_payments()
        .filter(move |p| p.accounts_payable_id() == id)
        .map(|p| p.amount());
    checked_sum(amounts)
}

/// PO confirmed → open exactly one payable for it.
#[derive(Debug, Clone)]
pub struct CreatePayableOnOrderConfirmed {
    payment_terms_days: u32,
}

impl CreatePayableOnOrderConfirmed {
    pub fn new(payment_terms_days: u32) -> Self {
        Self { payment_terms_days }
    }
}

impl EventHandler<Transaction, PurchaseOrderConfirmedEvent> for CreatePayableOnOrderConfirmed {
    fn name(&self) -> &'static str {
        "accounting.create_payable"
    }

    fn handle(&self, tx: &mut Transaction, event: &PurchaseOrderConfirmedEvent) -> DomainResult<()> {
        let purchase_order_id = event.purchase_order_id;
        if tx
            .payables()
            .find(move |ap| ap.purchase_order_id() == purchase_order_id)
            .is_some()
        {
            return Err(DomainError::business(
                "AP_ALREADY_EXISTS",
                format!("purchase order {} already has a payable", event.po_number),
            ));
        }
        let ap = AccountsPayable::from_confirmed_order(
            AccountsPayableId::generate(),
            tx.next_number("AP"),
            event,
            self.payment_terms_days,
        )?;
        info!(
            ap_id = %ap.id(),
            purchase_order_id = %event.purchase_order_id,
            amount = %ap.amount(),
            "accounts payable created"
        );
        tx.payables_mut().insert(ap);
        Ok(())
    }
}

/// PO canceled → void its payable, if one was opened.
///
/// A payable that already has payments cannot be voided; the error rolls the
/// cancellation back.
#[derive(Debug, Clone, Copy)]
pub struct VoidPayableOnOrderCanceled;

impl EventHandler<Transaction, PurchaseOrderCanceledEvent> for VoidPayableOnOrderCanceled {
    fn name(&self) -> &'static str {
        "accounting.void_payable"
    }

    fn handle(&self, tx: &mut Transaction, event: &PurchaseOrderCanceledEvent) -> DomainResult<()> {
        let purchase_order_id = event.purchase_order_id;
        let Some(ap_id) = tx
            .payables()
            .find(move |ap| ap.purchase_order_id() == purchase_order_id && !ap.is_voided())
            .map(|ap| *ap.id())
        else {
            return Ok(());
        };
        let paid = paid_to_date(tx, &ap_id)?;
        let now = tx.now();
        tx.payables_mut()
            .require_mut(&ap_id, "accounts payable")?
            .void(paid, now)?;
        info!(ap_id = %ap_id, purchase_order_id = %event.purchase_order_id, "accounts payable voided");
        Ok(())
    }
}
