use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradeerp_admin::CompanyId;
use tradeerp_core::{
    Currency, DocumentNumber, DomainError, DomainResult, Entity, SettlementStatus,
    checked_add, ensure_positive_amount, remaining_balance, typed_id,
};
use tradeerp_purchasing::{PurchaseOrderConfirmedEvent, PurchaseOrderId};

typed_id!(AccountsPayableId, "accounts payable id");
typed_id!(VendorPaymentId, "vendor payment id");

/// Amount owed to a vendor for one confirmed purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountsPayable {
    id: AccountsPayableId,
    ap_number: DocumentNumber,
    purchase_order_id: PurchaseOrderId,
    vendor_id: CompanyId,
    po_number: DocumentNumber,
    amount: Decimal,
    currency: Currency,
    due_date: NaiveDate,
    voided: bool,
    voided_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl AccountsPayable {
    /// Open a payable for a confirmed order, due `payment_terms_days` after
    /// confirmation.
    pub fn from_confirmed_order(
        id: AccountsPayableId,
        ap_number: DocumentNumber,
        event: &PurchaseOrderConfirmedEvent,
        payment_terms_days: u32,
    ) -> DomainResult<Self> {
        ensure_positive_amount("amount", event.total_amount)?;
        let due_date =
            (event.occurred_at + Duration::days(i64::from(payment_terms_days))).date_naive();
        Ok(Self {
            id,
            ap_number,
            purchase_order_id: event.purchase_order_id,
            vendor_id: event.vendor_id,
            po_number: event.po_number.clone(),
            amount: event.total_amount,
            currency: event.currency.clone(),
            due_date,
            voided: false,
            voided_at: None,
            created_at: event.occurred_at,
        })
    }

    pub fn ap_number(&self) -> &DocumentNumber {
        &self.ap_number
    }

    pub fn purchase_order_id(&self) -> PurchaseOrderId {
        self.purchase_order_id
    }

    pub fn vendor_id(&self) -> CompanyId {
        self.vendor_id
    }

    pub fn po_number(&self) -> &DocumentNumber {
        &self.po_number
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn is_voided(&self) -> bool {
        self.voided
    }

    pub fn voided_at(&self) -> Option<DateTime<Utc>> {
        self.voided_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn settlement(&self, paid: Decimal) -> SettlementStatus {
        SettlementStatus::calculate(self.amount, paid)
    }

    pub fn remaining(&self, paid: Decimal) -> Decimal {
        remaining_balance(self.amount, paid)
    }

    /// Check a new payment of `amount` given what was already paid.
    pub fn ensure_accepts_payment(&self, paid_so_far: Decimal, amount: Decimal) -> DomainResult<()> {
        ensure_positive_amount("amount", amount)?;
        if self.voided {
            return Err(DomainError::business(
                "AP_VOIDED",
                format!("accounts payable {} is voided", self.ap_number),
            ));
        }
        if checked_add(paid_so_far, amount)? > self.amount {
            return Err(DomainError::business(
                "AP_OVERPAYMENT",
                format!(
                    "payment of {amount} exceeds the remaining balance {} of {}",
                    self.remaining(paid_so_far),
                    self.ap_number
                ),
            ));
        }
        Ok(())
    }

    /// Void the payable (its order was canceled). Only unpaid payables can go.
    pub fn void(&mut self, paid_so_far: Decimal, now: DateTime<Utc>) -> DomainResult<()> {
        if self.voided {
            return Err(DomainError::business(
                "AP_VOIDED",
                format!("accounts payable {} is already voided", self.ap_number),
            ));
        }
        if paid_so_far > Decimal::ZERO {
            return Err(DomainError::business(
                "AP_HAS_PAYMENTS",
                format!(
                    "accounts payable {} already has {paid_so_far} paid",
                    self.ap_number
                ),
            ));
        }
        self.voided = true;
        self.voided_at = Some(now);
        Ok(())
    }
}

impl Entity for AccountsPayable {
    type Id = AccountsPayableId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVendorPayment {
    pub amount: Decimal,
    #[serde(default)]
    pub reference: Option<String>,
}

/// A payment made to the vendor against one payable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorPayment {
    id: VendorPaymentId,
    accounts_payable_id: AccountsPayableId,
    amount: Decimal,
    paid_at: DateTime<Utc>,
    reference: Option<String>,
}

impl VendorPayment {
    pub fn record(
        id: VendorPaymentId,
        payable: &AccountsPayable,
        paid_so_far: Decimal,
        input: NewVendorPayment,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        payable.ensure_accepts_payment(paid_so_far, input.amount)?;
        Ok(Self {
            id,
            accounts_payable_id: *payable.id(),
            amount: input.amount,
            paid_at: now,
            reference: input.reference.filter(|r| !r.trim().is_empty()),
        })
    }

    pub fn accounts_payable_id(&self) -> AccountsPayableId {
        self.accounts_payable_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn paid_at(&self) -> DateTime<Utc> {
        self.paid_at
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}

impl Entity for VendorPayment {
    type Id = VendorPaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
