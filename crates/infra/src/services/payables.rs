use std::sync::Arc;

use tracing::{info, instrument};

use tradeerp_accounting::{AccountsPayableId, NewVendorPayment, VendorPayment, VendorPaymentId};
use tradeerp_core::Entity;

use super::{ServiceResult, in_transaction};
use crate::handlers::paid_to_date;
use crate::store::Database;

/// Vendor payments against accounts payable.
#[derive(Debug, Clone)]
pub struct PayablesService {
    db: Arc<Database>,
}

impl PayablesService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub fn record_payment(
        &self,
        id: AccountsPayableId,
        input: NewVendorPayment,
    ) -> ServiceResult<VendorPaymentId> {
        in_transaction(&self.db, |tx| {
            let paid = paid_to_date(tx, &id)?;
            let payable = tx.payables().require(&id, "accounts payable")?;
            let payment = VendorPayment::record(VendorPaymentId::generate(), payable, paid, input, tx.now())?;
            let payment_id = *payment.id();
            info!(ap_id = %id, payment_id = %payment_id, amount = %payment.amount(), "vendor payment recorded");
            tx.vendor_payments_mut().insert(payment);
            Ok(payment_id)
        })
    }
}
