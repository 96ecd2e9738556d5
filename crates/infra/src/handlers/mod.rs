//! Cross-module event handlers.
//!
//! Each handler reacts to one event with a follow-up write in another module,
//! inside the publisher's transaction. [`register_all`] wires the full set.

mod invoicing;
mod payables;
mod projects;
mod purchasing;

pub(crate) use payables::paid_to_date;

pub use invoicing::DraftInvoiceOnDeliveryCompleted;
pub use payables::{CreatePayableOnOrderConfirmed, VoidPayableOnOrderCanceled};
pub use projects::AwardProjectOnQuotationAccepted;
pub use purchasing::{ClosePurchaseRequestOnOrderReceived, RevertSelectionOnOrderCanceled};

use std::sync::Arc;

use tradeerp_projects::DeliveryCompletedEvent;
use tradeerp_purchasing::{
    PurchaseOrderCanceledEvent, PurchaseOrderConfirmedEvent, PurchaseOrderReceivedEvent,
};
use tradeerp_sales::QuotationAcceptedEvent;

use crate::EventBus;
use crate::activity::{ActivityFeed, ActivityRecorder};
use crate::config::AppConfig;

/// Register every in-transaction handler and the activity recorder.
pub fn register_all(bus: &mut EventBus, config: &AppConfig, feed: Arc<ActivityFeed>) {
    let recorder = ActivityRecorder::new(feed);

    bus.subscribe::<PurchaseOrderConfirmedEvent, _>(CreatePayableOnOrderConfirmed::new(
        config.payment_terms_days,
    ))
    .subscribe::<PurchaseOrderReceivedEvent, _>(ClosePurchaseRequestOnOrderReceived)
    .subscribe::<PurchaseOrderCanceledEvent, _>(VoidPayableOnOrderCanceled)
    .subscribe::<PurchaseOrderCanceledEvent, _>(RevertSelectionOnOrderCanceled)
    .subscribe::<QuotationAcceptedEvent, _>(AwardProjectOnQuotationAccepted)
    .subscribe::<DeliveryCompletedEvent, _>(DraftInvoiceOnDeliveryCompleted::new(config.tax_rate));

    bus.subscribe_after_commit::<PurchaseOrderConfirmedEvent, _>(recorder.clone())
        .subscribe_after_commit::<PurchaseOrderReceivedEvent, _>(recorder.clone())
        .subscribe_after_commit::<PurchaseOrderCanceledEvent, _>(recorder.clone())
        .subscribe_after_commit::<QuotationAcceptedEvent, _>(recorder.clone())
        .subscribe_after_commit::<DeliveryCompletedEvent, _>(recorder);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_all_wires_every_event() {
        let mut bus = EventBus::new();
        register_all(&mut bus, &AppConfig::default(), Arc::new(ActivityFeed::new(16)));

        assert_eq!(bus.handler_count::<PurchaseOrderConfirmedEvent>(), 1);
        assert_eq!(bus.handler_count::<PurchaseOrderReceivedEvent>(), 1);
        assert_eq!(bus.handler_count::<PurchaseOrderCanceledEvent>(), 2);
        assert_eq!(bus.handler_count::<QuotationAcceptedEvent>(), 1);
        assert_eq!(bus.handler_count::<DeliveryCompletedEvent>(), 1);
        assert_eq!(bus.after_commit_count::<PurchaseOrderCanceledEvent>(), 1);
    }
}
