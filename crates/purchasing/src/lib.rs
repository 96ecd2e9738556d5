//! Purchasing domain module: RFQ workflow and purchase orders.
//!
//! A purchase request solicits quotes from vendors (one `RfqItem` per vendor),
//! one replied item is selected, and a purchase order is raised from that
//! selection. Order transitions return the events the application layer
//! publishes; nothing here performs IO.

pub mod events;
pub mod order;
pub mod request;

pub use events::{
    PurchaseOrderCanceledEvent, PurchaseOrderConfirmedEvent, PurchaseOrderReceivedEvent,
};
pub use order::{PurchaseOrder, PurchaseOrderId, PurchaseOrderStatus};
pub use request::{
    NewPurchaseRequest, PurchaseRequest, PurchaseRequestId, PurchaseRequestStatus, RfqItem,
    RfqItemId, RfqItemStatus,
};
