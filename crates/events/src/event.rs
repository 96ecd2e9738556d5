use chrono::{DateTime, Utc};

/// A domain event: an immutable fact about something that already happened.
///
/// Events name the triggering fact (`PurchaseOrderConfirmed`), never the side
/// effect a consumer is expected to perform, and carry identifiers plus the
/// few scalars a handler needs.
pub trait DomainEvent: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "purchasing.order.confirmed").
    fn event_type(&self) -> &'static str;

    /// When the fact occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
