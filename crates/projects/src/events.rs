use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tradeerp_admin::CompanyId;
use tradeerp_core::Currency;
use tradeerp_events::DomainEvent;

use crate::{DeliveryId, ProjectId};

/// A delivery reached the customer; receivables pick it up from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryCompletedEvent {
    pub delivery_id: DeliveryId,
    pub project_id: ProjectId,
    pub customer_id: CompanyId,
    pub amount: Decimal,
    pub currency: Currency,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent for DeliveryCompletedEvent {
    fn event_type(&self) -> &'static str {
        "projects.delivery.completed"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
