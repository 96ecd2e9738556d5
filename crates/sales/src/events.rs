use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tradeerp_admin::CompanyId;
use tradeerp_core::Currency;
use tradeerp_events::DomainEvent;
use tradeerp_projects::ProjectId;

use crate::QuotationId;

/// The customer accepted a quotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotationAcceptedEvent {
    pub quotation_id: QuotationId,
    pub project_id: ProjectId,
    pub customer_id: CompanyId,
    pub total_amount: Decimal,
    pub currency: Currency,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent for QuotationAcceptedEvent {
    fn event_type(&self) -> &'static str {
        "sales.quotation.accepted"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
