//! Deliveries made against a running project.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradeerp_admin::CompanyId;
use tradeerp_core::{Currency, DocumentNumber, DomainError, DomainResult, Entity, typed_id};

use crate::events::DeliveryCompletedEvent;
use crate::project::{Project, ProjectId};

typed_id!(DeliveryId, "delivery id");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Scheduled,
    Shipped,
    Delivered,
    Canceled,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Scheduled => "SCHEDULED",
            DeliveryStatus::Shipped => "SHIPPED",
            DeliveryStatus::Delivered => "DELIVERED",
            DeliveryStatus::Canceled => "CANCELED",
        }
    }

    /// Counts against the project's contract amount.
    pub fn is_committed(&self) -> bool {
        !matches!(self, DeliveryStatus::Canceled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDelivery {
    pub project_id: ProjectId,
    pub description: String,
    pub amount: Decimal,
    pub scheduled_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    id: DeliveryId,
    delivery_number: DocumentNumber,
    project_id: ProjectId,
    customer_id: CompanyId,
    description: String,
    amount: Decimal,
    currency: Currency,
    status: DeliveryStatus,
    scheduled_date: NaiveDate,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Delivery {
    /// Schedule a delivery for `project`.
    ///
    /// `already_scheduled` is the sum of the project's non-canceled deliveries.
    pub fn schedule(
        id: DeliveryId,
        delivery_number: DocumentNumber,
        project: &Project,
        already_scheduled: Decimal,
        input: NewDelivery,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let description = input.description.trim().to_string();
        if description.is_empty() {
            return Err(DomainError::validation("description must not be empty"));
        }
        project.ensure_accepts_delivery(already_scheduled, input.amount)?;

        Ok(Self {
            id,
            delivery_number,
            project_id: *project.id(),
            customer_id: project.customer_id(),
            description,
            amount: input.amount,
            currency: project.currency().clone(),
            status: DeliveryStatus::Scheduled,
            scheduled_date: input.scheduled_date,
            shipped_at: None,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn delivery_number(&self) -> &DocumentNumber {
        &self.delivery_number
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn customer_id(&self) -> CompanyId {
        self.customer_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    pub fn scheduled_date(&self) -> NaiveDate {
        self.scheduled_date
    }

    pub fn shipped_at(&self) -> Option<DateTime<Utc>> {
        self.shipped_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn ship(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != DeliveryStatus::Scheduled {
            return Err(self.invalid_status("ship"));
        }
        self.status = DeliveryStatus::Shipped;
        self.shipped_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// SHIPPED → DELIVERED. Returns the event the caller must publish.
    pub fn mark_delivered(&mut self, now: DateTime<Utc>) -> DomainResult<DeliveryCompletedEvent> {
        if self.status != DeliveryStatus::Shipped {
            return Err(self.invalid_status("mark delivered"));
        }
        self.status = DeliveryStatus::Delivered;
        self.delivered_at = Some(now);
        self.updated_at = now;

        Ok(DeliveryCompletedEvent {
            delivery_id: self.id,
            project_id: self.project_id,
            customer_id: self.customer_id,
            amount: self.amount,
            currency: self.currency.clone(),
            occurred_at: now,
        })
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        match self.status {
            DeliveryStatus::Scheduled | DeliveryStatus::Shipped => {
                self.status = DeliveryStatus::Canceled;
                self.updated_at = now;
                Ok(())
            }
            _ => Err(self.invalid_status("cancel")),
        }
    }

    fn invalid_status(&self, action: &str) -> DomainError {
        DomainError::business(
            "DELIVERY_INVALID_STATUS",
            format!(
                "cannot {action} delivery {} in status {}",
                self.delivery_number,
                self.status.as_str()
            ),
        )
    }
}

impl Entity for Delivery {
    type Id = DeliveryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::NewProject;
    use tradeerp_core::EntityId;
    use tradeerp_events::DomainEvent;

    fn running_project() -> Project {
        let krw = Currency::new("KRW").unwrap();
        let mut p = Project::create(
            ProjectId::generate(),
            DocumentNumber::format("PRJ", Utc::now(), 1),
            NewProject {
                name: "Line 3".to_string(),
                customer_id: CompanyId::generate(),
                currency: krw.clone(),
            },
            Utc::now(),
        )
        .unwrap();
        p.award_contract(EntityId::new(), Decimal::from(5000), &krw, Utc::now())
            .unwrap();
        p
    }

    fn schedule(project: &Project, amount: i64) -> DomainResult<Delivery> {
        Delivery::schedule(
            DeliveryId::generate(),
            DocumentNumber::format("DLV", Utc::now(), 1),
            project,
            Decimal::ZERO,
            NewDelivery {
                project_id: *project.id(),
                description: "First batch".to_string(),
                amount: Decimal::from(amount),
                scheduled_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn schedule_requires_running_project() {
        let mut p = running_project();
        p.complete(Utc::now()).unwrap();
        let err = schedule(&p, 100).unwrap_err();
        assert_eq!(err.code(), Some("PROJECT_INVALID_STATUS"));
    }

    #[test]
    fn full_lifecycle_emits_completed_event() {
        let p = running_project();
        let mut d = schedule(&p, 1500).unwrap();
        assert_eq!(d.customer_id(), p.customer_id());

        d.ship(Utc::now()).unwrap();
        let event = d.mark_delivered(Utc::now()).unwrap();
        assert_eq!(d.status(), DeliveryStatus::Delivered);
        assert_eq!(event.delivery_id, *d.id());
        assert_eq!(event.amount, Decimal::from(1500));
        assert_eq!(event.event_type(), "projects.delivery.completed");
    }

    #[test]
    fn cannot_deliver_before_shipping() {
        let p = running_project();
        let mut d = schedule(&p, 100).unwrap();
        let err = d.mark_delivered(Utc::now()).unwrap_err();
        assert_eq!(err.code(), Some("DELIVERY_INVALID_STATUS"));
    }

    #[test]
    fn cannot_cancel_after_delivery() {
        let p = running_project();
        let mut d = schedule(&p, 100).unwrap();
        d.ship(Utc::now()).unwrap();
        d.mark_delivered(Utc::now()).unwrap();
        assert!(d.cancel(Utc::now()).is_err());
        assert_eq!(d.status(), DeliveryStatus::Delivered);
    }
}
