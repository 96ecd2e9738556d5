use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument};

use tradeerp_core::{DomainError, DomainResult, Entity, checked_sum};
use tradeerp_events::EventPublisher;
use tradeerp_projects::{
    Delivery, DeliveryId, DeliveryStatus, NewDelivery, NewProject, Project, ProjectId,
};

use super::{ServiceResult, in_transaction};
use crate::lock::ProjectLockService;
use crate::store::{Database, Tables, Transaction};

/// Projects and their deliveries.
///
/// Delivery writes take the project lock for the whole unit of work so the
/// contract-amount check sees every committed delivery of that project.
#[derive(Debug, Clone)]
pub struct ProjectService<P, L> {
    db: Arc<Database>,
    publisher: P,
    locks: L,
}

fn scheduled_total(tables: &Tables, project_id: ProjectId) -> DomainResult<Decimal> {
    let amounts = tables
        .deliveries()
        .filter(move |d| d.project_id() == project_id && d.status().is_committed())
        .map(|d| d.amount());
    checked_sum(amounts)
}

fn has_open_deliveries(tables: &Tables, project_id: ProjectId) -> bool {
    tables
        .deliveries()
        .find(move |d| {
            d.project_id() == project_id
                && matches!(d.status(), DeliveryStatus::Scheduled | DeliveryStatus::Shipped)
        })
        .is_some()
}

impl<P, L> ProjectService<P, L>
where
    P: EventPublisher<Transaction>,
    L: ProjectLockService,
{
    pub fn new(db: Arc<Database>, publisher: P, locks: L) -> Self {
        Self {
            db,
            publisher,
            locks,
        }
    }

    #[instrument(skip(self))]
    pub fn create_project(&self, input: NewProject) -> ServiceResult<ProjectId> {
        in_transaction(&self.db, |tx| {
            tx.companies()
                .require(&input.customer_id, "company")?
                .ensure_active_customer()?;
            let project = Project::create(ProjectId::generate(), tx.next_number("PRJ"), input, tx.now())?;
            let id = *project.id();
            info!(project_id = %id, code = %project.code(), "project created");
            tx.projects_mut().insert(project);
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn complete_project(&self, id: ProjectId) -> ServiceResult<ProjectId> {
        self.locks.with_lock(id, || {
            in_transaction(&self.db, |tx| {
                if has_open_deliveries(tx, id) {
                    return Err(DomainError::business(
                        "PROJECT_HAS_OPEN_DELIVERIES",
                        "deliveries still scheduled or shipped; deliver or cancel them first",
                    )
                    .into());
                }
                let now = tx.now();
                tx.projects_mut().require_mut(&id, "project")?.complete(now)?;
                info!(project_id = %id, "project completed");
                Ok(id)
            })
        })?
    }

    #[instrument(skip(self))]
    pub fn cancel_project(&self, id: ProjectId) -> ServiceResult<ProjectId> {
        self.locks.with_lock(id, || {
            in_transaction(&self.db, |tx| {
                if has_open_deliveries(tx, id) {
                    return Err(DomainError::business(
                        "PROJECT_HAS_OPEN_DELIVERIES",
                        "deliveries still scheduled or shipped; deliver or cancel them first",
                    )
                    .into());
                }
                let now = tx.now();
                tx.projects_mut().require_mut(&id, "project")?.cancel(now)?;
                info!(project_id = %id, "project canceled");
                Ok(id)
            })
        })?
    }

    #[instrument(skip(self))]
    pub fn schedule_delivery(&self, input: NewDelivery) -> ServiceResult<DeliveryId> {
        let project_id = input.project_id;
        self.locks.with_lock(project_id, || {
            in_transaction(&self.db, |tx| {
                let scheduled = scheduled_total(tx, project_id)?;
                let project = tx.projects().require(&project_id, "project")?;
                let delivery = Delivery::schedule(
                    DeliveryId::generate(),
                    tx.next_number("DLV"),
                    project,
                    scheduled,
                    input,
                    tx.now(),
                )?;
                let id = *delivery.id();
                info!(delivery_id = %id, project_id = %project_id, "delivery scheduled");
                tx.deliveries_mut().insert(delivery);
                Ok(id)
            })
        })?
    }

    #[instrument(skip(self))]
    pub fn ship_delivery(&self, id: DeliveryId) -> ServiceResult<DeliveryId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            tx.deliveries_mut().require_mut(&id, "delivery")?.ship(now)?;
            Ok(id)
        })
    }

    /// SHIPPED → DELIVERED; the delivery-completed handlers draft the invoice.
    #[instrument(skip(self))]
    pub fn complete_delivery(&self, id: DeliveryId) -> ServiceResult<DeliveryId> {
        let project_id = self.db.read(|t| {
            t.deliveries()
                .require(&id, "delivery")
                .map(|d| d.project_id())
        })?;
        self.locks.with_lock(project_id, || {
            in_transaction(&self.db, |tx| {
                let now = tx.now();
                let event = tx
                    .deliveries_mut()
                    .require_mut(&id, "delivery")?
                    .mark_delivered(now)?;
                self.publisher.publish(tx, event)?;
                info!(delivery_id = %id, "delivery completed");
                Ok(id)
            })
        })?
    }

    #[instrument(skip(self))]
    pub fn cancel_delivery(&self, id: DeliveryId) -> ServiceResult<DeliveryId> {
        let project_id = self.db.read(|t| {
            t.deliveries()
                .require(&id, "delivery")
                .map(|d| d.project_id())
        })?;
        self.locks.with_lock(project_id, || {
            in_transaction(&self.db, |tx| {
                let now = tx.now();
                tx.deliveries_mut().require_mut(&id, "delivery")?.cancel(now)?;
                info!(delivery_id = %id, "delivery canceled");
                Ok(id)
            })
        })?
    }
}
