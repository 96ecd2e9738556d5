use std::sync::Arc;

use tracing::{info, instrument};

use tradeerp_core::Entity;
use tradeerp_events::EventPublisher;
use tradeerp_sales::{NewQuotation, NewQuotationLine, Quotation, QuotationId};

use super::{ServiceResult, in_transaction};
use crate::store::{Database, Transaction};

/// Customer quotations.
#[derive(Debug, Clone)]
pub struct SalesService<P> {
    db: Arc<Database>,
    publisher: P,
}

impl<P: EventPublisher<Transaction>> SalesService<P> {
    pub fn new(db: Arc<Database>, publisher: P) -> Self {
        Self { db, publisher }
    }

    #[instrument(skip(self))]
    pub fn create_quotation(&self, input: NewQuotation) -> ServiceResult<QuotationId> {
        in_transaction(&self.db, |tx| {
            let project = tx.projects().require(&input.project_id, "project")?;
            tx.companies()
                .require(&project.customer_id(), "company")?
                .ensure_active_customer()?;
            let quotation = Quotation::create(
                QuotationId::generate(),
                tx.next_number("QT"),
                project,
                input,
                tx.now(),
            )?;
            let id = *quotation.id();
            info!(quotation_id = %id, number = %quotation.quotation_number(), "quotation created");
            tx.quotations_mut().insert(quotation);
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn add_line(&self, id: QuotationId, line: NewQuotationLine) -> ServiceResult<QuotationId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            tx.quotations_mut()
                .require_mut(&id, "quotation")?
                .add_line(line, now)?;
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn send_quotation(&self, id: QuotationId) -> ServiceResult<QuotationId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            tx.quotations_mut().require_mut(&id, "quotation")?.send(now)?;
            info!(quotation_id = %id, "quotation sent");
            Ok(id)
        })
    }

    /// Accepting awards the project contract in the same unit of work; a
    /// project that is already awarded rejects it and nothing is written.
    #[instrument(skip(self))]
    pub fn accept_quotation(&self, id: QuotationId) -> ServiceResult<QuotationId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            let event = tx
                .quotations_mut()
                .require_mut(&id, "quotation")?
                .accept(now)?;
            self.publisher.publish(tx, event)?;
            info!(quotation_id = %id, "quotation accepted");
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn reject_quotation(&self, id: QuotationId) -> ServiceResult<QuotationId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            tx.quotations_mut().require_mut(&id, "quotation")?.reject(now)?;
            info!(quotation_id = %id, "quotation rejected");
            Ok(id)
        })
    }
}
