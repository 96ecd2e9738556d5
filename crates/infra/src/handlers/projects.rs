use tracing::info;

use tradeerp_core::DomainResult;
use tradeerp_events::EventHandler;
use tradeerp_sales::QuotationAcceptedEvent;

use crate::store::Transaction;

/// Quotation accepted → award the project contract for the quoted total.
#[derive(Debug, Clone, Copy)]
pub struct AwardProjectOnQuotationAccepted;

impl EventHandler<Transaction, QuotationAcceptedEvent> for AwardProjectOnQuotationAccepted {
    fn name(&self) -> &'static str {
        "projects.award_contract"
    }

    fn handle(&self, tx: &mut Transaction, event: &QuotationAcceptedEvent) -> DomainResult<()> {
        tx.projects_mut()
            .require_mut(&event.project_id, "project")?
            .award_contract(
                event.quotation_id.0,
                event.total_amount,
                &event.currency,
                event.occurred_at,
            )?;
        info!(
            project_id = %event.project_id,
            quotation_id = %event.quotation_id,
            amount = %event.total_amount,
            "project contract awarded"
        );
        Ok(())
    }
}
