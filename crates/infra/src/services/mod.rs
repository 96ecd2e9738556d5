//! Application services: one per module, one method per use case.
//!
//! Every command runs in a single [`Transaction`](crate::Transaction):
//! validate, mutate the entity, publish the resulting event (handlers write in
//! the same transaction), commit. Any error discards the whole transaction.

mod admin;
mod invoicing;
mod payables;
mod projects;
mod purchasing;
mod sales;

pub use admin::AdminService;
pub use invoicing::InvoicingService;
pub use payables::PayablesService;
pub use projects::ProjectService;
pub use purchasing::PurchasingService;
pub use sales::SalesService;

pub(crate) use invoicing::received_to_date;

use thiserror::Error;

use tradeerp_core::DomainError;
use tradeerp_events::PublishError;

use crate::lock::LockError;
use crate::store::{Database, Transaction};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Run `f` as one unit of work: commit on `Ok`, roll back on `Err`.
fn in_transaction<T>(
    db: &Database,
    f: impl FnOnce(&mut Transaction) -> ServiceResult<T>,
) -> ServiceResult<T> {
    db.write(f)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// An event handler rejected the write; the unit of work was rolled back.
    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Lock(#[from] LockError),
}

impl ServiceError {
    /// The domain error behind this failure, looking through handler failures.
    pub fn domain_error(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(e) => Some(e),
            ServiceError::Publish(e) => Some(&e.source),
            ServiceError::Lock(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_looks_through_publish_failures() {
        let source = DomainError::business("AP_HAS_PAYMENTS", "already paid");
        let err = ServiceError::from(PublishError {
            event_type: "purchasing.order.canceled",
            handler: "accounting.void_payable",
            source: source.clone(),
        });
        assert_eq!(err.domain_error(), Some(&source));
        assert!(err.to_string().contains("accounting.void_payable"));
    }
}
