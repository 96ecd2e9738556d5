use std::sync::Arc;

use thiserror::Error;
use tradeerp_core::DomainError;

use crate::DomainEvent;

/// A handler rejected an event; the surrounding unit of work must roll back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("handler '{handler}' failed on {event_type}: {source}")]
pub struct PublishError {
    pub event_type: &'static str,
    pub handler: &'static str,
    #[source]
    pub source: DomainError,
}

/// Event publishing seam used by application services.
///
/// Publishing is fire-and-forget from the caller's side: services propagate
/// the result with `?` and never branch on individual handler outcomes.
pub trait EventPublisher<Ctx>: Send + Sync {
    fn publish<E: DomainEvent>(&self, ctx: &mut Ctx, event: E) -> Result<(), PublishError>;
}

impl<Ctx, P> EventPublisher<Ctx> for Arc<P>
where
    P: EventPublisher<Ctx>,
{
    fn publish<E: DomainEvent>(&self, ctx: &mut Ctx, event: E) -> Result<(), PublishError> {
        (**self).publish(ctx, event)
    }
}
