use tradeerp_core::DomainResult;

use crate::DomainEvent;

/// Reacts to one event type with a follow-up write in the publisher's unit of work.
///
/// `Ctx` is the unit of work (transaction) the triggering write was staged in.
/// Returning an error aborts that unit of work: the triggering write and every
/// handler write before it are discarded together.
pub trait EventHandler<Ctx, E: DomainEvent>: Send + Sync {
    /// Stable handler name used in logs and error reports.
    fn name(&self) -> &'static str;

    fn handle(&self, ctx: &mut Ctx, event: &E) -> DomainResult<()>;
}

/// Runs once the unit of work has committed; never sees a rolled-back event.
///
/// After-commit handlers get no store access and cannot fail the write.
pub trait AfterCommitHandler<E: DomainEvent>: Send + Sync {
    fn name(&self) -> &'static str;

    fn handle(&self, event: &E);
}
