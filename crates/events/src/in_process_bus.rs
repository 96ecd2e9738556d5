//! In-process event bus: event type → ordered handler list.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use tradeerp_core::DomainResult;

use crate::{
    AfterCommitHandler, DomainEvent, EventHandler, EventPublisher, PublishError, UnitOfWork,
};

type InTransactionFn<Ctx> = Box<dyn Fn(&mut Ctx, &dyn Any) -> DomainResult<()> + Send + Sync>;
type AfterCommitFn = Arc<dyn Fn(&dyn Any) + Send + Sync>;

struct InTransaction<Ctx> {
    name: &'static str,
    run: InTransactionFn<Ctx>,
}

struct AfterCommit {
    name: &'static str,
    run: AfterCommitFn,
}

/// Synchronous, in-process event bus.
///
/// - Handlers are keyed by the concrete event type and run in registration order.
/// - The first failing handler stops dispatch and its error is returned; the
///   caller's unit of work is expected to roll back.
/// - After-commit handlers are deferred through the unit of work and only run
///   if it commits.
///
/// Registration takes `&mut self`: wire all handlers at startup, then share the
/// bus immutably (e.g. behind an `Arc`).
pub struct InProcessEventBus<Ctx> {
    in_transaction: HashMap<TypeId, Vec<InTransaction<Ctx>>>,
    after_commit: HashMap<TypeId, Vec<AfterCommit>>,
}

impl<Ctx> core::fmt::Debug for InProcessEventBus<Ctx> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InProcessEventBus")
            .field("in_transaction_types", &self.in_transaction.len())
            .field("after_commit_types", &self.after_commit.len())
            .finish()
    }
}

impl<Ctx> Default for InProcessEventBus<Ctx> {
    fn default() -> Self {
        Self {
            in_transaction: HashMap::new(),
            after_commit: HashMap::new(),
        }
    }
}

impl<Ctx: 'static> InProcessEventBus<Ctx> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler that runs inside the publisher's unit of work.
    pub fn subscribe<E, H>(&mut self, handler: H) -> &mut Self
    where
        E: DomainEvent,
        H: EventHandler<Ctx, E> + 'static,
    {
        let name = handler.name();
        let run: InTransactionFn<Ctx> = Box::new(move |ctx, event| match event.downcast_ref::<E>() {
            Some(event) => handler.handle(ctx, event),
            None => Ok(()),
        });
        self.in_transaction
            .entry(TypeId::of::<E>())
            .or_default()
            .push(InTransaction { name, run });
        self
    }

    /// Register a handler that runs after the publisher's unit of work commits.
    pub fn subscribe_after_commit<E, H>(&mut self, handler: H) -> &mut Self
    where
        E: DomainEvent,
        H: AfterCommitHandler<E> + 'static,
    {
        let name = handler.name();
        let run: AfterCommitFn = Arc::new(move |event| {
            if let Some(event) = event.downcast_ref::<E>() {
                handler.handle(event);
            }
        });
        self.after_commit
            .entry(TypeId::of::<E>())
            .or_default()
            .push(AfterCommit { name, run });
        self
    }

    /// Number of in-transaction handlers registered for `E`.
    pub fn handler_count<E: DomainEvent>(&self) -> usize {
        self.in_transaction
            .get(&TypeId::of::<E>())
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Number of after-commit handlers registered for `E`.
    pub fn after_commit_count<E: DomainEvent>(&self) -> usize {
        self.after_commit
            .get(&TypeId::of::<E>())
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl<Ctx> EventPublisher<Ctx> for InProcessEventBus<Ctx>
where
    Ctx: UnitOfWork + 'static,
{
    fn publish<E: DomainEvent>(&self, ctx: &mut Ctx, event: E) -> Result<(), PublishError> {
        let event_type = event.event_type();
        let type_id = TypeId::of::<E>();

        if let Some(handlers) = self.in_transaction.get(&type_id) {
            for h in handlers {
                tracing::debug!(event_type, handler = h.name, "dispatching domain event");
                if let Err(source) = (h.run)(ctx, &event) {
                    tracing::warn!(
                        event_type,
                        handler = h.name,
                        error = %source,
                        "event handler failed; unit of work will roll back"
                    );
                    return Err(PublishError {
                        event_type,
                        handler: h.name,
                        source,
                    });
                }
            }
        }

        if let Some(handlers) = self.after_commit.get(&type_id) {
            let shared = Arc::new(event);
            for h in handlers {
                let run = Arc::clone(&h.run);
                let event = Arc::clone(&shared);
                let name = h.name;
                ctx.defer(Box::new(move || {
                    tracing::debug!(event_type, handler = name, "running after-commit handler");
                    run(&*event);
                }));
            }
        }

        Ok(())
    }
}
