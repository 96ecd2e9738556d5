//! Domain events and their in-process dispatch.
//!
//! Events are published by application services after a write has been
//! staged in a unit of work. Handlers registered for the event type run
//! synchronously inside that same unit of work, so a failing handler aborts
//! the whole write. `EventPublisher` is the swap point if dispatch ever moves
//! to an external broker.

pub mod event;
pub mod handler;
pub mod in_process_bus;
pub mod publisher;
pub mod unit_of_work;

pub use event::DomainEvent;
pub use handler::{AfterCommitHandler, EventHandler};
pub use in_process_bus::InProcessEventBus;
pub use publisher::{EventPublisher, PublishError};
pub use unit_of_work::{DeferredJob, UnitOfWork};
