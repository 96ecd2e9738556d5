//! Infrastructure layer: in-memory store, event handlers, application
//! services, query mappers, locking and configuration.

pub mod activity;
pub mod config;
pub mod handlers;
pub mod lock;
pub mod queries;
pub mod services;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use activity::{ActivityEntry, ActivityFeed, ActivityRecorder};
pub use config::{AppConfig, ConfigError};
pub use lock::{InProcessProjectLocks, LockError, ProjectLockService};
pub use queries::{Page, PageRequest, Queries};
pub use services::{ServiceError, ServiceResult};
pub use store::{Database, Table, Tables, Transaction};

/// The event bus every service publishes through.
pub type EventBus = tradeerp_events::InProcessEventBus<Transaction>;
