//! Customer projects and the deliveries made against them.

pub mod delivery;
pub mod events;
pub mod project;

pub use delivery::{Delivery, DeliveryId, DeliveryStatus, NewDelivery};
pub use events::DeliveryCompletedEvent;
pub use project::{NewProject, Project, ProjectId, ProjectStatus};
