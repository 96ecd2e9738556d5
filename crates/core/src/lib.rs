//! `tradeerp-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, money helpers and the calculated
//! settlement status shared by payables and receivables.

pub mod document;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod settlement;
pub mod value_object;

pub use document::DocumentNumber;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::EntityId;
pub use money::{Currency, checked_add, checked_mul, checked_sum, ensure_positive_amount};
pub use settlement::{SettlementStatus, remaining_balance};
pub use value_object::ValueObject;
