//! Sales quotations domain module.
//!
//! This crate contains business rules for customer quotations, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod events;
pub mod quotation;

pub use events::QuotationAcceptedEvent;
pub use quotation::{
    NewQuotation, NewQuotationLine, Quotation, QuotationId, QuotationLine, QuotationStatus,
};
