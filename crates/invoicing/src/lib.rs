//! Invoicing domain module.
//!
//! This crate contains business rules for tax invoices and the customer
//! payments received against them (accounts receivable), implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod tax_invoice;

pub use tax_invoice::{
    NewPayment, NewTaxInvoice, Payment, PaymentId, TaxInvoice, TaxInvoiceId, TaxInvoiceStatus,
    compute_tax,
};
