//! Accounts payable.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns. A payable
//! is only ever created from a confirmed purchase order; its settlement status
//! is derived from the vendor payments recorded against it.

pub mod payable;

pub use payable::{
    AccountsPayable, AccountsPayableId, NewVendorPayment, VendorPayment, VendorPaymentId,
};
