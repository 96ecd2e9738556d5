//! Company and user administration.
//!
//! Companies are the trading partners (customers and vendors) every other
//! module refers to; users are the staff operating the system. Neither is ever
//! hard-deleted: both carry an `active` flag.

pub mod company;
pub mod user;

pub use company::{
    Company, CompanyId, CompanyKind, ContactInfo, NewCompany, normalize_registration_number,
};
pub use user::{NewUser, Role, User, UserId};
