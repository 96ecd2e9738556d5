//! In-memory transactional store.
//!
//! Persistence mapping to an RDBMS is out of scope; this store gives the
//! application layer the same shape a database would: one [`Transaction`] per
//! request, atomic commit, and optimistic conflict detection at row level.

mod database;
mod sequence;
mod table;

pub use database::{Database, Tables, Transaction};
pub use sequence::Sequences;
pub use table::Table;
