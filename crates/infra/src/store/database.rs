use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::debug;

use tradeerp_accounting::{AccountsPayable, AccountsPayableId, VendorPayment, VendorPaymentId};
use tradeerp_admin::{Company, CompanyId, User, UserId};
use tradeerp_core::{DocumentNumber, DomainError, DomainResult};
use tradeerp_events::{DeferredJob, UnitOfWork};
use tradeerp_invoicing::{Payment, PaymentId, TaxInvoice, TaxInvoiceId};
use tradeerp_projects::{Delivery, DeliveryId, Project, ProjectId};
use tradeerp_purchasing::{PurchaseOrder, PurchaseOrderId, PurchaseRequest, PurchaseRequestId};
use tradeerp_sales::{Quotation, QuotationId};

use super::sequence::Sequences;
use super::table::Table;

macro_rules! tables {
    ($($name:ident, $name_mut:ident: $key:ty => $value:ty;)*) => {
        /// Every table in the store.
        #[derive(Debug, Default)]
        pub struct Tables {
            $($name: Table<$key, $value>,)*
        }

        impl Tables {
            $(
                pub fn $name(&self) -> &Table<$key, $value> {
                    &self.$name
                }

                pub fn $name_mut(&mut self) -> &mut Table<$key, $value> {
                    &mut self.$name
                }
            )*

            fn snapshot(&self) -> Tables {
                Tables {
                    $($name: self.$name.snapshot(),)*
                }
            }

            fn check_conflicts(&self, committed: &Tables) -> DomainResult<()> {
                $(self.$name.check_base(&committed.$name, stringify!($name))?;)*
                Ok(())
            }

            fn written(&self) -> Vec<&'static str> {
                let mut names = Vec::new();
                $(
                    if self.$name.is_dirty() {
                        names.push(stringify!($name));
                    }
                )*
                names
            }

            fn merge_into(self, committed: &mut Tables) {
                $(self.$name.merge_into(&mut committed.$name);)*
            }
        }
    };
}

tables! {
    companies, companies_mut: CompanyId => Company;
    users, users_mut: UserId => User;
    projects, projects_mut: ProjectId => Project;
    deliveries, deliveries_mut: DeliveryId => Delivery;
    quotations, quotations_mut: QuotationId => Quotation;
    purchase_requests, purchase_requests_mut: PurchaseRequestId => PurchaseRequest;
    purchase_orders, purchase_orders_mut: PurchaseOrderId => PurchaseOrder;
    payables, payables_mut: AccountsPayableId => AccountsPayable;
    vendor_payments, vendor_payments_mut: VendorPaymentId => VendorPayment;
    tax_invoices, tax_invoices_mut: TaxInvoiceId => TaxInvoice;
    payments, payments_mut: PaymentId => Payment;
}

/// The committed state of the store.
#[derive(Debug, Default)]
pub struct Database {
    committed: RwLock<Tables>,
    sequences: Arc<Sequences>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a unit of work on a snapshot of the committed tables.
    ///
    /// The snapshot shares the committed rows; only rows the transaction
    /// writes are copied.
    pub fn begin(&self) -> Transaction {
        let tables = self
            .committed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot();
        Transaction {
            tables,
            sequences: Arc::clone(&self.sequences),
            deferred: Vec::new(),
            now: Utc::now(),
        }
    }

    /// Atomically publish the transaction's writes, then run its deferred jobs.
    ///
    /// Fails with `Conflict` if a row it read or wrote, or a row matching one
    /// of its lookups, was committed by someone else after it began; nothing
    /// is applied in that case.
    pub fn commit(&self, tx: Transaction) -> DomainResult<()> {
        let Transaction {
            tables, deferred, ..
        } = tx;
        {
            let mut committed = self
                .committed
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            tables.check_conflicts(&committed)?;
            debug!(tables = ?tables.written(), "committing transaction");
            tables.merge_into(&mut committed);
        }
        for job in deferred {
            job();
        }
        Ok(())
    }

    /// Run `f` in a fresh transaction; commit on `Ok`, discard on `Err`.
    pub fn write<T, E>(&self, f: impl FnOnce(&mut Transaction) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DomainError>,
    {
        let mut tx = self.begin();
        let value = f(&mut tx)?;
        self.commit(tx)?;
        Ok(value)
    }

    /// Run a read-only query against the committed tables.
    pub fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        let committed = self
            .committed
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&committed)
    }
}

/// A unit of work: a private working copy of the tables plus the jobs to run
/// once it commits. Dropping it is a rollback.
pub struct Transaction {
    tables: Tables,
    sequences: Arc<Sequences>,
    deferred: Vec<DeferredJob>,
    now: DateTime<Utc>,
}

impl Transaction {
    /// Business time of this unit of work; every write in it shares one clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Allocate the next document number for `prefix`.
    pub fn next_number(&self, prefix: &'static str) -> DocumentNumber {
        self.sequences.next(prefix, self.now)
    }

}

impl core::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Transaction")
            .field("now", &self.now)
            .field("written", &self.tables.written())
            .field("deferred_jobs", &self.deferred.len())
            .finish()
    }
}

impl UnitOfWork for Transaction {
    fn defer(&mut self, job: DeferredJob) {
        self.deferred.push(job);
    }
}

impl core::ops::Deref for Transaction {
    type Target = Tables;

    fn deref(&self) -> &Tables {
        &self.tables
    }
}

impl core::ops::DerefMut for Transaction {
    fn deref_mut(&mut self) -> &mut Tables {
        &mut self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tradeerp_admin::{CompanyKind, ContactInfo, NewCompany};
    use tradeerp_core::Entity;

    fn company(tx: &Transaction, reg: &str) -> Company {
        Company::register(
            CompanyId::generate(),
            NewCompany {
                name: format!("Company {reg}"),
                registration_number: reg.to_string(),
                kind: CompanyKind::Vendor,
                contact: ContactInfo::default(),
            },
            tx.now(),
        )
        .unwrap()
    }

    #[test]
    fn committed_writes_are_visible_and_rollback_discards() {
        let db = Database::new();

        let mut tx = db.begin();
        let c = company(&tx, "1");
        tx.companies_mut().insert(c.clone());
        db.commit(tx).unwrap();

        let mut rolled_back = db.begin();
        let d = company(&rolled_back, "2");
        rolled_back.companies_mut().insert(d);
        drop(rolled_back);

        db.read(|t| {
            assert_eq!(t.companies().len(), 1);
            assert!(t.companies().get(c.id()).is_some());
        });
    }

    #[test]
    fn writers_of_different_rows_in_one_table_both_commit() {
        let db = Database::new();
        let mut a = db.begin();
        let mut b = db.begin();
        let ca = company(&a, "1");
        let cb = company(&b, "2");
        a.companies_mut().insert(ca);
        b.companies_mut().insert(cb);

        db.commit(a).unwrap();
        db.commit(b).unwrap();
        db.read(|t| assert_eq!(t.companies().len(), 2));
    }

    #[test]
    fn second_writer_of_same_row_gets_conflict() {
        let db = Database::new();
        let c = db
            .write(|tx| {
                let c = company(tx, "1");
                tx.companies_mut().insert(c.clone());
                Ok::<_, DomainError>(c)
            })
            .unwrap();

        let mut a = db.begin();
        let mut b = db.begin();
        let now = a.now();
        a.companies_mut().require_mut(c.id(), "company").unwrap().deactivate(now).unwrap();
        b.companies_mut()
            .require_mut(c.id(), "company")
            .unwrap()
            .update_profile(Some("Renamed".into()), None, now)
            .unwrap();

        db.commit(a).unwrap();
        let err = db.commit(b).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        db.read(|t| assert_eq!(t.companies().get(c.id()).unwrap().name(), c.name()));
    }

    #[test]
    fn lookup_that_a_concurrent_insert_would_change_conflicts() {
        let db = Database::new();
        let mut a = db.begin();
        let mut b = db.begin();
        for tx in [&mut a, &mut b] {
            assert!(tx.companies().find(|c| c.registration_number() == "1").is_none());
            let c = company(tx, "1");
            tx.companies_mut().insert(c);
        }

        db.commit(a).unwrap();
        let err = db.commit(b).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        db.read(|t| assert_eq!(t.companies().len(), 1));
    }

    #[test]
    fn read_only_row_changed_underneath_conflicts() {
        let db = Database::new();
        let c = db
            .write(|tx| {
                let c = company(tx, "1");
                tx.companies_mut().insert(c.clone());
                Ok::<_, DomainError>(c)
            })
            .unwrap();

        let mut reader = db.begin();
        assert!(reader.companies().require(c.id(), "company").unwrap().is_active());
        let other = company(&reader, "2");
        reader.companies_mut().insert(other);

        db.write(|tx| {
            let now = tx.now();
            tx.companies_mut().require_mut(c.id(), "company")?.deactivate(now)
        })
        .unwrap();

        let err = db.commit(reader).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn writers_of_different_tables_both_commit() {
        let db = Database::new();
        let mut a = db.begin();
        let b = db.begin();
        let ca = company(&a, "1");
        a.companies_mut().insert(ca);
        db.commit(a).unwrap();
        db.commit(b).unwrap();
    }

    #[test]
    fn deferred_jobs_run_only_on_commit() {
        let db = Database::new();
        let ran = Arc::new(AtomicUsize::new(0));

        let mut tx = db.begin();
        let counter = Arc::clone(&ran);
        tx.defer(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        drop(tx);
        assert_eq!(ran.load(Ordering::SeqCst), 0);

        let result: Result<(), DomainError> = db.write(|tx| {
            let counter = Arc::clone(&ran);
            tx.defer(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
            Ok(())
        });
        result.unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn write_discards_on_error() {
        let db = Database::new();
        let result: Result<(), DomainError> = db.write(|tx| {
            let c = company(tx, "1");
            tx.companies_mut().insert(c);
            Err(DomainError::validation("nope"))
        });
        assert!(result.is_err());
        db.read(|t| assert!(t.companies().is_empty()));
    }

    #[test]
    fn numbers_come_from_shared_sequences() {
        let db = Database::new();
        let a = db.begin();
        let b = db.begin();
        assert_ne!(a.next_number("PO"), b.next_number("PO"));
    }
}
