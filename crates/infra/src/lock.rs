//! Per-project write serialization.
//!
//! Delivery writes read the project's running delivery total and then add to
//! it; two of those racing on one project must not both pass the contract
//! check. Callers run the whole unit of work inside [`ProjectLockService::with_lock`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::warn;

use tradeerp_projects::ProjectId;

/// Raised by lock services that cannot take over a lock abandoned by a
/// panicking writer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("lock for project {0} is poisoned by a panicked writer")]
    Poisoned(ProjectId),
}

/// Mutual exclusion keyed by project.
pub trait ProjectLockService: Send + Sync {
    /// Run `f` while holding the lock for `project_id`.
    fn with_lock<T>(&self, project_id: ProjectId, f: impl FnOnce() -> T) -> Result<T, LockError>;
}

impl<L: ProjectLockService> ProjectLockService for Arc<L> {
    fn with_lock<T>(&self, project_id: ProjectId, f: impl FnOnce() -> T) -> Result<T, LockError> {
        (**self).with_lock(project_id, f)
    }
}

/// In-process implementation: one mutex per project, created on first use.
///
/// The mutexes guard no data (the unit of work of a panicking writer is never
/// committed), so a poisoned lock is taken over instead of failing.
#[derive(Debug, Default)]
pub struct InProcessProjectLocks {
    locks: Mutex<HashMap<ProjectId, Arc<Mutex<()>>>>,
}

impl InProcessProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, project_id: ProjectId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(project_id).or_default())
    }
}

impl ProjectLockService for InProcessProjectLocks {
    fn with_lock<T>(&self, project_id: ProjectId, f: impl FnOnce() -> T) -> Result<T, LockError> {
        let lock = self.lock_for(project_id);
        let _guard = lock.lock().unwrap_or_else(|poisoned| {
            warn!(project_id = %project_id, "taking over project lock left by a panicked writer");
            lock.clear_poison();
            poisoned.into_inner()
        });
        Ok(f())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn same_project_is_serialized() {
        let locks = Arc::new(InProcessProjectLocks::new());
        let project = ProjectId::generate();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    locks
                        .with_lock(project, || {
                            let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                            max_seen.fetch_max(now, Ordering::SeqCst);
                            thread::sleep(std::time::Duration::from_millis(2));
                            inside.fetch_sub(1, Ordering::SeqCst);
                        })
                        .unwrap();
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicked_writer_does_not_lock_the_project_out() {
        let locks = InProcessProjectLocks::new();
        let project = ProjectId::generate();
        let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = locks.with_lock::<()>(project, || panic!("writer failed"));
        }));
        assert!(panicked.is_err());

        assert_eq!(locks.with_lock(project, || 7).unwrap(), 7);
    }

    #[test]
    fn returns_closure_value() {
        let locks = InProcessProjectLocks::new();
        let v = locks.with_lock(ProjectId::generate(), || 42).unwrap();
        assert_eq!(v, 42);
    }
}
