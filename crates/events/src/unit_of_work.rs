/// Work queued to run after a successful commit.
pub type DeferredJob = Box<dyn FnOnce() + Send + 'static>;

/// The write context a request stages its changes in.
///
/// Implementations run deferred jobs after they commit, in the order they
/// were deferred, and drop them unrun on rollback.
pub trait UnitOfWork {
    fn defer(&mut self, job: DeferredJob);
}
