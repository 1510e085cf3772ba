use std::sync::atomic::{AtomicUsize, Ordering};

/// A solver resource shared by every model of a batch.
///
/// Each model solve holds a lease on the environment for its whole
/// duration.  Leases are released on every exit path of a solve,
/// including errors, cancellation and panics, so
/// [`active_leases`](Self::active_leases) is zero once a batch returns.
#[derive(Debug)]
pub struct Environment<S> {
    solver: S,
    leases: AtomicUsize,
}

impl<S> Environment<S> {
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            leases: AtomicUsize::new(0),
        }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn active_leases(&self) -> usize {
        self.leases.load(Ordering::Acquire)
    }

    pub fn into_inner(self) -> S {
        self.solver
    }

    pub(crate) fn lease(&self) -> Lease<'_, S> {
        self.leases.fetch_add(1, Ordering::AcqRel);
        Lease { env: self }
    }
}

/// RAII guard counting one active use of an [`Environment`].
pub(crate) struct Lease<'a, S> {
    env: &'a Environment<S>,
}

impl<S> Lease<'_, S> {
    pub(crate) fn solver(&self) -> &S {
        &self.env.solver
    }
}

impl<S> Drop for Lease<'_, S> {
    fn drop(&mut self) {
        self.env.leases.fetch_sub(1, Ordering::AcqRel);
    }
}

#[test]
fn test_lease_released_on_panic() {
    let env = Environment::new("solver");
    {
        let lease = env.lease();
        assert_eq!(*lease.solver(), "solver");
        assert_eq!(env.active_leases(), 1);
    }
    assert_eq!(env.active_leases(), 0);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _lease = env.lease();
        panic!("solver failure");
    }));
    assert!(result.is_err());
    assert_eq!(env.active_leases(), 0);
}
