use std::sync::Arc;
use std::time::Duration;

/// Progress snapshot passed to a termination callback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressInfo {
    pub iteration: u32,
    pub elapsed: Duration,
    pub primal_objective: f64,
    pub dual_objective: f64,
}

// ---------------------------------
// enum for managing callbacks
// ---------------------------------

pub(crate) type CallbackClosure<I> = Arc<dyn Fn(&I) -> bool + Send + Sync>;

#[derive(Default)]
pub(crate) enum Callback<I> {
    #[default]
    None,
    Rust(fn(&I) -> bool),
    Closure(CallbackClosure<I>),
}

impl<I> std::fmt::Debug for Callback<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callback::None => write!(f, "Callback::None"),
            Callback::Rust(_) => write!(f, "Callback::Rust"),
            Callback::Closure(_) => write!(f, "Callback::Closure"),
        }
    }
}

// manual impl, derive would require I: Clone
impl<I> Clone for Callback<I> {
    fn clone(&self) -> Self {
        match self {
            Callback::None => Callback::None,
            Callback::Rust(f) => Callback::Rust(*f),
            Callback::Closure(f) => Callback::Closure(Arc::clone(f)),
        }
    }
}

impl<I> Callback<I> {
    // Call the callback function
    fn call(&self, info: &I) -> bool {
        match self {
            Callback::None => false,
            Callback::Rust(f) => f(info),
            Callback::Closure(f) => f(info),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SolverCallbacks {
    /// callback for termination
    pub termination_callback: Callback<ProgressInfo>,
}

impl SolverCallbacks {
    pub(crate) fn check_termination(&self, info: &ProgressInfo) -> bool {
        self.termination_callback.call(info)
    }
}

#[test]
fn test_termination_callback() {
    let mut cb = SolverCallbacks::default();
    let info = ProgressInfo {
        iteration: 12,
        ..Default::default()
    };
    assert!(!cb.check_termination(&info));

    cb.termination_callback = Callback::Rust(|i| i.iteration > 10);
    assert!(cb.check_termination(&info));

    let limit = 20;
    cb.termination_callback = Callback::Closure(Arc::new(move |i: &ProgressInfo| i.iteration > limit));
    let copy = cb.clone();
    assert!(!copy.check_termination(&info));
}
