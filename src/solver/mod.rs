//! The boundary between a [`Model`] and the external numerical solver.
//!
//! The crate contains no numerical method of its own.  A backend implements
//! [`Solver`], reads the model data through the model's accessors, and
//! returns a [`Solution`].  While running it should poll
//! [`SolveContext::check_interrupt`] at its internal checkpoints so that
//! batch cancellation and time limits are honoured.

use crate::algebra::FloatT;
use crate::io::PrintTarget;
use crate::model::{Model, Solution};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::timers::Instant;

mod callbacks;
pub use callbacks::ProgressInfo;
pub(crate) use callbacks::*;

/// Error reported by a solver backend, passed through unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("solver error {code}: {message}")]
pub struct SolveError {
    pub code: i32,
    pub message: String,
}

impl SolveError {
    /// code of a solve stopped by an interrupt request
    pub const INTERRUPTED: i32 = -1;
    /// code of a solution whose shape does not match its model
    pub const BAD_SOLUTION: i32 = -2;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn interrupted() -> Self {
        Self::new(Self::INTERRUPTED, "interrupted")
    }

    pub fn is_interrupted(&self) -> bool {
        self.code == Self::INTERRUPTED
    }
}

/// A shared cooperative cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Everything a solver may use besides the model itself while it runs.
pub struct SolveContext<'a> {
    interrupt: &'a Interrupt,
    callbacks: &'a SolverCallbacks,
    stream: &'a mut PrintTarget,
    threads: usize,
    started: Instant,
}

impl<'a> SolveContext<'a> {
    pub(crate) fn new(
        interrupt: &'a Interrupt,
        callbacks: &'a SolverCallbacks,
        stream: &'a mut PrintTarget,
        threads: usize,
    ) -> Self {
        Self {
            interrupt,
            callbacks,
            stream,
            threads,
            started: Instant::now(),
        }
    }

    /// worker threads granted to this solve
    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupt.is_requested()
    }

    /// `Err(SolveError::interrupted())` once cancellation was requested.
    pub fn check_interrupt(&self) -> Result<(), SolveError> {
        if self.is_interrupted() {
            Err(SolveError::interrupted())
        } else {
            Ok(())
        }
    }

    /// Reports progress to the model's termination callback.  Fails like
    /// [`check_interrupt`](Self::check_interrupt) if cancellation was
    /// requested or the callback asks to stop.
    pub fn progress(&self, info: &ProgressInfo) -> Result<(), SolveError> {
        self.check_interrupt()?;
        if self.callbacks.check_termination(info) {
            return Err(SolveError::interrupted());
        }
        Ok(())
    }

    /// Writes one line of progress text to the model's print target.
    pub fn log(&mut self, line: &str) -> std::io::Result<()> {
        writeln!(self.stream, "{}", line)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// An external numerical solver.
pub trait Solver<T: FloatT = f64>: Send + Sync {
    fn name(&self) -> &str;

    /// Solves a validated model.  Long running implementations should
    /// return `Err(SolveError::interrupted())` soon after
    /// `ctx.is_interrupted()` becomes true.
    fn solve(&self, model: &Model<T>, ctx: &mut SolveContext<'_>) -> Result<Solution<T>, SolveError>;
}

#[test]
fn test_interrupt_shared() {
    let interrupt = Interrupt::new();
    let callbacks = SolverCallbacks::default();
    let mut stream = PrintTarget::Buffer(Vec::new());
    let mut ctx = SolveContext::new(&interrupt, &callbacks, &mut stream, 2);

    assert_eq!(ctx.threads(), 2);
    assert!(ctx.check_interrupt().is_ok());
    ctx.log("iteration 1").unwrap();

    interrupt.clone().request();
    assert!(ctx.check_interrupt().unwrap_err().is_interrupted());
    drop(ctx);

    use crate::io::ConfigurablePrintTarget;
    assert_eq!(stream.get_print_buffer().unwrap(), "iteration 1\n");
}
