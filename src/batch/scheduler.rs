use super::budget::ThreadBudget;
use super::{BatchSettings, Environment};
use crate::algebra::FloatT;
use crate::model::{Model, ModelError, SettingsError, Solution, SolutionStatus};
use crate::solver::{Interrupt, Solver};
use crossbeam_channel::RecvTimeoutError;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Final state of one model of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    /// The solver returned a solution with this status
    Completed(SolutionStatus),
    /// Cancelled by a race or the batch time limit, or never started
    Interrupted,
    /// The model could not be launched, or the solver failed
    Failed(String),
}

impl BatchStatus {
    /// Completed with an optimal or certificate status.
    pub fn is_conclusive(&self) -> bool {
        matches!(self, BatchStatus::Completed(s) if s.is_conclusive())
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchStatus::Completed(s) => write!(f, "Completed({})", s),
            BatchStatus::Interrupted => write!(f, "Interrupted"),
            BatchStatus::Failed(reason) => write!(f, "Failed({})", reason),
        }
    }
}

/// Status and (for completed models) solution of one model of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult<T = f64> {
    pub status: BatchStatus,
    pub solution: Option<Solution<T>>,
}

impl<T> BatchResult<T> {
    fn interrupted() -> Self {
        Self {
            status: BatchStatus::Interrupted,
            solution: None,
        }
    }

    fn failed(reason: String) -> Self {
        Self {
            status: BatchStatus::Failed(reason),
            solution: None,
        }
    }
}

// why the remaining models of a batch were cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cancel {
    Race,
    Deadline,
}

// what a worker or the dispatcher reports for one model
enum Outcome<T> {
    Solved(Solution<T>),
    Error(ModelError),
    Panicked(String),
    Invalid(ModelError),
}

/// Solves many independent models under a shared thread budget.
///
/// Models are admitted strictly in input order.  Each one asks for
/// `max(1, settings.num_threads)` threads, clamped to the pool size, and
/// starts only when that many are free.  Results are returned in input
/// order.  Solvers are cancelled cooperatively through
/// [`SolveContext`](crate::solver::SolveContext), and the scheduler waits
/// for every started solve to return before it does.
#[derive(Debug)]
pub struct BatchScheduler<'e, S> {
    env: &'e Environment<S>,
    settings: BatchSettings,
}

impl<'e, S> BatchScheduler<'e, S> {
    pub fn new(env: &'e Environment<S>, settings: BatchSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self { env, settings })
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    pub fn solve_batch<T>(&self, models: &mut [Model<T>]) -> Vec<BatchResult<T>>
    where
        T: FloatT,
        S: Solver<T>,
    {
        let n = models.len();
        let pool = self.settings.thread_pool_size;
        let race = self.settings.race;
        let started = Instant::now();
        let deadline = self
            .settings
            .time_limit
            .and_then(|t| started.checked_add(t));

        let stop = AtomicBool::new(false);
        let reason = Mutex::new(None::<Cancel>);
        let interrupt = Interrupt::new();
        let budget = ThreadBudget::new(pool);
        let (tx, rx) = crossbeam_channel::unbounded::<(usize, BatchResult<T>)>();
        let mut results: Vec<Option<BatchResult<T>>> = std::iter::repeat_with(|| None).take(n).collect();

        debug!(models = n, pool, race, time_limit = ?self.settings.time_limit, "batch started");

        // the first reason recorded wins
        let cancel = |why: Cancel| {
            {
                let mut reason = reason.lock();
                if reason.is_none() {
                    *reason = Some(why);
                }
            }
            stop.store(true, Ordering::Release);
            interrupt.request();
            budget.wake_all();
        };

        thread::scope(|scope| {
            let env = self.env;
            let (stop, reason, interrupt, budget) = (&stop, &reason, &interrupt, &budget);

            // dispatcher: admits models in input order as threads free up
            scope.spawn(move || {
                let mut queue = models.iter_mut().enumerate();
                for (index, model) in queue.by_ref() {
                    if let Err(e) = model.validate() {
                        model.clear_solution();
                        let _ = tx.send((index, classify(Outcome::Invalid(e), None)));
                        continue;
                    }
                    let want = usize::min(model.settings.requested_threads(), pool);
                    let Some(permit) = budget.acquire(want, deadline, stop) else {
                        model.clear_solution();
                        let _ = tx.send((index, BatchResult::interrupted()));
                        break;
                    };

                    debug!(
                        model = index,
                        threads = permit.threads(),
                        in_use = budget.in_use(),
                        capacity = budget.capacity(),
                        "launching model"
                    );
                    let tx = tx.clone();
                    scope.spawn(move || {
                        // the permit is held until this worker returns
                        let threads = permit.threads();
                        let lease = env.lease();
                        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                            model.solve_with(lease.solver(), interrupt, threads)
                        }));
                        let outcome = match outcome {
                            Ok(Ok(_)) => match model.solution() {
                                Ok(solution) => Outcome::Solved(solution.clone()),
                                Err(e) => Outcome::Error(e),
                            },
                            Ok(Err(e)) => Outcome::Error(e),
                            Err(payload) => Outcome::Panicked(panic_message(payload.as_ref())),
                        };
                        drop(lease);
                        // a solve that ignored the interrupt may still
                        // finish after its batch was cancelled
                        let result = classify(outcome, *reason.lock());
                        if result.solution.is_none() {
                            model.clear_solution();
                        }
                        let _ = tx.send((index, result));
                    });
                }
                for (index, model) in queue {
                    model.clear_solution();
                    let _ = tx.send((index, BatchResult::interrupted()));
                }
            });

            // collector: runs on the calling thread until every model reported
            let mut pending = n;
            let mut deadline = deadline;
            while pending > 0 {
                let received = match deadline {
                    Some(d) => rx.recv_deadline(d),
                    None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                };
                let (index, result) = match received {
                    Ok(msg) => msg,
                    Err(RecvTimeoutError::Timeout) => {
                        debug!(elapsed = ?started.elapsed(), "batch time limit reached");
                        cancel(Cancel::Deadline);
                        deadline = None;
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                };
                pending -= 1;

                match &result.status {
                    BatchStatus::Failed(reason) => warn!(model = index, %reason, "model failed"),
                    status => debug!(model = index, %status, "model finished"),
                }
                if race && !stop.load(Ordering::Acquire) && result.status.is_conclusive() {
                    debug!(model = index, "conclusive result, cancelling remaining models");
                    cancel(Cancel::Race);
                }
                results[index] = Some(result);
            }
        });

        debug!(elapsed = ?started.elapsed(), "batch finished");
        results
            .into_iter()
            .map(|r| r.unwrap_or_else(BatchResult::interrupted))
            .collect()
    }
}

/// Solves `models` with the solver held by `env`.  See [`BatchScheduler`].
///
/// Fails only if `thread_pool_size` is zero.
pub fn solve_batch<T, S>(
    env: &Environment<S>,
    models: &mut [Model<T>],
    thread_pool_size: usize,
    race: bool,
    time_limit: Option<Duration>,
) -> Result<Vec<BatchResult<T>>, SettingsError>
where
    T: FloatT,
    S: Solver<T>,
{
    let settings = BatchSettings {
        thread_pool_size,
        race,
        time_limit,
    };
    let scheduler = BatchScheduler::new(env, settings)?;
    Ok(scheduler.solve_batch(models))
}

// After the time limit every late solve counts as interrupted.  After a
// race was won only conclusive late results are kept.
fn classify<T: FloatT>(outcome: Outcome<T>, cancelled: Option<Cancel>) -> BatchResult<T> {
    match outcome {
        Outcome::Solved(solution) => match cancelled {
            Some(Cancel::Deadline) => BatchResult::interrupted(),
            Some(Cancel::Race) if !solution.status.is_conclusive() => BatchResult::interrupted(),
            _ => BatchResult {
                status: BatchStatus::Completed(solution.status),
                solution: Some(solution),
            },
        },
        Outcome::Error(ModelError::Solve(e)) if e.is_interrupted() => BatchResult::interrupted(),
        Outcome::Error(e) => BatchResult::failed(e.to_string()),
        Outcome::Panicked(msg) => BatchResult::failed(format!("solver panicked: {}", msg)),
        Outcome::Invalid(e) => BatchResult::failed(format!("invalid model: {}", e)),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
