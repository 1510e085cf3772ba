//! Bounded-concurrency solving of many independent models.
//!
//! [`BatchScheduler::solve_batch`] runs a list of models through one
//! shared [`Environment`] on scoped worker threads.  The total number of
//! solver threads in use never exceeds the pool size.  Optionally the
//! batch is raced (the first conclusive result cancels the rest) and
//! bounded by a wall clock limit.

mod budget;
mod environment;
mod scheduler;
mod settings;

pub use environment::Environment;
pub use scheduler::{solve_batch, BatchResult, BatchScheduler, BatchStatus};
pub use settings::{BatchSettings, BatchSettingsBuilder, BatchSettingsBuilderError};
