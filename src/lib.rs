//! __conic-model__ is a builder for sparse affine conic optimization models,
//! together with a scheduler that solves many such models concurrently
//! under a shared thread budget.
//!
//! A [`Model`](model::Model) describes the problem
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize (or maximize)} & c^T x + \sum_k \langle \bar C_k, \bar X_k \rangle + c^f \\\\\[2ex\]
//!  \text{subject to} & l^c \le A x \le u^c \\\\\[1ex\]
//!         & l^x \le x \le u^x \\\\\[1ex\]
//!         & F x + \sum_k \langle \bar F_k, \bar X_k \rangle + g \in \mathcal{D} \\\\\[1ex\]
//!         & \bar X_k \succeq 0
//!  \end{array}
//! $$
//!
//! where the rows of the affine expression $F x + g$ are bound to cone
//! domains by affine conic constraints (ACCs), or to disjunctions of
//! conjunctions of domains by disjunctive constraints (DJCs).  Supported
//! domains are the real, zero, nonnegative and nonpositive orthants, the
//! quadratic and rotated quadratic cones, the primal and dual exponential
//! and power cones, and the scaled vectorized semidefinite cone.
//!
//! The model never forms a dense matrix.  All data is held as sparse
//! triplets and checked eagerly, and every builder call either succeeds or
//! leaves the model as it was.
//!
//! No numerical method is included.  Models are handed to an external
//! solver through the [`Solver`](solver::Solver) trait, either one at a
//! time with [`Model::solve`](model::Model::solve), or in bulk with
//! [`BatchScheduler`](batch::BatchScheduler).
//!
//! # Example
//!
//! ```
//! use conic_model::model::*;
//!
//! // minimize x0 subject to x0 >= ||(x1, x2)||, x1 = 3, x2 = 4
//! let mut model: Model = Model::new();
//! let x = model.append_variables(3);
//! model.set_variable_bound(x + 1, BoundKey::Fixed, 3.0, 3.0).unwrap();
//! model.set_variable_bound(x + 2, BoundKey::Fixed, 4.0, 4.0).unwrap();
//! model.put_cj(x, 1.0).unwrap();
//!
//! let rows = model.append_afe_rows(3);
//! model
//!     .set_afe_entries(&[rows, rows + 1, rows + 2], &[x, x + 1, x + 2], &[1.0; 3])
//!     .unwrap();
//! let quad = model.append_quadratic_domain(3).unwrap();
//! model.append_acc(quad, &[rows, rows + 1, rows + 2], None).unwrap();
//!
//! assert!(model.validate().is_ok());
//! assert!(model.acc_satisfied(0, &[5.0, 3.0, 4.0], &[]).unwrap());
//! ```
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod batch;
pub mod io;
pub mod model;
pub mod solver;
pub(crate) mod timers;
pub(crate) mod utils;

pub use crate::utils::infbounds::{default_infinity, get_infinity, set_infinity};

/// Crate version string
pub fn version() -> &'static str {
    VERSION
}
