//! The affine conic model builder.
//!
//! A [`Model`] is assembled by appending variables, linear constraints,
//! affine expression rows, cone [domains](Domain), affine conic
//! constraints (ACCs), disjunctive constraints (DJCs) and semidefinite
//! blocks.  Every builder call is checked eagerly and leaves the model
//! unchanged on failure; [`Model::validate`] cross-checks the remaining
//! references before a solve.

mod acc;
mod afe;
mod bounds;
mod constraints;
mod djc;
mod domain;
mod error;
mod index;
mod info_print;
#[allow(clippy::module_inception)]
mod model;
mod psd;
mod settings;
mod solution;
mod variables;

#[cfg(feature = "serde")]
mod json;

pub use acc::Acc;
pub use bounds::{Bound, BoundKey};
pub use constraints::SparseRow;
pub use djc::{Djc, DomainMembership, Membership};
pub use domain::{Domain, DomainHandle, DomainKind, ModelId};
pub use error::{HandleKind, ModelError};
pub use index::{IndexAllocator, IndexCounter};
pub use model::{Model, ObjectiveSense};
pub use psd::{BarcEntry, BarfEntry};
pub use settings::{ModelSettings, ModelSettingsBuilder, SettingsError};
pub use solution::{ProblemStatus, Solution, SolutionStatus};
