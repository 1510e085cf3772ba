use super::SettingsError;
use crate::solver::SolveError;
use std::fmt;
use thiserror::Error;

/// Identifies an index or handle that was referenced but never created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Variable(usize),
    Constraint(usize),
    AfeRow(usize),
    Domain(usize),
    PsdBlock(usize),
    Acc(usize),
    Djc(usize),
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleKind::Variable(i) => write!(f, "variable {}", i),
            HandleKind::Constraint(i) => write!(f, "constraint {}", i),
            HandleKind::AfeRow(i) => write!(f, "affine row {}", i),
            HandleKind::Domain(i) => write!(f, "domain {}", i),
            HandleKind::PsdBlock(i) => write!(f, "semidefinite block {}", i),
            HandleKind::Acc(i) => write!(f, "conic constraint {}", i),
            HandleKind::Djc(i) => write!(f, "disjunctive constraint {}", i),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
/// Error type returned by model building, validation and solution access.
///
/// Every builder call that fails leaves the model exactly as it was before
/// the call.
pub enum ModelError {
    /// Array arguments of incompatible length
    #[error("dimension mismatch in {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// Bad shape parameters for a cone domain (e.g. power cone exponents)
    #[error("invalid domain parameters: {0}")]
    InvalidDomainParameters(String),
    /// A domain dimension not allowed for its kind
    #[error("invalid dimension {dim} for {kind} domain")]
    InvalidDomainDimension { kind: &'static str, dim: usize },
    /// An affine row range extending past the last appended row
    #[error("affine rows {first}..{end} exceed the {rows} rows available")]
    RowRangeExceeded {
        first: usize,
        end: usize,
        rows: usize,
    },
    /// A disjunction with no terms
    #[error("disjunction has no terms")]
    EmptyDisjunction,
    /// A disjunction term with no domain memberships
    #[error("term {0} of disjunction is empty")]
    EmptyTerm(usize),
    /// Reference to an index or handle that does not exist in this model
    #[error("unknown {0}")]
    UnknownHandle(HandleKind),
    /// Inconsistent bound values
    #[error("invalid bounds: lower {lower} and upper {upper}")]
    InvalidBounds { lower: f64, upper: f64 },
    /// A semidefinite triplet outside the lower triangle of its block
    #[error("invalid semidefinite entry ({i},{j}) for block of order {dim}")]
    InvalidPsdIndex { i: usize, j: usize, dim: usize },
    /// A solution accessor was called before a solution was stored
    #[error("no solution available")]
    SolutionUnavailable,
    /// Model settings out of range
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Failure reported by the external solver
    #[error(transparent)]
    Solve(#[from] SolveError),
}

#[test]
fn test_error_display() {
    let e = ModelError::UnknownHandle(HandleKind::AfeRow(12));
    assert_eq!(e.to_string(), "unknown affine row 12");

    let e = ModelError::RowRangeExceeded {
        first: 3,
        end: 9,
        rows: 6,
    };
    assert_eq!(e.to_string(), "affine rows 3..9 exceed the 6 rows available");

    let e: ModelError = SolveError::new(4, "license expired").into();
    assert!(e.to_string().contains("license expired"));
}
