use crate::algebra::FloatT;
use std::time::Duration;

/// Status of a solution returned by a solver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolutionStatus {
    /// No solution information is available
    #[default]
    Unknown,
    /// Primal and dual solutions are optimal
    Optimal,
    /// Best integer solution found is proven optimal
    IntegerOptimal,
    /// A feasible but not proven optimal primal point
    PrimalFeasible,
    /// The dual values are a certificate of primal infeasibility
    PrimalInfeasibleCertificate,
    /// The primal values are a certificate of dual infeasibility
    DualInfeasibleCertificate,
}

impl SolutionStatus {
    /// Optimal, or a certificate of infeasibility.  A batch race ends at
    /// the first conclusive solution.
    pub fn is_conclusive(&self) -> bool {
        matches!(
            *self,
            SolutionStatus::Optimal
                | SolutionStatus::IntegerOptimal
                | SolutionStatus::PrimalInfeasibleCertificate
                | SolutionStatus::DualInfeasibleCertificate
        )
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(
            *self,
            SolutionStatus::PrimalInfeasibleCertificate | SolutionStatus::DualInfeasibleCertificate
        )
    }
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Feasibility status of the problem as a whole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProblemStatus {
    #[default]
    Unknown,
    PrimalAndDualFeasible,
    PrimalFeasible,
    PrimalInfeasible,
    DualInfeasible,
    PrimalAndDualInfeasible,
    IllPosed,
}

impl std::fmt::Display for ProblemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Results returned by a solver for one model.
///
/// `x` holds one value per variable, `y` one dual value per linear
/// constraint, `acc_doty` the duals of all conic constraints concatenated
/// in constraint order, and `barx[k]` the packed lower triangle of PSD
/// block `k` (no √2 scaling).  When the status is an infeasibility
/// certificate, `x` (dual infeasible) or `y` and `acc_doty` (primal
/// infeasible) hold the certificate instead.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution<T = f64> {
    pub status: SolutionStatus,
    pub problem_status: ProblemStatus,
    pub x: Vec<T>,
    pub y: Vec<T>,
    pub acc_doty: Vec<T>,
    pub barx: Vec<Vec<T>>,
    pub primal_objective: T,
    pub dual_objective: T,
    pub solve_time: Duration,
    pub iterations: u32,
}

impl<T: FloatT> Solution<T> {
    /// A solution with the given status and primal values, and every other
    /// field empty or zero.
    pub fn new(status: SolutionStatus, problem_status: ProblemStatus, x: Vec<T>) -> Self {
        Self {
            status,
            problem_status,
            x,
            y: Vec::new(),
            acc_doty: Vec::new(),
            barx: Vec::new(),
            primal_objective: T::nan(),
            dual_objective: T::nan(),
            solve_time: Duration::ZERO,
            iterations: 0,
        }
    }

    /// The certificate vector for an infeasible status: the primal
    /// values for dual infeasibility, the constraint duals for primal
    /// infeasibility.
    pub fn certificate(&self) -> Option<&[T]> {
        match self.status {
            SolutionStatus::DualInfeasibleCertificate => Some(&self.x),
            SolutionStatus::PrimalInfeasibleCertificate => Some(&self.y),
            _ => None,
        }
    }
}

#[test]
fn test_solution_certificate() {
    let mut sol = Solution::new(
        SolutionStatus::PrimalInfeasibleCertificate,
        ProblemStatus::PrimalInfeasible,
        vec![0.0; 2],
    );
    sol.y = vec![1.0, -1.0];
    assert_eq!(sol.certificate(), Some(&[1.0, -1.0][..]));
    assert!(sol.status.is_conclusive());

    sol.status = SolutionStatus::PrimalFeasible;
    assert_eq!(sol.certificate(), None);
    assert!(!sol.status.is_conclusive());
    assert!(!SolutionStatus::Unknown.is_conclusive());
}
