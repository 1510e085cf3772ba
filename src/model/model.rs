use super::acc::{Acc, ConicConstraintSet};
use super::afe::AffineExpressionStore;
use super::constraints::{check_lengths, ConstraintStore, SparseRow};
use super::djc::{DisjunctiveConstraintSet, Djc, DomainMembership};
use super::domain::{Domain, DomainHandle, DomainKind, DomainRegistry, ModelId};
use super::psd::SemidefiniteBlockStore;
use super::variables::VariableStore;
use super::*;
use crate::algebra::{triangular_number, FloatT, SparseVector};
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::solver::{Callback, Interrupt, ProgressInfo, SolveContext, SolveError, Solver, SolverCallbacks};
use crate::timers::{timeit, Timers};
use std::sync::Arc;

/// Direction of optimization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

/// An affine conic optimization model.
///
/// The model is
///
/// ```text
/// min/max   cᵀx + Σₖ⟨C̄ₖ, X̄ₖ⟩ + c_fix
/// s.t.      lc ≤ A x ≤ uc
///           lx ≤ x ≤ ux
///           F x + Σ⟨F̄, X̄⟩ + g  bound to domains by ACCs and DJCs
///           X̄ₖ ⪰ 0
/// ```
///
/// All items are appended and addressed by dense indices, apart from
/// domains which are addressed through model-scoped [`DomainHandle`]s.
/// Every builder call either succeeds or leaves the model unchanged.
/// References to affine rows and variables that do not exist yet are
/// allowed where noted and are checked by [`validate`](Model::validate).
///
/// Cloning produces an independent deep copy with its own identity.
#[derive(Debug)]
pub struct Model<T: FloatT = f64> {
    name: Option<String>,
    pub(crate) variables: VariableStore<T>,
    pub(crate) constraints: ConstraintStore<T>,
    pub(crate) afe: AffineExpressionStore<T>,
    pub(crate) domains: DomainRegistry<T>,
    pub(crate) accs: ConicConstraintSet,
    pub(crate) djcs: DisjunctiveConstraintSet,
    pub(crate) psd: SemidefiniteBlockStore<T>,
    pub(crate) sense: ObjectiveSense,
    pub(crate) c: Vec<T>,
    pub(crate) c_fix: T,

    /// settings passed to the solver on every solve
    pub settings: ModelSettings<T>,

    stream: PrintTarget,
    callbacks: SolverCallbacks,
    solution: Option<Solution<T>>,
}

impl<T: FloatT> Default for Model<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FloatT> Clone for Model<T> {
    fn clone(&self) -> Self {
        let id = ModelId::next();
        Self {
            name: self.name.clone(),
            variables: self.variables.clone(),
            constraints: self.constraints.clone(),
            afe: self.afe.clone(),
            domains: self.domains.fork(id),
            accs: self.accs.clone(),
            djcs: self.djcs.clone(),
            psd: self.psd.clone(),
            sense: self.sense,
            c: self.c.clone(),
            c_fix: self.c_fix,
            settings: self.settings.clone(),
            stream: self.stream.duplicate(),
            callbacks: self.callbacks.clone(),
            solution: self.solution.clone(),
        }
    }
}

impl<T: FloatT> Model<T> {
    pub fn new() -> Self {
        Self {
            name: None,
            variables: VariableStore::default(),
            constraints: ConstraintStore::default(),
            afe: AffineExpressionStore::default(),
            domains: DomainRegistry::new(ModelId::next()),
            accs: ConicConstraintSet::default(),
            djcs: DisjunctiveConstraintSet::default(),
            psd: SemidefiniteBlockStore::default(),
            sense: ObjectiveSense::Minimize,
            c: Vec::new(),
            c_fix: T::zero(),
            settings: ModelSettings::default(),
            stream: PrintTarget::default(),
            callbacks: SolverCallbacks::default(),
            solution: None,
        }
    }

    pub fn with_name(name: &str) -> Self {
        let mut model = Self::new();
        model.name = Some(name.to_string());
        model
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    pub fn id(&self) -> ModelId {
        self.domains.owner()
    }

    /// Current size of every index space.
    pub fn counts(&self) -> IndexAllocator {
        IndexAllocator {
            variables: self.variables.len(),
            constraints: self.constraints.len(),
            afe_rows: self.afe.row_count(),
            psd_blocks: self.psd.len(),
            domains: self.domains.len(),
            accs: self.accs.len(),
            djcs: self.djcs.len(),
        }
    }

    // ---------------------------------
    // variables
    // ---------------------------------

    /// Appends `n` free continuous variables and returns the index of the
    /// first.
    pub fn append_variables(&mut self, n: usize) -> usize {
        let first = self.variables.append(n);
        self.c.resize(self.variables.len(), T::zero());
        first
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn set_variable_bound(&mut self, j: usize, key: BoundKey, lower: T, upper: T) -> Result<(), ModelError> {
        self.variables.set_bound(j, key, lower, upper)
    }

    pub fn set_variable_bounds_slice(
        &mut self,
        first: usize,
        keys: &[BoundKey],
        lower: &[T],
        upper: &[T],
    ) -> Result<(), ModelError> {
        self.variables.set_bounds_slice(first, keys, lower, upper)
    }

    pub fn set_variable_bounds_const(
        &mut self,
        first: usize,
        count: usize,
        key: BoundKey,
        lower: T,
        upper: T,
    ) -> Result<(), ModelError> {
        self.variables
            .set_bounds_const(first, count, key, lower, upper)
    }

    pub fn variable_bound(&self, j: usize) -> Result<Bound<T>, ModelError> {
        self.variables.bound(j).copied()
    }

    pub fn set_integer(&mut self, j: usize, flag: bool) -> Result<(), ModelError> {
        self.variables.set_integer(j, flag)
    }

    pub fn is_integer(&self, j: usize) -> Result<bool, ModelError> {
        self.variables.check(j)?;
        Ok(self.variables.integer[j])
    }

    pub fn set_variable_name(&mut self, j: usize, name: &str) -> Result<(), ModelError> {
        self.variables.set_name(j, name)
    }

    pub fn variable_name(&self, j: usize) -> Result<Option<&str>, ModelError> {
        self.variables.check(j)?;
        Ok(self.variables.names[j].as_deref())
    }

    // ---------------------------------
    // linear constraints
    // ---------------------------------

    /// Appends `n` free empty constraints and returns the index of the first.
    pub fn append_constraints(&mut self, n: usize) -> usize {
        self.constraints.append(n)
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Replaces the coefficients of constraint `i`.
    pub fn put_arow(&mut self, i: usize, vars: &[usize], vals: &[T]) -> Result<(), ModelError> {
        self.constraints.put_row(i, vars, vals)
    }

    /// Sets a single coefficient, overwriting any previous value.
    pub fn put_aij(&mut self, i: usize, j: usize, value: T) -> Result<(), ModelError> {
        self.constraints.put_aij(i, j, value)
    }

    pub fn put_aij_list(&mut self, cons: &[usize], vars: &[usize], vals: &[T]) -> Result<(), ModelError> {
        self.constraints.put_aij_list(cons, vars, vals)
    }

    pub fn constraint_row(&self, i: usize) -> Result<&SparseRow<T>, ModelError> {
        self.constraints.check(i)?;
        Ok(&self.constraints.rows[i])
    }

    pub fn set_constraint_bound(&mut self, i: usize, key: BoundKey, lower: T, upper: T) -> Result<(), ModelError> {
        self.constraints.set_bound(i, key, lower, upper)
    }

    pub fn set_constraint_bounds_slice(
        &mut self,
        first: usize,
        keys: &[BoundKey],
        lower: &[T],
        upper: &[T],
    ) -> Result<(), ModelError> {
        self.constraints
            .set_bounds_slice(first, keys, lower, upper)
    }

    pub fn constraint_bound(&self, i: usize) -> Result<Bound<T>, ModelError> {
        self.constraints.check(i)?;
        Ok(self.constraints.bounds[i])
    }

    pub fn set_constraint_name(&mut self, i: usize, name: &str) -> Result<(), ModelError> {
        self.constraints.set_name(i, name)
    }

    pub fn constraint_name(&self, i: usize) -> Result<Option<&str>, ModelError> {
        self.constraints.check(i)?;
        Ok(self.constraints.names[i].as_deref())
    }

    // ---------------------------------
    // objective
    // ---------------------------------

    pub fn set_objective_sense(&mut self, sense: ObjectiveSense) {
        self.sense = sense;
    }

    pub fn objective_sense(&self) -> ObjectiveSense {
        self.sense
    }

    pub fn put_cj(&mut self, j: usize, value: T) -> Result<(), ModelError> {
        self.variables.check(j)?;
        self.c[j] = value;
        Ok(())
    }

    pub fn put_c_list(&mut self, vars: &[usize], vals: &[T]) -> Result<(), ModelError> {
        check_lengths("objective coefficients", vars.len(), vals.len())?;
        for &j in vars {
            self.variables.check(j)?;
        }
        for (&j, &v) in vars.iter().zip(vals) {
            self.c[j] = v;
        }
        Ok(())
    }

    pub fn set_c_fix(&mut self, value: T) {
        self.c_fix = value;
    }

    /// dense linear objective, one entry per variable
    pub fn objective_coefficients(&self) -> &[T] {
        &self.c
    }

    pub fn objective_constant(&self) -> T {
        self.c_fix
    }

    // ---------------------------------
    // affine expressions
    // ---------------------------------

    /// Appends `n` affine rows with no entries and zero constant.
    pub fn append_afe_rows(&mut self, n: usize) -> usize {
        self.afe.append_rows(n)
    }

    pub fn num_afe_rows(&self) -> usize {
        self.afe.row_count()
    }

    /// Adds `value` to `F[row, var]`.  Neither index needs to exist yet.
    pub fn set_afe_entry(&mut self, row: usize, var: usize, value: T) {
        self.afe.set_entry(row, var, value)
    }

    /// Bulk form of [`set_afe_entry`](Self::set_afe_entry); duplicates
    /// accumulate.
    pub fn set_afe_entries(&mut self, rows: &[usize], vars: &[usize], vals: &[T]) -> Result<(), ModelError> {
        self.afe.set_entries_bulk(rows, vars, vals)
    }

    /// Replaces all variable entries of an existing row.
    pub fn set_afe_row(&mut self, row: usize, vars: &[usize], vals: &[T]) -> Result<(), ModelError> {
        self.afe.set_row(row, vars, vals)
    }

    pub fn set_afe_constant(&mut self, row: usize, value: T) -> Result<(), ModelError> {
        self.afe.set_constant(row, value)
    }

    pub fn set_afe_constants(&mut self, start: usize, values: &[T]) -> Result<(), ModelError> {
        self.afe.set_constant_slice(start, values)
    }

    pub fn afe_constant(&self, row: usize) -> Result<T, ModelError> {
        self.afe.constant(row)
    }

    pub fn afe_nnz(&self) -> usize {
        self.afe.nnz()
    }

    /// raw `(row, var, value)` triplets of F in insertion order
    pub fn afe_triplets(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.afe.triplets()
    }

    /// Variable part of one affine row with duplicates summed.  For
    /// inspection only.
    pub fn materialize_afe_row(&self, row: usize) -> Result<SparseVector<T>, ModelError> {
        self.afe.materialize_row(row, self.variables.len())
    }

    // ---------------------------------
    // domains
    // ---------------------------------

    pub fn append_domain(&mut self, kind: DomainKind<T>, dim: usize) -> Result<DomainHandle, ModelError> {
        let domain = Domain::new(kind, dim)?;
        Ok(self.domains.append(domain))
    }

    pub fn append_real_domain(&mut self, dim: usize) -> Result<DomainHandle, ModelError> {
        self.append_domain(DomainKind::Real, dim)
    }

    pub fn append_zero_domain(&mut self, dim: usize) -> Result<DomainHandle, ModelError> {
        self.append_domain(DomainKind::Zero, dim)
    }

    pub fn append_nonnegative_domain(&mut self, dim: usize) -> Result<DomainHandle, ModelError> {
        self.append_domain(DomainKind::NonNegative, dim)
    }

    pub fn append_nonpositive_domain(&mut self, dim: usize) -> Result<DomainHandle, ModelError> {
        self.append_domain(DomainKind::NonPositive, dim)
    }

    pub fn append_quadratic_domain(&mut self, dim: usize) -> Result<DomainHandle, ModelError> {
        self.append_domain(DomainKind::Quadratic, dim)
    }

    pub fn append_rotated_quadratic_domain(&mut self, dim: usize) -> Result<DomainHandle, ModelError> {
        self.append_domain(DomainKind::RotatedQuadratic, dim)
    }

    pub fn append_primal_exp_domain(&mut self) -> Result<DomainHandle, ModelError> {
        self.append_domain(DomainKind::PrimalExponential, 3)
    }

    pub fn append_dual_exp_domain(&mut self) -> Result<DomainHandle, ModelError> {
        self.append_domain(DomainKind::DualExponential, 3)
    }

    /// Power cone of dimension `dim` with `dim - 1` positive exponents.
    /// The exponents are stored normalized to sum to one.
    pub fn append_primal_power_domain(&mut self, dim: usize, alpha: &[T]) -> Result<DomainHandle, ModelError> {
        self.append_domain(DomainKind::PrimalPower(alpha.to_vec()), dim)
    }

    pub fn append_dual_power_domain(&mut self, dim: usize, alpha: &[T]) -> Result<DomainHandle, ModelError> {
        self.append_domain(DomainKind::DualPower(alpha.to_vec()), dim)
    }

    /// Scaled vectorized PSD cone.  `dim` must be `k(k+1)/2` for some
    /// matrix order `k ≥ 1`.
    pub fn append_svec_psd_domain(&mut self, dim: usize) -> Result<DomainHandle, ModelError> {
        self.append_domain(DomainKind::SvecPsd, dim)
    }

    pub fn domain(&self, handle: DomainHandle) -> Result<&Domain<T>, ModelError> {
        let index = self.domains.resolve(handle)?;
        self.domains
            .get(index)
            .ok_or(ModelError::UnknownHandle(HandleKind::Domain(index)))
    }

    pub fn num_domains(&self) -> usize {
        self.domains.len()
    }

    fn resolve_domain(&self, handle: DomainHandle) -> Result<(usize, &Domain<T>), ModelError> {
        let index = self.domains.resolve(handle)?;
        let domain = self
            .domains
            .get(index)
            .ok_or(ModelError::UnknownHandle(HandleKind::Domain(index)))?;
        Ok((index, domain))
    }

    // ---------------------------------
    // conic constraints
    // ---------------------------------

    /// Binds existing affine rows to a domain.  The number of rows must be
    /// a positive multiple of the domain dimension; a multiple binds the
    /// rows to a product of copies of the domain.
    ///
    /// `weights` has no effect.  If given, its length must match `rows`.
    pub fn append_acc(
        &mut self,
        domain: DomainHandle,
        rows: &[usize],
        weights: Option<&[T]>,
    ) -> Result<usize, ModelError> {
        let row_count = self.afe.row_count();
        let (index, domain) = self.resolve_domain(domain)?;
        let domain = domain.clone();
        self.accs
            .append_acc(index, &domain, rows, weights, row_count)
    }

    /// Appends `count` constraints, each binding the next `dim` rows from
    /// `first_row` on.  Returns the index of the first constraint.
    pub fn append_acc_sequence(
        &mut self,
        domain: DomainHandle,
        first_row: usize,
        count: usize,
    ) -> Result<usize, ModelError> {
        let row_count = self.afe.row_count();
        let (index, domain) = self.resolve_domain(domain)?;
        let dim = domain.dim();
        self.accs
            .append_sequence(index, dim, first_row, count, row_count)
    }

    pub fn acc(&self, i: usize) -> Result<&Acc, ModelError> {
        self.accs.get(i)
    }

    /// domain bound by conic constraint `i`
    pub fn acc_domain(&self, i: usize) -> Result<&Domain<T>, ModelError> {
        let acc = self.accs.get(i)?;
        self.domains
            .get(acc.domain)
            .ok_or(ModelError::UnknownHandle(HandleKind::Domain(acc.domain)))
    }

    pub fn num_accs(&self) -> usize {
        self.accs.len()
    }

    // ---------------------------------
    // disjunctive constraints
    // ---------------------------------

    /// Appends the disjunction `term₀ ∨ term₁ ∨ …`, where each term is the
    /// conjunction of its domain memberships.
    pub fn append_disjunction(&mut self, terms: &[Vec<DomainMembership>]) -> Result<usize, ModelError> {
        let row_count = self.afe.row_count();
        self.djcs.append(terms, &self.domains, row_count)
    }

    /// Flattened form of [`append_disjunction`](Self::append_disjunction).
    pub fn append_djc_flat(
        &mut self,
        domains: &[DomainHandle],
        afe_rows: &[usize],
        term_sizes: &[usize],
    ) -> Result<usize, ModelError> {
        let row_count = self.afe.row_count();
        self.djcs
            .append_flat(domains, afe_rows, term_sizes, &self.domains, row_count)
    }

    pub fn djc(&self, i: usize) -> Result<&Djc, ModelError> {
        self.djcs.get(i)
    }

    pub fn num_djcs(&self) -> usize {
        self.djcs.len()
    }

    // ---------------------------------
    // semidefinite blocks
    // ---------------------------------

    /// Appends one PSD matrix variable per entry of `dims`.
    pub fn append_psd_blocks(&mut self, dims: &[usize]) -> Result<usize, ModelError> {
        self.psd.append_blocks(dims)
    }

    pub fn num_psd_blocks(&self) -> usize {
        self.psd.len()
    }

    pub fn psd_block_dim(&self, block: usize) -> Result<usize, ModelError> {
        self.psd.dim(block)
    }

    /// Objective entries `C̄[block](i,j)` with `i ≥ j`.
    pub fn put_barc_triplets(
        &mut self,
        blocks: &[usize],
        i: &[usize],
        j: &[usize],
        vals: &[T],
    ) -> Result<(), ModelError> {
        self.psd.put_barc_triplets(blocks, i, j, vals)
    }

    /// Affine entries `F̄[row, block](i,j)` with `i ≥ j`.  Rows are checked
    /// by [`validate`](Self::validate).
    pub fn put_barf_triplets(
        &mut self,
        rows: &[usize],
        blocks: &[usize],
        i: &[usize],
        j: &[usize],
        vals: &[T],
    ) -> Result<(), ModelError> {
        self.psd.put_barf_triplets(rows, blocks, i, j, vals)
    }

    pub fn barc_entries(&self) -> &[BarcEntry<T>] {
        &self.psd.barc
    }

    pub fn barf_entries(&self) -> &[BarfEntry<T>] {
        &self.psd.barf
    }

    // ---------------------------------
    // validation
    // ---------------------------------

    /// Cross-checks every stored reference.  Runs before every solve.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.settings.validate()?;

        let nvars = self.variables.len();
        let nrows = self.afe.row_count();

        self.afe.check_indices(nvars)?;
        self.constraints.check_variables(nvars)?;
        self.psd.check_entries()?;
        self.psd.check_rows(nrows)?;

        for acc in self.accs.iter() {
            let domain = self
                .domains
                .get(acc.domain)
                .ok_or(ModelError::UnknownHandle(HandleKind::Domain(acc.domain)))?;
            if acc.afe_rows.is_empty() || acc.afe_rows.len() % domain.dim() != 0 {
                return Err(ModelError::DimensionMismatch {
                    what: "conic constraint rows",
                    expected: domain.dim(),
                    found: acc.afe_rows.len(),
                });
            }
            if let Some(&r) = acc.afe_rows.iter().find(|&&r| r >= nrows) {
                return Err(ModelError::UnknownHandle(HandleKind::AfeRow(r)));
            }
        }

        for djc in self.djcs.iter() {
            let sizes = djc.term_sizes();
            if sizes.is_empty() {
                return Err(ModelError::EmptyDisjunction);
            }
            if let Some(t) = sizes.iter().position(|&n| n == 0) {
                return Err(ModelError::EmptyTerm(t));
            }
            check_lengths(
                "disjunction term sizes",
                djc.membership_count(),
                sizes.iter().sum(),
            )?;
            for m in djc.memberships() {
                let domain = self
                    .domains
                    .get(m.domain)
                    .ok_or(ModelError::UnknownHandle(HandleKind::Domain(m.domain)))?;
                check_lengths("disjunction membership rows", domain.dim(), m.afe_rows.len())?;
                if let Some(&r) = m.afe_rows.iter().find(|&&r| r >= nrows) {
                    return Err(ModelError::UnknownHandle(HandleKind::AfeRow(r)));
                }
            }
        }
        Ok(())
    }

    // ---------------------------------
    // point evaluation
    // ---------------------------------

    fn check_point(&self, x: &[T], barx: &[Vec<T>]) -> Result<(), ModelError> {
        check_lengths("primal values", self.variables.len(), x.len())?;
        check_lengths("semidefinite blocks", self.psd.len(), barx.len())?;
        for (&d, xk) in self.psd.dims.iter().zip(barx) {
            check_lengths("semidefinite block values", triangular_number(d), xk.len())?;
        }
        Ok(())
    }

    /// Values `F x + Σ⟨F̄, X̄⟩ + g` of every affine row at a point.
    /// `barx[k]` is the packed lower triangle of block `k`.
    pub fn evaluate_afe_rows(&self, x: &[T], barx: &[Vec<T>]) -> Result<Vec<T>, ModelError> {
        self.validate()?;
        self.check_point(x, barx)?;
        let mut values = self.afe.evaluate(x);
        self.psd.accumulate_rows(barx, &mut values);
        Ok(values)
    }

    /// Activity of the rows of conic constraint `i` at the stored solution.
    pub fn evaluate_acc(&self, i: usize) -> Result<Vec<T>, ModelError> {
        let acc = self.accs.get(i)?;
        let solution = self.solution()?;
        let barx = self.solution_barx(solution);
        let values = self.evaluate_afe_rows(&solution.x, &barx)?;
        Ok(acc.afe_rows.iter().map(|&r| values[r]).collect())
    }

    /// Tests conic constraint `i` at a point, within `settings.tol_membership`.
    pub fn acc_satisfied(&self, i: usize, x: &[T], barx: &[Vec<T>]) -> Result<bool, ModelError> {
        let acc = self.accs.get(i)?;
        let values = self.evaluate_afe_rows(x, barx)?;
        let domain = self.acc_domain(i)?;
        Ok(acc.is_satisfied(domain, &values, self.settings.tol_membership))
    }

    /// Tests disjunction `i` at a point: true if every membership of at
    /// least one term holds within `tol`.
    pub fn djc_satisfied(&self, i: usize, x: &[T], barx: &[Vec<T>], tol: T) -> Result<bool, ModelError> {
        let djc = self.djcs.get(i)?;
        let values = self.evaluate_afe_rows(x, barx)?;
        Ok(djc.is_satisfied(&values, &self.domains, tol))
    }

    // solutions may leave barx empty when there are no blocks
    fn solution_barx(&self, solution: &Solution<T>) -> Vec<Vec<T>> {
        if solution.barx.is_empty() {
            self.psd
                .packed_lengths()
                .into_iter()
                .map(|n| vec![T::zero(); n])
                .collect()
        } else {
            solution.barx.clone()
        }
    }

    // ---------------------------------
    // solve
    // ---------------------------------

    /// Validates the model and hands it to `solver`.  The returned
    /// solution is stored in the model and its status returned.  On error
    /// the model holds no solution.
    pub fn solve<S>(&mut self, solver: &S) -> Result<SolutionStatus, ModelError>
    where
        S: Solver<T> + ?Sized,
    {
        let threads = self.settings.requested_threads();
        self.solve_with(solver, &Interrupt::new(), threads)
    }

    pub(crate) fn solve_with<S>(
        &mut self,
        solver: &S,
        interrupt: &Interrupt,
        threads: usize,
    ) -> Result<SolutionStatus, ModelError>
    where
        S: Solver<T> + ?Sized,
    {
        self.solution = None;
        let mut timers = Timers::default();

        timeit! {timers => "validate"; {
            self.validate()?;
        }}

        // the solver reads the model while writing to its stream
        let mut stream = std::mem::take(&mut self.stream);
        let result = self.run_solver(solver, interrupt, threads, &mut stream, &mut timers);

        if self.settings.verbose {
            let _ = info_print::print_footer(&mut stream, &result, &timers);
        }
        self.stream = stream;

        let solution = result?;
        let status = solution.status;
        self.solution = Some(solution);
        Ok(status)
    }

    fn run_solver<S>(
        &self,
        solver: &S,
        interrupt: &Interrupt,
        threads: usize,
        stream: &mut PrintTarget,
        timers: &mut Timers,
    ) -> Result<Solution<T>, ModelError>
    where
        S: Solver<T> + ?Sized,
    {
        if self.settings.verbose {
            let _ = info_print::print_header(stream, self, solver.name(), threads);
        }

        let mut ctx = SolveContext::new(interrupt, &self.callbacks, stream, threads);
        let result;
        timeit! {timers => "solve"; {
            result = solver.solve(self, &mut ctx);
        }}
        let mut solution = result?;

        self.check_solution_shape(&solution)?;
        if solution.solve_time.is_zero() {
            solution.solve_time = timers.elapsed("solve");
        }
        Ok(solution)
    }

    fn check_solution_shape(&self, solution: &Solution<T>) -> Result<(), SolveError> {
        let bad = |what: &str, expected: usize, found: usize| {
            SolveError::new(
                SolveError::BAD_SOLUTION,
                format!("solution has {} {}, model expects {}", found, what, expected),
            )
        };

        let n = self.variables.len();
        if solution.x.len() != n {
            return Err(bad("primal values", n, solution.x.len()));
        }
        // dual parts may be left empty by solvers that do not compute them
        let m = self.constraints.len();
        if !solution.y.is_empty() && solution.y.len() != m {
            return Err(bad("constraint duals", m, solution.y.len()));
        }
        let nacc = self.acc_row_total();
        if !solution.acc_doty.is_empty() && solution.acc_doty.len() != nacc {
            return Err(bad("conic duals", nacc, solution.acc_doty.len()));
        }
        if !solution.barx.is_empty() {
            let lens = self.psd.packed_lengths();
            if solution.barx.len() != lens.len() {
                return Err(bad("semidefinite blocks", lens.len(), solution.barx.len()));
            }
            for (xk, &len) in solution.barx.iter().zip(&lens) {
                if xk.len() != len {
                    return Err(bad("semidefinite block values", len, xk.len()));
                }
            }
        }
        Ok(())
    }

    /// total number of rows over all conic constraints
    pub fn acc_row_total(&self) -> usize {
        self.accs.iter().map(|acc| acc.afe_rows.len()).sum()
    }

    // ---------------------------------
    // solution access
    // ---------------------------------

    pub fn solution(&self) -> Result<&Solution<T>, ModelError> {
        self.solution.as_ref().ok_or(ModelError::SolutionUnavailable)
    }

    pub fn clear_solution(&mut self) {
        self.solution = None;
    }

    pub fn solution_status(&self) -> Result<SolutionStatus, ModelError> {
        Ok(self.solution()?.status)
    }

    pub fn problem_status(&self) -> Result<ProblemStatus, ModelError> {
        Ok(self.solution()?.problem_status)
    }

    /// Primal values, one per variable.  For a dual infeasibility
    /// certificate these are the certificate.
    pub fn primal_values(&self) -> Result<&[T], ModelError> {
        Ok(&self.solution()?.x)
    }

    pub fn constraint_duals(&self) -> Result<&[T], ModelError> {
        Ok(&self.solution()?.y)
    }

    /// Dual values of the rows of conic constraint `i`.
    pub fn acc_dual(&self, i: usize) -> Result<&[T], ModelError> {
        self.accs.get(i)?;
        let solution = self.solution()?;
        if solution.acc_doty.is_empty() {
            return Err(ModelError::SolutionUnavailable);
        }
        let offsets = self.accs.row_offsets();
        Ok(&solution.acc_doty[offsets[i]..offsets[i + 1]])
    }

    /// Packed lower triangle of PSD block `k`.
    pub fn psd_block_values(&self, k: usize) -> Result<&[T], ModelError> {
        self.psd.dim(k)?;
        let solution = self.solution()?;
        solution
            .barx
            .get(k)
            .map(|v| v.as_slice())
            .ok_or(ModelError::SolutionUnavailable)
    }

    /// The infeasibility certificate, if the stored solution is one.
    pub fn certificate(&self) -> Result<Option<&[T]>, ModelError> {
        Ok(self.solution()?.certificate())
    }

    pub fn primal_objective(&self) -> Result<T, ModelError> {
        Ok(self.solution()?.primal_objective)
    }

    /// `cᵀx + Σ⟨C̄, X̄⟩ + c_fix` at a point.
    pub fn objective_value(&self, x: &[T], barx: &[Vec<T>]) -> Result<T, ModelError> {
        self.check_point(x, barx)?;
        let linear = self
            .c
            .iter()
            .zip(x)
            .fold(T::zero(), |acc, (&c, &x)| acc + c * x);
        Ok(linear + self.psd.objective(barx) + self.c_fix)
    }

    // ---------------------------------
    // callbacks
    // ---------------------------------

    /// Sets a function called by the solver with progress information.
    /// The solve stops when it returns true.
    pub fn set_termination_callback(&mut self, f: fn(&ProgressInfo) -> bool) {
        self.callbacks.termination_callback = Callback::Rust(f);
    }

    /// As [`set_termination_callback`](Self::set_termination_callback),
    /// accepting a capturing closure.
    pub fn set_termination_closure<F>(&mut self, f: F)
    where
        F: Fn(&ProgressInfo) -> bool + Send + Sync + 'static,
    {
        self.callbacks.termination_callback = Callback::Closure(Arc::new(f));
    }

    pub fn unset_termination_callback(&mut self) {
        self.callbacks.termination_callback = Callback::None;
    }
}

impl<T: FloatT> ConfigurablePrintTarget for Model<T> {
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn std::io::Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_sink(&mut self) {
        self.stream.print_to_sink()
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}
