#![allow(dead_code)]

// A deterministic stand-in for a numerical solver.  Its behaviour is
// scripted through the model name, e.g. "delay=50;status=optimal".
//
//   delay=<ms>     run for roughly this long, polling for interrupts
//   sleep=<ms>     block for this long without ever polling for interrupts
//   status=<s>     optimal | integer | feasible | unknown |
//                  primal_infeasible | dual_infeasible
//   error=<code>   fail with a solver error
//   panic          panic inside the solver
//   bad_shape      return a solution with too few primal values
//
// Primal values are set to the finite lower bound of each variable, else
// the finite upper bound, else zero.

use conic_model::io::ConfigurablePrintTarget;
use conic_model::model::*;
use conic_model::solver::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct ScriptedSolver {
    active_threads: AtomicUsize,
    peak_threads: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peak_threads(&self) -> usize {
        self.peak_threads.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

struct Script {
    delay: Duration,
    sleep: Option<Duration>,
    status: SolutionStatus,
    error: Option<i32>,
    panic: bool,
    bad_shape: bool,
}

fn parse_script(name: &str) -> Script {
    let mut script = Script {
        delay: Duration::ZERO,
        sleep: None,
        status: SolutionStatus::Optimal,
        error: None,
        panic: false,
        bad_shape: false,
    };
    for item in name.split(';').map(str::trim) {
        match item.split_once('=') {
            Some(("delay", ms)) => script.delay = Duration::from_millis(ms.parse().unwrap()),
            Some(("sleep", ms)) => script.sleep = Some(Duration::from_millis(ms.parse().unwrap())),
            Some(("status", s)) => {
                script.status = match s {
                    "optimal" => SolutionStatus::Optimal,
                    "integer" => SolutionStatus::IntegerOptimal,
                    "feasible" => SolutionStatus::PrimalFeasible,
                    "primal_infeasible" => SolutionStatus::PrimalInfeasibleCertificate,
                    "dual_infeasible" => SolutionStatus::DualInfeasibleCertificate,
                    _ => SolutionStatus::Unknown,
                }
            }
            Some(("error", code)) => script.error = Some(code.parse().unwrap()),
            _ if item == "panic" => script.panic = true,
            _ if item == "bad_shape" => script.bad_shape = true,
            _ => {}
        }
    }
    script
}

fn problem_status(status: SolutionStatus) -> ProblemStatus {
    match status {
        SolutionStatus::Optimal | SolutionStatus::IntegerOptimal => ProblemStatus::PrimalAndDualFeasible,
        SolutionStatus::PrimalFeasible => ProblemStatus::PrimalFeasible,
        SolutionStatus::PrimalInfeasibleCertificate => ProblemStatus::PrimalInfeasible,
        SolutionStatus::DualInfeasibleCertificate => ProblemStatus::DualInfeasible,
        SolutionStatus::Unknown => ProblemStatus::Unknown,
    }
}

// leaves the active thread count on every exit path, including panics
struct ActiveGuard<'a> {
    solver: &'a ScriptedSolver,
    threads: usize,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.solver
            .active_threads
            .fetch_sub(self.threads, Ordering::SeqCst);
    }
}

impl Solver<f64> for ScriptedSolver {
    fn name(&self) -> &str {
        "scripted"
    }

    fn solve(&self, model: &Model<f64>, ctx: &mut SolveContext<'_>) -> Result<Solution<f64>, SolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let threads = ctx.threads();
        let now = self.active_threads.fetch_add(threads, Ordering::SeqCst) + threads;
        self.peak_threads.fetch_max(now, Ordering::SeqCst);
        let _guard = ActiveGuard {
            solver: self,
            threads,
        };

        let script = parse_script(model.name().unwrap_or(""));
        ctx.log(&format!("scripted solve on {} threads", threads))
            .map_err(|e| SolveError::new(1, e.to_string()))?;

        let mut iteration = 0;
        if let Some(sleep) = script.sleep {
            std::thread::sleep(sleep);
        } else {
            while ctx.elapsed() < script.delay {
                iteration += 1;
                ctx.progress(&ProgressInfo {
                    iteration,
                    elapsed: ctx.elapsed(),
                    ..Default::default()
                })?;
                std::thread::sleep(Duration::from_millis(1));
            }
            ctx.check_interrupt()?;
        }

        if script.panic {
            panic!("scripted panic");
        }
        if let Some(code) = script.error {
            return Err(SolveError::new(code, "scripted failure"));
        }

        let mut x: Vec<f64> = (0..model.num_variables())
            .map(|j| {
                let b = model.variable_bound(j).unwrap();
                if b.lower.is_finite() {
                    b.lower
                } else if b.upper.is_finite() {
                    b.upper
                } else {
                    0.0
                }
            })
            .collect();
        if script.bad_shape {
            x.pop();
        }

        let barx: Vec<Vec<f64>> = (0..model.num_psd_blocks())
            .map(|k| {
                let d = model.psd_block_dim(k).unwrap();
                vec![0.0; d * (d + 1) / 2]
            })
            .collect();

        let mut solution = Solution::new(script.status, problem_status(script.status), x);
        solution.y = (0..model.num_constraints()).map(|i| i as f64).collect();
        solution.acc_doty = (0..model.acc_row_total()).map(|i| -(i as f64)).collect();
        if !script.bad_shape {
            solution.primal_objective = model.objective_value(&solution.x, &barx).unwrap();
        }
        solution.barx = barx;
        solution.iterations = iteration;
        Ok(solution)
    }
}

/// A small valid model scripted by `name`.
pub fn scripted_model(name: &str) -> Model {
    let mut model = Model::with_name(name);
    model.print_to_sink();
    let x = model.append_variables(2);
    model.set_variable_bound(x, BoundKey::Lower, 1.0, 0.0).unwrap();
    model.put_cj(x, 2.0).unwrap();
    let r = model.append_afe_rows(2);
    model.set_afe_entries(&[r, r + 1], &[x, x + 1], &[1.0, 1.0]).unwrap();
    let nonneg = model.append_nonnegative_domain(2).unwrap();
    model.append_acc(nonneg, &[r, r + 1], None).unwrap();
    model
}
