mod common;

use common::{scripted_model, ScriptedSolver};
use conic_model::batch::*;
use conic_model::model::*;
use std::time::{Duration, Instant};

fn models(names: &[&str]) -> Vec<Model> {
    names.iter().map(|name| scripted_model(name)).collect()
}

#[test]
fn test_race_first_conclusive_wins() {
    let env = Environment::new(ScriptedSolver::new());
    let mut batch = models(&["delay=3000", "delay=20;status=optimal", "delay=3000"]);

    let start = Instant::now();
    let results = solve_batch(&env, &mut batch, 3, true, None).unwrap();
    assert!(start.elapsed() < Duration::from_millis(2000));

    assert_eq!(results.len(), 3);
    assert_eq!(results[1].status, BatchStatus::Completed(SolutionStatus::Optimal));
    assert_eq!(results[1].solution.as_ref().unwrap().x, vec![1.0, 0.0]);
    for k in [0, 2] {
        assert_eq!(results[k].status, BatchStatus::Interrupted);
        assert!(results[k].solution.is_none());
        assert!(batch[k].solution().is_err());
    }
    assert!(batch[1].solution().is_ok());
    assert_eq!(env.active_leases(), 0);
}

#[test]
fn test_race_ignores_inconclusive_results() {
    let env = Environment::new(ScriptedSolver::new());
    let mut batch = models(&[
        "delay=5;status=feasible",
        "delay=5;status=unknown",
        "delay=60;status=primal_infeasible",
        "delay=3000",
    ]);

    let results = solve_batch(&env, &mut batch, 4, true, None).unwrap();

    assert_eq!(
        results[0].status,
        BatchStatus::Completed(SolutionStatus::PrimalFeasible)
    );
    assert_eq!(results[1].status, BatchStatus::Completed(SolutionStatus::Unknown));
    // a certificate is conclusive and ends the race
    assert_eq!(
        results[2].status,
        BatchStatus::Completed(SolutionStatus::PrimalInfeasibleCertificate)
    );
    assert_eq!(results[3].status, BatchStatus::Interrupted);
}

#[test]
fn test_time_limit_interrupts_everything() {
    let env = Environment::new(ScriptedSolver::new());
    let mut batch = models(&["delay=3000", "delay=3000", "delay=3000", "delay=3000"]);

    let limit = Duration::from_millis(50);
    let start = Instant::now();
    let results = solve_batch(&env, &mut batch, 2, false, Some(limit)).unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed >= limit);
    assert!(elapsed < limit + Duration::from_millis(1000));
    assert!(results.iter().all(|r| r.status == BatchStatus::Interrupted));
    assert!(results.iter().all(|r| r.solution.is_none()));
    // only the first two ever started
    assert_eq!(env.solver().calls(), 2);
    assert_eq!(env.active_leases(), 0);
}

#[test]
fn test_time_limit_keeps_finished_results() {
    let env = Environment::new(ScriptedSolver::new());
    let mut batch = models(&["status=optimal", "delay=3000", "status=feasible"]);

    let results = solve_batch(&env, &mut batch, 3, false, Some(Duration::from_millis(200))).unwrap();

    assert_eq!(results[0].status, BatchStatus::Completed(SolutionStatus::Optimal));
    assert_eq!(results[1].status, BatchStatus::Interrupted);
    assert_eq!(
        results[2].status,
        BatchStatus::Completed(SolutionStatus::PrimalFeasible)
    );
}

#[test]
fn test_time_limit_discards_late_results() {
    // the solver never looks at the interrupt and finishes well past the limit
    let env = Environment::new(ScriptedSolver::new());
    let mut batch = models(&["sleep=300;status=optimal", "sleep=300;status=optimal"]);

    let start = Instant::now();
    let results = solve_batch(&env, &mut batch, 2, false, Some(Duration::from_millis(50))).unwrap();
    // started solves are always waited for
    assert!(start.elapsed() >= Duration::from_millis(300));

    for (model, result) in batch.iter().zip(&results) {
        assert_eq!(result.status, BatchStatus::Interrupted);
        assert!(result.solution.is_none());
        assert!(model.solution().is_err());
    }
    assert_eq!(env.solver().calls(), 2);
    assert_eq!(env.active_leases(), 0);
}

#[test]
fn test_race_keeps_only_conclusive_late_results() {
    let env = Environment::new(ScriptedSolver::new());
    let mut batch = models(&[
        "status=optimal",
        "sleep=200;status=feasible",
        "sleep=200;status=primal_infeasible",
    ]);

    let results = solve_batch(&env, &mut batch, 3, true, None).unwrap();

    assert_eq!(results[0].status, BatchStatus::Completed(SolutionStatus::Optimal));
    assert_eq!(results[1].status, BatchStatus::Interrupted);
    assert!(results[1].solution.is_none());
    assert!(batch[1].solution().is_err());
    assert_eq!(
        results[2].status,
        BatchStatus::Completed(SolutionStatus::PrimalInfeasibleCertificate)
    );
    assert!(batch[2].solution().is_ok());
}

#[test]
fn test_zero_time_limit_starts_nothing() {
    let env = Environment::new(ScriptedSolver::new());
    let mut batch = models(&["status=optimal", "status=optimal", "status=optimal"]);

    let start = Instant::now();
    let results = solve_batch(&env, &mut batch, 2, false, Some(Duration::ZERO)).unwrap();
    assert!(start.elapsed() < Duration::from_millis(500));

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.status == BatchStatus::Interrupted));
    assert_eq!(env.solver().calls(), 0);
}

#[test]
fn test_runs_to_completion_without_limit() {
    let env = Environment::new(ScriptedSolver::new());
    let mut batch = models(&[
        "delay=30;status=feasible",
        "status=dual_infeasible",
        "delay=10;status=integer",
        "status=unknown",
        "delay=5",
    ]);

    let results = solve_batch(&env, &mut batch, 2, false, None).unwrap();
    let statuses: Vec<_> = results.iter().map(|r| r.status.clone()).collect();
    assert_eq!(
        statuses,
        vec![
            BatchStatus::Completed(SolutionStatus::PrimalFeasible),
            BatchStatus::Completed(SolutionStatus::DualInfeasibleCertificate),
            BatchStatus::Completed(SolutionStatus::IntegerOptimal),
            BatchStatus::Completed(SolutionStatus::Unknown),
            BatchStatus::Completed(SolutionStatus::Optimal),
        ]
    );
    // each solution is also stored in its model
    for (model, result) in batch.iter().zip(&results) {
        assert_eq!(
            model.primal_values().unwrap(),
            result.solution.as_ref().unwrap().x.as_slice()
        );
    }
    assert_eq!(env.solver().calls(), 5);
}

#[test]
fn test_thread_budget_respected() {
    let env = Environment::new(ScriptedSolver::new());
    let mut batch = models(&["delay=30"; 6]);
    for (k, model) in batch.iter_mut().enumerate() {
        model.settings.num_threads = [2, 1, 3, 8, 0, 2][k];
    }

    let results = solve_batch(&env, &mut batch, 4, false, None).unwrap();

    assert!(results.iter().all(|r| r.status.is_conclusive()));
    assert!(env.solver().peak_threads() <= 4);
    assert!(env.solver().peak_threads() >= 2);
}

#[test]
fn test_single_slot_runs_one_at_a_time() {
    let env = Environment::new(ScriptedSolver::new());
    let mut batch = models(&["delay=10"; 4]);
    for model in batch.iter_mut() {
        model.settings.num_threads = 4;
    }

    let results = solve_batch(&env, &mut batch, 1, false, None).unwrap();
    assert!(results.iter().all(|r| r.status.is_conclusive()));
    assert_eq!(env.solver().peak_threads(), 1);
}

#[test]
fn test_failures_are_isolated() {
    let env = Environment::new(ScriptedSolver::new());
    let mut batch = models(&["status=optimal", "panic", "error=7", "bad_shape", "delay=10"]);
    let mut invalid = scripted_model("status=optimal");
    invalid.set_afe_entry(5, 0, 1.0);
    batch.insert(1, invalid);

    let results = solve_batch(&env, &mut batch, 2, false, None).unwrap();
    assert_eq!(results.len(), 6);

    assert_eq!(results[0].status, BatchStatus::Completed(SolutionStatus::Optimal));
    match &results[1].status {
        BatchStatus::Failed(reason) => assert!(reason.starts_with("invalid model")),
        s => panic!("unexpected status {}", s),
    }
    match &results[2].status {
        BatchStatus::Failed(reason) => assert!(reason.contains("scripted panic")),
        s => panic!("unexpected status {}", s),
    }
    match &results[3].status {
        BatchStatus::Failed(reason) => assert!(reason.contains("error 7")),
        s => panic!("unexpected status {}", s),
    }
    assert!(matches!(results[4].status, BatchStatus::Failed(_)));
    assert_eq!(results[5].status, BatchStatus::Completed(SolutionStatus::Optimal));

    assert!(results[1..5].iter().all(|r| r.solution.is_none()));
    // the invalid model never reached the solver
    assert_eq!(env.solver().calls(), 5);
    assert_eq!(env.active_leases(), 0);
}

#[test]
fn test_failure_does_not_end_race() {
    let env = Environment::new(ScriptedSolver::new());
    let mut batch = models(&["error=3", "delay=20;status=optimal"]);

    let results = solve_batch(&env, &mut batch, 2, true, None).unwrap();
    assert!(matches!(results[0].status, BatchStatus::Failed(_)));
    assert_eq!(results[1].status, BatchStatus::Completed(SolutionStatus::Optimal));
}

#[test]
fn test_empty_batch() {
    let env = Environment::new(ScriptedSolver::new());
    let mut batch: Vec<Model> = Vec::new();
    let results = solve_batch(&env, &mut batch, 1, true, Some(Duration::from_millis(10))).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_zero_pool_rejected() {
    let env = Environment::new(ScriptedSolver::new());
    let mut batch = models(&["status=optimal"]);

    let err = solve_batch(&env, &mut batch, 0, false, None).unwrap_err();
    assert_eq!(err, SettingsError::BadFieldValue("thread_pool_size"));
    assert_eq!(env.solver().calls(), 0);

    let settings = BatchSettings {
        thread_pool_size: 0,
        race: false,
        time_limit: None,
    };
    assert!(BatchScheduler::new(&env, settings).is_err());
}

#[test]
fn test_scheduler_reuse() {
    let env = Environment::new(ScriptedSolver::new());
    let settings = BatchSettingsBuilder::default()
        .thread_pool_size(2)
        .race(true)
        .build()
        .unwrap();
    let scheduler = BatchScheduler::new(&env, settings).unwrap();
    assert!(scheduler.settings().race);

    // a batch can be solved again once a race has cancelled it
    let mut batch = models(&["delay=3000", "status=optimal"]);
    let first = scheduler.solve_batch(&mut batch);
    assert_eq!(first[0].status, BatchStatus::Interrupted);

    batch[0].set_name("status=optimal");
    let second = scheduler.solve_batch(&mut batch);
    assert!(second.iter().all(|r| r.status.is_conclusive()));

    assert_eq!(env.active_leases(), 0);
    assert_eq!(env.into_inner().calls(), 4);
}
