mod common;

use common::{scripted_model, ScriptedSolver};
use conic_model::{io::ConfigurablePrintTarget, model::*};

#[test]
fn test_clone_is_isolated() {
    let solver = ScriptedSolver::new();
    let mut original = scripted_model("status=optimal");
    let mut copy = original.clone();

    copy.set_variable_bound(0, BoundKey::Range, 3.0, 4.0).unwrap();
    copy.put_cj(1, 7.0).unwrap();
    copy.set_afe_constant(0, 1.0).unwrap();
    copy.append_variables(1);
    copy.settings.verbose = true;

    let b = original.variable_bound(0).unwrap();
    assert_eq!((b.key, b.lower, b.upper), (BoundKey::Lower, 1.0, f64::INFINITY));
    assert_eq!(original.objective_coefficients(), &[2.0, 0.0]);
    assert_eq!(original.afe_constant(0).unwrap(), 0.0);
    assert_eq!(original.num_variables(), 2);
    assert!(!original.settings.verbose);

    original.solve(&solver).unwrap();
    copy.solve(&solver).unwrap();

    assert_eq!(original.primal_values().unwrap(), &[1.0, 0.0]);
    assert_eq!(copy.primal_values().unwrap(), &[3.0, 0.0, 0.0]);
    assert_eq!(original.primal_objective().unwrap(), 2.0);
    assert_eq!(copy.primal_objective().unwrap(), 6.0);

    // bounds of the original are untouched by solving either model
    let b = original.variable_bound(0).unwrap();
    assert_eq!((b.lower, b.upper), (1.0, f64::INFINITY));
}

#[test]
fn test_clone_keeps_solution_and_structure() {
    let solver = ScriptedSolver::new();
    let mut original = scripted_model("status=optimal");
    original.solve(&solver).unwrap();

    let mut copy = original.clone();
    assert_eq!(copy.solution_status().unwrap(), SolutionStatus::Optimal);
    assert_eq!(copy.primal_values().unwrap(), original.primal_values().unwrap());
    assert_eq!(copy.counts(), original.counts());
    assert_eq!(copy.name(), original.name());

    copy.clear_solution();
    assert!(copy.solution().is_err());
    assert!(original.solution().is_ok());

    // growing the copy leaves the original's structure alone
    let nonneg = copy.append_nonnegative_domain(2).unwrap();
    copy.append_acc(nonneg, &[0, 1], None).unwrap();
    assert_eq!(copy.num_accs(), 2);
    assert_eq!(original.num_accs(), 1);
    assert_eq!(original.num_domains(), 1);
}

#[test]
fn test_clone_print_targets() {
    let mut original = scripted_model("");
    original.print_to_buffer();
    original.settings.verbose = true;
    original.solve(&ScriptedSolver::new()).unwrap();
    assert!(!original.get_print_buffer().unwrap().is_empty());

    // a cloned buffer starts out empty
    let mut copy = original.clone();
    assert_eq!(copy.get_print_buffer().unwrap(), "");
    copy.solve(&ScriptedSolver::new()).unwrap();
    assert!(copy.get_print_buffer().unwrap().contains("scripted"));
}
