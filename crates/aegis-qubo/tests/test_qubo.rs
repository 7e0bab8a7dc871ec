//! Tests for QUBO construction and the tactical scenario.

use aegis_qubo::{
    Bitstring, PenaltyConstraint, QuboBuilder, QuboError, QuboInstance, TacticalScenario,
};
use ndarray::Array2;

fn all_assignments(n: usize) -> impl Iterator<Item = Bitstring> {
    (0..1usize << n).map(move |k| Bitstring::from_index(k, n))
}

// ---------------------------------------------------------------------------
// Penalty constraints
// ---------------------------------------------------------------------------

#[test]
fn penalty_makes_every_violation_cost_more() {
    // N = 6, Σx = 2, λ = 10, objective costs in [0, 2]
    let scenario = TacticalScenario::random(6, 2024).with_select(2).with_penalty(10.0);
    let qubo = scenario.build().unwrap();

    let (feasible, infeasible): (Vec<_>, Vec<_>) =
        all_assignments(6).partition(|x| x.count_ones() == 2);
    let worst_feasible = feasible
        .iter()
        .map(|x| qubo.evaluate(x))
        .fold(f64::NEG_INFINITY, f64::max);
    let best_infeasible = infeasible
        .iter()
        .map(|x| qubo.evaluate(x))
        .fold(f64::INFINITY, f64::min);
    assert!(worst_feasible < best_infeasible);
}

#[test]
fn negative_lambda_rejected() {
    let err = QuboBuilder::new(3)
        .constraint(PenaltyConstraint::cardinality(1, -0.5))
        .build()
        .unwrap_err();
    assert!(matches!(err, QuboError::InvalidScenario(_)));
}

#[test]
fn equality_needs_one_coefficient_per_variable() {
    let err = QuboBuilder::new(3)
        .constraint(PenaltyConstraint::equality(vec![1.0, 1.0], 1.0, 1.0))
        .build()
        .unwrap_err();
    assert!(matches!(err, QuboError::InvalidScenario(_)));
}

#[test]
fn exclusion_needs_distinct_variables() {
    let err = QuboBuilder::new(3)
        .constraint(PenaltyConstraint::exclusion(1, 1, 1.0))
        .build()
        .unwrap_err();
    assert!(matches!(err, QuboError::InvalidScenario(_)));
}

#[test]
fn constraint_residuals() {
    let x: Bitstring = "1101".parse().unwrap();
    assert_eq!(PenaltyConstraint::cardinality(2, 1.0).residual(&x), 1.0);
    assert!(PenaltyConstraint::cardinality(3, 1.0).is_satisfied(&x));
    assert!(!PenaltyConstraint::exclusion(0, 1, 1.0).is_satisfied(&x));
    assert!(PenaltyConstraint::exclusion(0, 2, 1.0).is_satisfied(&x));
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

#[test]
fn from_rows_requires_square() {
    let err = QuboInstance::from_rows(vec![vec![1.0, 0.0], vec![0.0]], 0.0).unwrap_err();
    assert!(matches!(err, QuboError::InvalidScenario(_)));
}

#[test]
fn builder_matches_matrix_form() {
    let built = QuboBuilder::new(2)
        .linear(0, -1.0)
        .linear(1, 2.0)
        .quadratic(1, 0, 3.0)
        .offset(0.5)
        .build()
        .unwrap();
    let mut q = Array2::<f64>::zeros((2, 2));
    q[[0, 0]] = -1.0;
    q[[1, 1]] = 2.0;
    q[[0, 1]] = 1.5;
    q[[1, 0]] = 1.5;
    let direct = QuboInstance::new(q, 0.5).unwrap();
    assert_eq!(built, direct);
}

#[test]
fn scenario_penalty_margin_is_objective_span() {
    let scenario = TacticalScenario::new(vec![2.0, 4.0, 3.0], vec![4.0, 2.0, 3.0]);
    // normalised: R̂ = [0, 1, 0.5], D̂ = [1, 0, 0.5]
    assert_eq!(scenario.combined_costs(), vec![1.0, 1.0, 1.0]);
    assert_eq!(scenario.penalty_margin(), 1.0);
}

#[test]
fn feasibility_accounts_for_exclusions() {
    let scenario = TacticalScenario::random(4, 9)
        .with_select(2)
        .with_exclusion(0, 1);
    assert!(scenario.is_feasible(&"1010".parse().unwrap()));
    assert!(!scenario.is_feasible(&"1100".parse().unwrap()));
    assert!(!scenario.is_feasible(&"1110".parse().unwrap()));
}
