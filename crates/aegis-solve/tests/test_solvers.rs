//! End-to-end tests for the classical and variational solvers.

use aegis_noise::NoiseProfile;
use aegis_qubo::{Bitstring, QuboInstance, TacticalScenario, to_ising};
use aegis_solve::{
    AnsatzKind, BruteForce, CancelFlag, ConvergencePolicy, Greedy, HARD_MAX_QUBITS, OptimizerKind,
    ParameterInit, SolveError, StopReason, VariationalConfig, VariationalEngine,
};
use ndarray::Array2;
use proptest::prelude::*;

fn arb_qubo(max_n: usize) -> impl Strategy<Value = QuboInstance> {
    (1..=max_n).prop_flat_map(|n| {
        prop::collection::vec(-5.0f64..5.0, n * n).prop_map(move |v| {
            let mut q = Array2::from_shape_vec((n, n), v).unwrap();
            // symmetrise so the Ising conversion accepts it
            let t = q.t().to_owned();
            q = (&q + &t) / 2.0;
            QuboInstance::new(q, 0.0).unwrap()
        })
    })
}

fn all_assignments(n: usize) -> impl Iterator<Item = Bitstring> {
    (0..1usize << n).map(move |k| Bitstring::from_index(k, n))
}

fn scenario_qubo() -> QuboInstance {
    TacticalScenario::random(4, 7)
        .with_select(1)
        .with_penalty(4.0)
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Classical solvers
// ---------------------------------------------------------------------------

#[test]
fn brute_force_on_negative_identity() {
    let qubo = QuboInstance::new(-Array2::<f64>::eye(4), 0.0).unwrap();
    let result = BruteForce::new().solve(&qubo).unwrap();
    assert_eq!(result.bitstring.to_string(), "1111");
    assert_eq!(result.cost, -4.0);
    assert_eq!(result.optimality_gap(-4.0), 0.0);
}

#[test]
fn brute_force_selects_exactly_k() {
    // N = 6, Σx = 2, λ = 10
    let scenario = TacticalScenario::random(6, 11).with_select(2).with_penalty(10.0);
    let qubo = scenario.build().unwrap();
    let result = BruteForce::new().solve(&qubo).unwrap();
    assert_eq!(result.bitstring.count_ones(), 2);
    assert!(scenario.is_feasible(&result.bitstring));
}

#[test]
fn brute_force_refuses_large_instances() {
    let qubo = QuboInstance::new(Array2::zeros((25, 25)), 0.0).unwrap();
    let err = BruteForce::new().solve(&qubo).unwrap_err();
    assert!(matches!(
        err,
        SolveError::IntractableSize {
            n: 25,
            limit: 24,
            ..
        }
    ));
}

#[test]
fn greedy_never_beats_brute_force() {
    let qubo = scenario_qubo();
    let exact = BruteForce::new().solve(&qubo).unwrap();
    let greedy = Greedy::new().solve(&qubo).unwrap();
    assert!(greedy.cost >= exact.cost - 1e-12);
    assert!(greedy.optimality_gap(exact.cost) >= -1e-12);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn brute_force_is_a_global_minimum(qubo in arb_qubo(8)) {
        let result = BruteForce::new().solve(&qubo).unwrap();
        for x in all_assignments(qubo.n()) {
            prop_assert!(result.cost <= qubo.evaluate(&x) + 1e-9);
        }
    }

    #[test]
    fn greedy_ends_in_a_local_minimum(qubo in arb_qubo(10)) {
        let result = Greedy::new().solve(&qubo).unwrap();
        for i in 0..qubo.n() {
            prop_assert!(qubo.flip_delta(&result.bitstring, i) >= -1e-12);
        }
        let energies: Vec<f64> = result.trajectory.iter().map(|p| p.energy).collect();
        prop_assert!(energies.windows(2).all(|w| w[1] <= w[0]));
    }
}

// ---------------------------------------------------------------------------
// Variational engine
// ---------------------------------------------------------------------------

#[test]
fn noiseless_energies_respect_the_ground_state() {
    let qubo = scenario_qubo();
    let exact = BruteForce::new().solve(&qubo).unwrap();
    for ansatz in [AnsatzKind::vqe(), AnsatzKind::qaoa()] {
        let config = VariationalConfig::new(ansatz).with_max_iterations(30);
        let result = VariationalEngine::new(config).solve(&qubo).unwrap();
        for point in &result.trajectory {
            assert!(point.energy >= exact.cost - 1e-9, "{ansatz}: {}", point.energy);
        }
        assert!(result.cost >= exact.cost - 1e-12);
    }
}

#[test]
fn best_energy_is_non_increasing() {
    let qubo = scenario_qubo();
    let config = VariationalConfig::new(AnsatzKind::qaoa()).with_max_iterations(40);
    let result = VariationalEngine::new(config).solve(&qubo).unwrap();
    let best: Vec<f64> = result.trajectory.iter().map(|p| p.best_energy).collect();
    assert!(best.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(result.best_energy, result.trajectory.best_energy());
}

#[test]
fn direct_search_optimizers_never_accept_worse() {
    let qubo = scenario_qubo();
    for optimizer in [OptimizerKind::nelder_mead(), OptimizerKind::compass()] {
        let config = VariationalConfig::new(AnsatzKind::vqe())
            .with_optimizer(optimizer)
            .with_max_iterations(25);
        let result = VariationalEngine::new(config).solve(&qubo).unwrap();
        let energies: Vec<f64> = result.trajectory.iter().map(|p| p.energy).collect();
        assert!(energies.windows(2).all(|w| w[1] <= w[0]));
        assert!(result.solver.starts_with("vqe/"));
    }
}

#[test]
fn zero_probability_noise_matches_ideal() {
    let qubo = scenario_qubo();
    let base = VariationalConfig::new(AnsatzKind::qaoa())
        .with_max_iterations(20)
        .with_seed(5);
    let ideal = VariationalEngine::new(base.clone()).solve(&qubo).unwrap();
    let zero = VariationalEngine::new(base.with_noise(NoiseProfile::combined(0.0, 0.0)))
        .solve(&qubo)
        .unwrap();
    assert_eq!(ideal.trajectory, zero.trajectory);
    assert_eq!(ideal.bitstring, zero.bitstring);
    assert_eq!(ideal.optimal_params, zero.optimal_params);
}

#[test]
fn noise_pulls_energy_towards_offset() {
    let qubo = scenario_qubo();
    let h = to_ising(&qubo).unwrap();
    let base = VariationalConfig::new(AnsatzKind::qaoa())
        .with_max_iterations(0)
        .with_seed(3);
    let ideal = VariationalEngine::new(base.clone()).solve(&qubo).unwrap();
    let noisy = VariationalEngine::new(base.with_noise(NoiseProfile::readout(0.5)))
        .solve(&qubo)
        .unwrap();
    // f = 0.5 erases every ⟨Z⟩, leaving the constant term
    assert!((noisy.trajectory[0].energy - h.offset()).abs() < 1e-12);
    assert_eq!(ideal.trajectory.len(), 1);
}

#[test]
fn success_probability_of_the_optimum() {
    let qubo = scenario_qubo();
    let h = to_ising(&qubo).unwrap();
    let exact = BruteForce::new().solve(&qubo).unwrap();
    let config = VariationalConfig::new(AnsatzKind::qaoa()).with_max_iterations(30);
    let result = VariationalEngine::new(config)
        .run(&qubo, &h, Some(&exact.bitstring))
        .unwrap();

    let p = result.success_probability.unwrap();
    assert!(p >= 0.0 && p <= 1.0 + 1e-9);
    let top_total: usize = result.top_outcomes.iter().map(|o| o.count).sum();
    assert!(top_total <= 1024);
    assert_eq!(result.bitstring.len(), 4);
    assert_eq!(result.cost, qubo.evaluate(&result.bitstring));
}

#[test]
fn converges_on_a_flat_landscape() {
    // every assignment has the same cost, so the energy never moves
    let qubo = QuboInstance::new(Array2::zeros((2, 2)), 1.0).unwrap();
    let policy = ConvergencePolicy::default().with_window(3).with_max_iterations(50);
    let config = VariationalConfig::new(AnsatzKind::vqe()).with_policy(policy);
    let result = VariationalEngine::new(config).solve(&qubo).unwrap();
    assert!(result.converged);
    assert_eq!(result.stop_reason, Some(StopReason::Converged));
    assert_eq!(result.trajectory.len(), 4);
}

#[test]
fn overflowing_energy_is_reported() {
    // the Ising offset overflows to +∞
    let qubo = QuboInstance::new(Array2::from_elem((1, 1), f64::MAX), f64::MAX).unwrap();
    let err = VariationalEngine::default().solve(&qubo).unwrap_err();
    assert_eq!(
        err,
        SolveError::NumericalInstability {
            iteration: 0,
            last_valid: None
        }
    );
}

#[test]
fn overflowing_rotation_fails_under_shot_noise() {
    // 2γ·h with h = −5e307 and γ ≥ 2 overflows the QAOA cost angle
    let qubo = QuboInstance::new(Array2::from_elem((1, 1), 1e308), 0.0).unwrap();
    let config = VariationalConfig::new(AnsatzKind::Qaoa { layers: 1 })
        .with_init(ParameterInit::Uniform {
            low: 2.0,
            high: 3.0,
        })
        .with_noise(NoiseProfile::ideal().with_shots(100));
    let err = VariationalEngine::new(config).solve(&qubo).unwrap_err();
    assert_eq!(
        err,
        SolveError::NumericalInstability {
            iteration: 0,
            last_valid: None
        }
    );
}

#[test]
fn instability_mid_run_reports_last_valid_iteration() {
    // E(θ) = −1.7e308 + 8e307·cos(θ₀ + θ₁) leaves f64 range once cos θ < −0.13.
    // Compass search from 0 with unit steps accepts θ₀ = 1, then polls θ₀ = 2.
    let qubo = QuboInstance::new(Array2::from_elem((1, 1), -1.6e308), -9e307).unwrap();
    let hamiltonian = to_ising(&qubo).unwrap();
    assert!((hamiltonian.offset() / -1.7e308 - 1.0).abs() < 1e-12);

    for noise in [NoiseProfile::ideal(), NoiseProfile::ideal().with_shots(10_000)] {
        let config = VariationalConfig::new(AnsatzKind::HardwareEfficient { reps: 1 })
            .with_init(ParameterInit::Zeros)
            .with_optimizer(OptimizerKind::CompassSearch {
                initial_step: 1.0,
                min_step: 1e-3,
            })
            .with_noise(noise);
        let err = VariationalEngine::new(config).solve(&qubo).unwrap_err();
        assert_eq!(
            err,
            SolveError::NumericalInstability {
                iteration: 2,
                last_valid: Some(1)
            }
        );
    }
}

#[test]
fn shot_noise_runs_are_seeded() {
    let qubo = scenario_qubo();
    let hamiltonian = to_ising(&qubo).unwrap();
    let exact = BruteForce::new().solve(&qubo).unwrap();
    let config = VariationalConfig::new(AnsatzKind::qaoa())
        .with_noise(NoiseProfile::readout(0.02).with_shots(256))
        .with_max_iterations(20)
        .with_seed(9);
    let engine = VariationalEngine::new(config);

    let a = engine.run(&qubo, &hamiltonian, Some(&exact.bitstring)).unwrap();
    let b = engine.run(&qubo, &hamiltonian, Some(&exact.bitstring)).unwrap();
    assert_eq!(a.trajectory, b.trajectory);
    assert_eq!(a.bitstring, b.bitstring);

    let bound = hamiltonian.offset().abs() + hamiltonian.lambda();
    for point in a.trajectory.iter() {
        assert!(point.energy.is_finite());
        assert!(point.energy.abs() <= bound + 1e-9);
    }
    let p = a.success_probability.unwrap();
    assert!((0.0..=1.0 + 1e-9).contains(&p));
}

#[test]
fn shared_cancel_flag_stops_every_engine() {
    let flag = CancelFlag::new();
    let a = VariationalEngine::default().with_cancel_flag(flag.clone());
    let b = VariationalEngine::new(VariationalConfig::new(AnsatzKind::qaoa()))
        .with_cancel_flag(flag.clone());
    flag.cancel();
    let qubo = scenario_qubo();
    assert!(matches!(a.solve(&qubo), Err(SolveError::Cancelled { .. })));
    assert!(matches!(b.solve(&qubo), Err(SolveError::Cancelled { .. })));
}

#[test]
fn simulator_ceiling_applies_to_variational_runs() {
    let qubo = QuboInstance::new(Array2::zeros((21, 21)), 0.0).unwrap();
    let err = VariationalEngine::default().solve(&qubo).unwrap_err();
    assert!(matches!(
        err,
        SolveError::IntractableSize {
            n: 21,
            limit: 20,
            ..
        }
    ));
}

#[test]
fn oversized_qubit_limit_is_capped() {
    let qubo = QuboInstance::new(Array2::zeros((64, 64)), 0.0).unwrap();
    let config = VariationalConfig::new(AnsatzKind::qaoa()).with_max_qubits(usize::MAX);
    let err = VariationalEngine::new(config).solve(&qubo).unwrap_err();
    assert_eq!(
        err,
        SolveError::IntractableSize {
            solver: "qaoa",
            n: 64,
            limit: HARD_MAX_QUBITS,
        }
    );
}
