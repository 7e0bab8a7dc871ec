//! Property tests for the noise injector.

use aegis_noise::{NoiseChannel, NoiseInjector, NoiseProfile};
use proptest::prelude::*;

fn arb_distribution(max_qubits: usize) -> impl Strategy<Value = Vec<f64>> {
    (1..=max_qubits).prop_flat_map(|n| {
        proptest::collection::vec(0.0f64..1.0, 1 << n).prop_map(|raw| {
            let total: f64 = raw.iter().sum::<f64>().max(1e-12);
            raw.into_iter().map(|v| v / total).collect()
        })
    })
}

fn arb_profile() -> impl Strategy<Value = NoiseProfile> {
    (0.0f64..0.5, 0.0f64..0.5, 0.0f64..0.5).prop_map(|(d, b, r)| {
        NoiseProfile::new(
            "random",
            vec![
                NoiseChannel::Readout { p: r },
                NoiseChannel::BitFlip { p: b },
                NoiseChannel::Depolarizing { p: d },
            ],
        )
    })
}

proptest! {
    #[test]
    fn distribution_mixing_conserves_probability(
        mut probs in arb_distribution(5),
        profile in arb_profile(),
    ) {
        let before: f64 = probs.iter().sum();
        let injector = NoiseInjector::new(&profile, 0).unwrap();
        injector.perturb_distribution(&mut probs);
        let after: f64 = probs.iter().sum();
        prop_assert!((before - after).abs() < 1e-9);
        prop_assert!(probs.iter().all(|p| *p >= 0.0));
    }

    #[test]
    fn attenuation_never_increases_magnitude(
        e in -1.0f64..1.0,
        profile in arb_profile(),
        weight in 1usize..=2,
    ) {
        let mut injector = NoiseInjector::new(&profile, 0).unwrap();
        let noisy = injector.perturb_weight(e, weight);
        prop_assert!(noisy.abs() <= e.abs() + 1e-15);
    }

    #[test]
    fn zero_probabilities_change_nothing(mut probs in arb_distribution(4), e in -1.0f64..1.0) {
        let profile = NoiseProfile::depolarizing(0.0, 0.0)
            .with_channel(NoiseChannel::BitFlip { p: 0.0 });
        let mut injector = NoiseInjector::new(&profile, 99).unwrap();
        let original = probs.clone();
        injector.perturb_distribution(&mut probs);
        prop_assert_eq!(probs, original);
        prop_assert_eq!(injector.perturb_weight(e, 2).to_bits(), e.to_bits());
    }
}
