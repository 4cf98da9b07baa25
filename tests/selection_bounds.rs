use aviary_lib::model::evolution::select_index;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn normalized(raw: &[f64]) -> Vec<f64> {
    let sum: f64 = raw.iter().sum();
    if sum > 0.0 {
        raw.iter().map(|f| f / sum).collect()
    } else {
        vec![1.0 / raw.len() as f64; raw.len()]
    }
}

#[test]
fn test_selection_frequency_tracks_fitness() {
    let fitness = [0.7, 0.2, 0.1];
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut counts = [0usize; 3];
    for _ in 0..10_000 {
        counts[select_index(&fitness, rng.gen())] += 1;
    }
    assert!((6500..7500).contains(&counts[0]), "{counts:?}");
    assert!((1600..2400).contains(&counts[1]), "{counts:?}");
    assert!((700..1300).contains(&counts[2]), "{counts:?}");
}

#[test]
fn test_single_candidate_always_selected() {
    assert_eq!(select_index(&[1.0], 0.0), 0);
    assert_eq!(select_index(&[1.0], 0.999), 0);
    assert_eq!(select_index(&[0.0], 0.5), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_draws_stay_in_bounds(
        raw in prop::collection::vec(0.0f64..50.0, 1..64),
        seed in any::<u64>(),
    ) {
        let fitness = normalized(&raw);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for _ in 0..10_000 {
            let index = select_index(&fitness, rng.gen());
            prop_assert!(index < fitness.len());
        }
    }

    #[test]
    fn test_overrun_clamps_to_last(raw in prop::collection::vec(0.0f64..1.0, 1..32)) {
        let fitness = normalized(&raw);
        prop_assert_eq!(select_index(&fitness, 1.5), fitness.len() - 1);
    }
}
