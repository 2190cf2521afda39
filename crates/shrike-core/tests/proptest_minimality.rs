use std::collections::BTreeSet;

use proptest::prelude::*;
use shrike_core::{
    DdAlgorithm, DdMin, DdResult, LoggingDd, ProbabilisticDd, PropertyOutcome, PropertyTester,
    ZeroTestDd,
};

/// Items `0..len` plus a non-empty target drawn from them.
fn arb_instance() -> impl Strategy<Value = (u32, BTreeSet<u32>)> {
    (2u32..40).prop_flat_map(|len| (Just(len), prop::collection::btree_set(0..len, 1..6)))
}

/// Present iff every target item survives; the canonical monotone property.
fn superset_tester(
    target: &BTreeSet<u32>,
) -> impl FnMut(&mut (), &[u32], &[u32]) -> anyhow::Result<PropertyOutcome> + '_ {
    move |_: &mut (), retained: &[u32], _: &[u32]| {
        Ok(if target.iter().all(|t| retained.contains(t)) {
            PropertyOutcome::Present
        } else {
            PropertyOutcome::NotPresent
        })
    }
}

fn run<A: DdAlgorithm<(), u32>>(
    algorithm: &mut A,
    items: Vec<u32>,
    tester: &mut dyn PropertyTester<(), u32>,
) -> DdResult<u32> {
    algorithm
        .minimize(&mut (), items, tester)
        .expect("tester never fails")
}

/// Every single-item removal from `retained` loses the property.
fn assert_one_minimal(retained: &[u32], tester: &mut dyn PropertyTester<(), u32>) {
    assert_eq!(
        tester.test(&mut (), retained, &[]).expect("test"),
        PropertyOutcome::Present
    );
    for skip in 0..retained.len() {
        let smaller: Vec<u32> = retained
            .iter()
            .enumerate()
            .filter(|&(idx, _)| idx != skip)
            .map(|(_, v)| *v)
            .collect();
        assert_ne!(
            tester.test(&mut (), &smaller, &[]).expect("test"),
            PropertyOutcome::Present,
            "removing {} keeps the property",
            retained[skip]
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn ddmin_finds_target_exactly((len, target) in arb_instance()) {
        let mut tester = superset_tester(&target);
        let result = run(&mut DdMin, (0..len).collect(), &mut tester);

        let expected: Vec<u32> = target.iter().copied().collect();
        prop_assert_eq!(&result.retained, &expected);
        prop_assert_eq!(result.input_len(), (0..len).count());
        assert_one_minimal(&result.retained, &mut tester);
    }

    #[test]
    fn ddmin_is_idempotent((len, target) in arb_instance()) {
        let mut tester = superset_tester(&target);
        let once = run(&mut DdMin, (0..len).collect(), &mut tester);
        let twice = run(&mut DdMin, once.retained.clone(), &mut tester);
        prop_assert_eq!(twice.retained, once.retained);
        prop_assert!(twice.deleted.is_empty());
    }

    #[test]
    fn probabilistic_is_one_minimal((len, target) in arb_instance(), seed in any::<u64>()) {
        let mut tester = superset_tester(&target);
        let mut algorithm = ProbabilisticDd::default().with_seed(seed);
        let result = run(&mut algorithm, (0..len).collect(), &mut tester);

        let expected: Vec<u32> = target.iter().copied().collect();
        prop_assert_eq!(&result.retained, &expected);
        assert_one_minimal(&result.retained, &mut tester);

        let again = run(&mut algorithm, result.retained.clone(), &mut tester);
        prop_assert_eq!(again.retained, result.retained);
    }

    #[test]
    fn probabilistic_repeats_per_seed((len, target) in arb_instance(), seed in any::<u64>()) {
        let mut calls_a: Vec<Vec<u32>> = Vec::new();
        let mut calls_b: Vec<Vec<u32>> = Vec::new();
        for calls in [&mut calls_a, &mut calls_b] {
            let mut tester = |_: &mut (), retained: &[u32], _: &[u32]| {
                calls.push(retained.to_vec());
                anyhow::Ok(if target.iter().all(|t| retained.contains(t)) {
                    PropertyOutcome::Present
                } else {
                    PropertyOutcome::NotPresent
                })
            };
            let mut algorithm = ProbabilisticDd::new(0.2).with_seed(seed);
            run(&mut algorithm, (0..len).collect(), &mut tester);
        }
        prop_assert_eq!(calls_a, calls_b);
    }

    #[test]
    fn unconditional_property_reduces_to_empty(len in 0u32..30) {
        let mut tester = |_: &mut (), _: &[u32], _: &[u32]| -> anyhow::Result<PropertyOutcome> {
            Ok(PropertyOutcome::Present)
        };
        let mut algorithm = LoggingDd::new(ZeroTestDd::new(DdMin));
        let result = run(&mut algorithm, (0..len).collect(), &mut tester);
        prop_assert!(result.retained.is_empty());
        prop_assert_eq!(result.deleted, (0..len).collect::<Vec<u32>>());
    }

    #[test]
    fn zero_test_never_changes_a_needed_result((len, target) in arb_instance()) {
        let mut tester = superset_tester(&target);
        let plain = run(&mut DdMin, (0..len).collect(), &mut tester);
        let zeroed = run(&mut ZeroTestDd::new(DdMin), (0..len).collect(), &mut tester);
        prop_assert_eq!(plain, zeroed);
    }
}
