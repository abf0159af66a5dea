//! Property-based tests for metric and drift invariants.

use fd_core::calibrate::{
    brier_score, expected_calibration_error, log_loss, roc_auc, CalibrationCurve,
    ClassificationEvaluator, LabeledScores,
};
use fd_core::drift::{ks_drift_test, psi, DEFAULT_PSI_EPSILON};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Labels and probabilities of equal length, at least one of each class.
fn scored_strategy() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (2usize..200)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(prop::bool::ANY, n),
                prop::collection::vec(0.0f64..=1.0, n),
            )
        })
        .prop_map(|(mut labels, probs)| {
            labels[0] = true;
            labels[1] = false;
            let y = labels.into_iter().map(|l| if l { 1.0 } else { 0.0 }).collect();
            (y, probs)
        })
}

fn sample_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e3f64..1.0e3, 10..300)
}

/// Scored pairs with a shuffled index permutation of the same length.
fn permuted_strategy() -> impl Strategy<Value = (Vec<f64>, Vec<f64>, Vec<usize>)> {
    scored_strategy().prop_flat_map(|(y, p)| {
        let order: Vec<usize> = (0..y.len()).collect();
        (Just(y), Just(p), Just(order).prop_shuffle())
    })
}

/// A bin count and, per bin, a sample count and a position inside the bin.
fn calibrated_bins_strategy() -> impl Strategy<Value = (usize, Vec<(usize, f64)>)> {
    (5usize..=12).prop_flat_map(|n_bins| {
        (
            Just(n_bins),
            prop::collection::vec((2_000usize..2_500, 0.05f64..0.95), n_bins),
        )
    })
}

/// Every bin holds one shared probability and as close to that fraction
/// of positives as its count allows.
fn calibrated_scores(n_bins: usize, bins: &[(usize, f64)]) -> (Vec<f64>, Vec<f64>) {
    let width = 1.0 / n_bins as f64;
    let mut y = Vec::new();
    let mut p = Vec::new();
    for (b, &(count, position)) in bins.iter().enumerate() {
        let prob = (b as f64 + position) * width;
        let positives = (count as f64 * prob).round() as usize;
        y.extend(std::iter::repeat(1.0).take(positives));
        y.extend(std::iter::repeat(0.0).take(count - positives));
        p.extend(std::iter::repeat(prob).take(count));
    }
    (y, p)
}

fn normal_draws(rng: &mut StdRng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.sample::<f64, _>(StandardNormal)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn brier_of_perfect_predictions_is_zero((y, _) in scored_strategy()) {
        let bs = brier_score(&y, &y).expect("brier failed");
        prop_assert_eq!(bs, 0.0);
    }

    #[test]
    fn brier_is_bounded_and_permutation_invariant((y, p, order) in permuted_strategy()) {
        let bs = brier_score(&y, &p).expect("brier failed");
        prop_assert!((0.0..=1.0).contains(&bs), "brier out of range: {bs}");

        let py: Vec<f64> = order.iter().map(|&i| y[i]).collect();
        let pp: Vec<f64> = order.iter().map(|&i| p[i]).collect();
        let permuted = brier_score(&py, &pp).expect("brier failed");
        prop_assert!((bs - permuted).abs() < 1e-12, "{bs} vs {permuted}");
    }

    #[test]
    fn log_loss_is_non_negative_and_finite((y, p) in scored_strategy()) {
        let ll = log_loss(&y, &p).expect("log loss failed");
        prop_assert!(ll.is_finite());
        prop_assert!(ll >= 0.0);
    }

    #[test]
    fn auc_is_a_probability((y, p) in scored_strategy()) {
        let auc = roc_auc(&y, &p).expect("auc failed");
        prop_assert!((0.0..=1.0).contains(&auc), "auc out of range: {auc}");
    }

    #[test]
    fn ece_matches_the_calibration_curve((y, p) in scored_strategy(), bins in 1usize..25) {
        let ece = expected_calibration_error(&y, &p, bins).expect("ece failed");
        let data = LabeledScores::new(&y, &p).expect("valid scores");
        let curve = CalibrationCurve::from_scores(&data, bins).expect("curve failed");
        prop_assert_eq!(ece, curve.ece);
        prop_assert!((0.0..=1.0).contains(&ece));
        prop_assert!(curve.mce >= ece - 1e-12);
        prop_assert_eq!(curve.bins.iter().map(|b| b.count).sum::<usize>(), y.len());
    }

    #[test]
    fn hard_samples_are_misclassified_and_sorted(
        (y, p) in scored_strategy(),
        threshold in 0.05f64..0.95,
        n in 0usize..30,
    ) {
        let eval = ClassificationEvaluator::new(&y, &p, threshold, "prop").expect("evaluator");
        let hard = eval.hard_samples(None, n).expect("hard samples");
        prop_assert!(hard.samples.len() <= n);
        for s in &hard.samples {
            let predicted_positive = p[s.index] >= threshold;
            prop_assert_ne!(predicted_positive, s.true_label == 1);
            prop_assert_eq!(f64::from(s.true_label), y[s.index]);
        }
        for pair in hard.samples.windows(2) {
            prop_assert!(
                pair[0].loss > pair[1].loss
                    || (pair[0].loss == pair[1].loss && pair[0].index < pair[1].index),
                "out of order: {:?} before {:?}", pair[0], pair[1]
            );
        }
    }

    #[test]
    fn psi_of_a_sample_against_itself_is_zero(r in sample_strategy(), bins in 1usize..20) {
        let min = r.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = r.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assume!(max > min);
        let value = psi(&r, &r, bins, DEFAULT_PSI_EPSILON).expect("psi failed");
        prop_assert!(value.abs() < 1e-12, "psi = {value}");
    }

    #[test]
    fn psi_is_non_negative(r in sample_strategy(), c in sample_strategy()) {
        let min = r.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = r.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assume!(max > min);
        let value = psi(&r, &c, 10, DEFAULT_PSI_EPSILON).expect("psi failed");
        prop_assert!(value >= -1e-12, "psi = {value}");
    }

    #[test]
    fn ks_on_identical_samples_is_never_drift(r in sample_strategy()) {
        let result = ks_drift_test(&r, &r, 0.05).expect("ks failed");
        prop_assert_eq!(result.statistic, 0.0);
        prop_assert!(!result.is_drift);
    }

    #[test]
    fn ks_statistic_and_p_value_are_probabilities(r in sample_strategy(), c in sample_strategy()) {
        let result = ks_drift_test(&r, &c, 0.05).expect("ks failed");
        prop_assert!((0.0..=1.0).contains(&result.statistic));
        prop_assert!((0.0..=1.0).contains(&result.p_value));
        prop_assert_eq!(result.is_drift, result.p_value < 0.05);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn ece_vanishes_when_bins_match_their_frequency(
        (n_bins, bins) in calibrated_bins_strategy(),
    ) {
        let (y, p) = calibrated_scores(n_bins, &bins);
        prop_assert!(y.len() >= 10_000);
        // Per-bin gap is at most half a sample over the bin count.
        let ece = expected_calibration_error(&y, &p, n_bins).expect("ece failed");
        prop_assert!(ece < 2.5e-4 + 1e-9, "ece = {ece}");
    }
}

#[test]
fn psi_of_two_draws_from_one_normal_is_small() {
    let mut rng = StdRng::seed_from_u64(7);
    let reference = normal_draws(&mut rng, 20_000);
    let current = normal_draws(&mut rng, 20_000);
    let value = psi(&reference, &current, 10, DEFAULT_PSI_EPSILON).unwrap();
    assert!(value < 0.1, "psi = {value}");
}

#[test]
fn psi_of_a_shifted_normal_is_significant() {
    let mut rng = StdRng::seed_from_u64(11);
    let reference = normal_draws(&mut rng, 5_000);
    let current: Vec<f64> = normal_draws(&mut rng, 5_000)
        .into_iter()
        .map(|x| x + 1.0)
        .collect();
    let value = psi(&reference, &current, 10, DEFAULT_PSI_EPSILON).unwrap();
    assert!(value > 0.2, "psi = {value}");
}
