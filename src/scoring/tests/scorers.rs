use std::collections::BTreeMap;

use crate::config::{ScoreWeights, ScoringBaselines};
use crate::scoring::nutrition::{detect_imbalances, score_nutrition, ImbalanceKind};
use crate::scoring::sustainability::score_sustainability;
use crate::scoring::waste::score_waste;

use super::common::{balanced_consumption, clean_waste, wasteful_week};

#[test]
fn zero_waste_scores_a_perfect_hundred() {
    let score = score_waste(&clean_waste());
    assert_eq!(score.value, 100.0);
    assert_eq!(score.factors.len(), 1);
    assert!(score.factors[0].reason.contains("No food waste"));
}

#[test]
fn waste_ratio_bands_map_first_match_wins() {
    let mut metrics = clean_waste();
    for (grams, expected_base) in [
        (150.0, 95.0),
        (250.0, 85.0),
        (350.0, 75.0),
        (500.0, 60.0),
    ] {
        metrics.weekly_waste_grams = grams;
        let score = score_waste(&metrics);
        assert_eq!(score.value, expected_base, "waste {grams}g");
    }
}

#[test]
fn waste_beyond_average_interpolates_down_to_the_floor() {
    let mut metrics = clean_waste();

    // Ratio 1.5 sits halfway down the 45-to-30 slide.
    metrics.weekly_waste_grams = 750.0;
    assert_eq!(score_waste(&metrics).value, 37.5);

    // Twice the average and beyond bottom out at 30.
    metrics.weekly_waste_grams = 1_000.0;
    assert_eq!(score_waste(&metrics).value, 30.0);
    metrics.weekly_waste_grams = 5_000.0;
    assert_eq!(score_waste(&metrics).value, 30.0);
}

#[test]
fn moderate_waste_with_two_expired_items_scores_75() {
    let metrics = wasteful_week().waste;
    let score = score_waste(&metrics);
    assert_eq!(score.value, 75.0);

    let base = &score.factors[0];
    assert_eq!(base.delta, 85.0);
    assert!(base.reason.contains("450g"));

    let penalty = score
        .factors
        .iter()
        .find(|factor| factor.label == "Expired items")
        .expect("expired penalty recorded");
    assert_eq!(penalty.delta, -10.0);
}

#[test]
fn expiring_usage_bonus_counts_distinct_items_and_caps() {
    let mut metrics = clean_waste();
    metrics.weekly_waste_grams = 500.0; // base 60
    metrics.expiring_items_used = vec![
        "Apple".to_string(),
        "Apple".to_string(),
        "Banana".to_string(),
        "Milk".to_string(),
    ];
    let score = score_waste(&metrics);
    // Three distinct items, +2 each.
    assert_eq!(score.value, 66.0);

    metrics.expiring_items_used = (0..8).map(|i| format!("item-{i}")).collect();
    let score = score_waste(&metrics);
    assert_eq!(score.value, 70.0, "usage bonus caps at +10");
}

#[test]
fn trend_bonus_scales_with_reduction_and_caps_at_15() {
    let mut metrics = clean_waste();
    metrics.weekly_waste_grams = 500.0; // base 60
    metrics.previous_week_waste_grams = Some(1_000.0); // 50% reduction
    assert_eq!(score_waste(&metrics).value, 75.0);

    metrics.previous_week_waste_grams = Some(10_000.0); // 95% reduction, capped
    assert_eq!(score_waste(&metrics).value, 75.0);

    metrics.previous_week_waste_grams = Some(550.0); // ~9% reduction
    let score = score_waste(&metrics);
    let trend = score
        .factors
        .iter()
        .find(|factor| factor.label == "Improvement trend")
        .expect("trend factor recorded");
    assert!(trend.delta > 5.0 && trend.delta < 8.0);

    metrics.previous_week_waste_grams = Some(400.0); // waste grew, no bonus
    let score = score_waste(&metrics);
    assert!(score
        .factors
        .iter()
        .all(|factor| factor.label != "Improvement trend"));
}

#[test]
fn expired_penalty_caps_at_25() {
    let mut metrics = clean_waste();
    metrics.weekly_waste_grams = 500.0; // base 60
    metrics.expired_item_count = 9;
    assert_eq!(score_waste(&metrics).value, 35.0);
}

#[test]
fn factor_replay_reproduces_the_waste_value() {
    let score = score_waste(&wasteful_week().waste);
    assert_eq!(score.replayed_value(), score.value);
}

#[test]
fn balanced_week_maxes_out_nutrition() {
    let baselines = ScoringBaselines::default();
    let score = score_nutrition(&balanced_consumption(), &baselines);
    assert_eq!(score.value, 100.0);
    // Variety, regular logging, and veg/fruit bonuses all landed.
    assert!(score.factors.iter().any(|f| f.label == "Variety bonus" && f.delta == 15.0));
    assert!(score.factors.iter().any(|f| f.label == "Regular logging" && f.delta == 10.0));
    assert!(score.factors.iter().any(|f| f.label == "Vegetables & fruit" && f.delta == 10.0));
    assert_eq!(score.replayed_value(), score.value);
}

#[test]
fn missing_category_is_detected_as_high_severity_under_consumption() {
    let baselines = ScoringBaselines::default();
    let mut metrics = balanced_consumption();
    metrics.category_counts.insert("vegetable".to_string(), 0);

    let imbalances = detect_imbalances(&metrics, &baselines);
    let vegetable = imbalances
        .iter()
        .find(|imbalance| imbalance.category == "vegetable")
        .expect("vegetable imbalance detected");
    assert_eq!(vegetable.kind, ImbalanceKind::Under);
    assert_eq!(vegetable.actual_share, 0.0);

    let score = score_nutrition(&metrics, &baselines);
    let penalty = score
        .factors
        .iter()
        .find(|factor| factor.label == "Category imbalance")
        .expect("imbalance penalty recorded");
    assert_eq!(penalty.delta, -20.0, "full shortfall takes the maximum penalty");
}

#[test]
fn dominant_category_is_penalized_as_over_consumption() {
    let baselines = ScoringBaselines::default();
    let mut metrics = balanced_consumption();
    metrics.category_counts.insert("meat".to_string(), 14);

    let imbalances = detect_imbalances(&metrics, &baselines);
    assert!(imbalances
        .iter()
        .any(|i| i.category == "meat" && i.kind == ImbalanceKind::Over));
}

#[test]
fn nutrient_gap_penalty_scales_with_gap_size() {
    let baselines = ScoringBaselines::default();
    let mut metrics = balanced_consumption();
    metrics.nutrient_gaps = BTreeMap::from([
        ("Vitamin C".to_string(), 45.0),
        ("Iron".to_string(), 15.0), // below threshold, ignored
    ]);

    let score = score_nutrition(&metrics, &baselines);
    let gaps: Vec<_> = score
        .factors
        .iter()
        .filter(|factor| factor.label == "Nutrient gap")
        .collect();
    assert_eq!(gaps.len(), 1, "sub-threshold gaps are ignored");
    assert!(gaps[0].reason.contains("Vitamin C"));
    assert!(gaps[0].delta < -3.0 && gaps[0].delta > -25.0);

    metrics.nutrient_gaps.insert("Vitamin C".to_string(), 100.0);
    let worse = score_nutrition(&metrics, &baselines);
    let max_gap = worse
        .factors
        .iter()
        .find(|factor| factor.label == "Nutrient gap")
        .expect("gap factor present");
    assert_eq!(max_gap.delta, -25.0, "per-nutrient penalty caps at 25");
}

#[test]
fn empty_week_takes_no_imbalance_penalties() {
    let baselines = ScoringBaselines::default();
    let metrics = crate::scoring::domain::ConsumptionMetrics {
        category_counts: BTreeMap::new(),
        nutrient_gaps: BTreeMap::new(),
        distinct_category_count: 0,
        regular_logging_flag: false,
        veg_fruit_servings: 0,
    };
    let score = score_nutrition(&metrics, &baselines);
    assert_eq!(score.value, 100.0, "nothing logged means nothing to judge");
}

#[test]
fn sustainability_bands_reward_low_waste_and_usage() {
    let metrics = super::common::active_tracking();
    let score = score_sustainability(&metrics, 0.4);
    // 60 base + 20 low waste + 15 usage + 10 tracking (meal planning folded, capped).
    assert_eq!(score.value, 100.0);

    let score = score_sustainability(&metrics, 1.1);
    // Low-waste bonus drops to the 1.2 band.
    assert_eq!(score.replayed_value(), score.value);
    assert!(score
        .factors
        .iter()
        .any(|factor| factor.label == "Low waste" && factor.delta == 5.0));
}

#[test]
fn meal_planning_folds_into_the_tracking_bonus() {
    let mut metrics = super::common::active_tracking();
    metrics.expiring_items_used_count = 0;
    metrics.tracking_frequency_ratio = 0.5;

    metrics.meal_planning_used_flag = false;
    let without = score_sustainability(&metrics, 2.0);
    metrics.meal_planning_used_flag = true;
    let with = score_sustainability(&metrics, 2.0);
    assert!(with.value > without.value);
    assert!(
        with.value - without.value <= 2.0 + 1e-9,
        "meal planning adds at most the folded bonus"
    );

    // An already-saturated tracking bonus cannot exceed the cap.
    metrics.tracking_frequency_ratio = 1.0;
    let capped = score_sustainability(&metrics, 2.0);
    let tracking = capped
        .factors
        .iter()
        .find(|factor| factor.label == "Regular tracking")
        .expect("tracking factor recorded");
    assert_eq!(tracking.delta, 10.0);
}

#[test]
fn combiner_matches_the_documented_weights() {
    let weights = ScoreWeights::default();
    let overall = weights.combine(75.0, 80.0, 60.0);
    assert!((overall - (0.40 * 75.0 + 0.35 * 80.0 + 0.25 * 60.0)).abs() < 1e-9);
    assert_eq!(weights.combine(200.0, 200.0, 200.0), 100.0, "combiner clamps");
}
