use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;

use foodprint::scoring::{
    ConsumptionMetrics, ImpactScorer, InMemoryMetricsProvider, ScoreRequest, StepPriority,
    SustainabilityMetrics, UserId, WasteMetrics, WeeklyMetrics,
};

fn waste_metrics_strategy() -> impl Strategy<Value = WasteMetrics> {
    (
        0.0f64..5_000.0,
        1.0f64..2_000.0,
        0u32..20,
        0usize..8,
        proptest::option::of(0.0f64..5_000.0),
    )
        .prop_map(|(waste, community, expired, used, previous)| WasteMetrics {
            weekly_waste_grams: waste,
            community_average_grams: community,
            expired_item_count: expired,
            expiring_items_used: (0..used).map(|i| format!("item-{i}")).collect(),
            expiring_soon_items: Vec::new(),
            previous_week_waste_grams: previous,
            estimated_waste_cost: None,
        })
}

fn consumption_metrics_strategy() -> impl Strategy<Value = ConsumptionMetrics> {
    (
        proptest::collection::btree_map("[a-z]{3,9}", 0u32..20, 0..6),
        proptest::collection::btree_map("[A-Z][a-z]{2,8}", 0.0f64..100.0, 0..4),
        0u32..10,
        any::<bool>(),
        0u32..30,
    )
        .prop_map(
            |(category_counts, nutrient_gaps, distinct, regular, veg)| ConsumptionMetrics {
                category_counts,
                nutrient_gaps,
                distinct_category_count: distinct,
                regular_logging_flag: regular,
                veg_fruit_servings: veg,
            },
        )
}

fn sustainability_metrics_strategy() -> impl Strategy<Value = SustainabilityMetrics> {
    (0.0f64..=1.0, any::<bool>(), 0u32..15).prop_map(|(ratio, planning, used)| {
        SustainabilityMetrics {
            tracking_frequency_ratio: ratio,
            meal_planning_used_flag: planning,
            expiring_items_used_count: used,
        }
    })
}

fn weekly_metrics_strategy() -> impl Strategy<Value = WeeklyMetrics> {
    (
        waste_metrics_strategy(),
        consumption_metrics_strategy(),
        sustainability_metrics_strategy(),
    )
        .prop_map(|(waste, consumption, sustainability)| WeeklyMetrics {
            waste,
            consumption,
            sustainability,
        })
}

fn score(metrics: WeeklyMetrics) -> foodprint::scoring::ScoreReport {
    let user = UserId("prop-user".to_string());
    let week = NaiveDate::from_ymd_opt(2026, 8, 24).expect("valid week start");
    let mut provider = InMemoryMetricsProvider::new();
    provider.insert(user.clone(), week, metrics);
    ImpactScorer::new(Arc::new(provider))
        .compute_score(&ScoreRequest::new(user, week))
        .expect("valid metrics score")
}

proptest! {
    #[test]
    fn all_scores_stay_within_range(metrics in weekly_metrics_strategy()) {
        let report = score(metrics);
        let snapshot = &report.snapshot;
        for value in [
            snapshot.overall,
            snapshot.waste.value,
            snapshot.nutrition.value,
            snapshot.sustainability.value,
        ] {
            prop_assert!((0.0..=100.0).contains(&value), "out of range: {value}");
        }
    }

    #[test]
    fn overall_is_the_weighted_component_sum(metrics in weekly_metrics_strategy()) {
        let report = score(metrics);
        let snapshot = &report.snapshot;
        let expected = 0.40 * snapshot.waste.value
            + 0.35 * snapshot.nutrition.value
            + 0.25 * snapshot.sustainability.value;
        prop_assert!((snapshot.overall - expected).abs() < 1e-9);
    }

    #[test]
    fn factor_replay_reproduces_each_component(metrics in weekly_metrics_strategy()) {
        let report = score(metrics);
        let snapshot = &report.snapshot;
        for component in [&snapshot.waste, &snapshot.nutrition, &snapshot.sustainability] {
            prop_assert!((component.replayed_value() - component.value).abs() < 1e-9);
        }
    }

    #[test]
    fn less_waste_never_lowers_the_waste_score(
        mut metrics in weekly_metrics_strategy(),
        reduction in 0.0f64..=1.0,
    ) {
        let before = score(metrics.clone()).snapshot.waste.value;
        metrics.waste.weekly_waste_grams *= reduction;
        let after = score(metrics).snapshot.waste.value;
        prop_assert!(after + 1e-9 >= before, "waste score dropped from {before} to {after}");
    }

    #[test]
    fn more_expired_items_never_raise_the_waste_score(
        mut metrics in weekly_metrics_strategy(),
        extra in 1u32..10,
    ) {
        let before = score(metrics.clone()).snapshot.waste.value;
        metrics.waste.expired_item_count += extra;
        let after = score(metrics).snapshot.waste.value;
        prop_assert!(after <= before + 1e-9, "waste score rose from {before} to {after}");
    }

    #[test]
    fn steps_are_always_sorted_as_documented(metrics in weekly_metrics_strategy()) {
        let report = score(metrics);
        for pair in report.steps.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let rank = |priority: StepPriority| match priority {
                StepPriority::High => 0,
                StepPriority::Medium => 1,
            };
            prop_assert!(
                rank(a.priority) < rank(b.priority)
                    || (rank(a.priority) == rank(b.priority)
                        && a.expected_improvement.low + 1e-9 >= b.expected_improvement.low),
                "steps out of order: {:?} before {:?}",
                a.action,
                b.action
            );
        }
    }

    #[test]
    fn insight_count_is_always_three_to_five(metrics in weekly_metrics_strategy()) {
        let report = score(metrics);
        prop_assert!((3..=5).contains(&report.insights.len()));
    }
}
