use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::scoring::domain::{
    ComponentScore, ConsumptionMetrics, ScoreFactor, ScoreSnapshot, SustainabilityMetrics, UserId,
    WasteMetrics, WeeklyMetrics,
};

pub(super) fn user() -> UserId {
    UserId("user-42".to_string())
}

pub(super) fn week_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 24).expect("valid week start")
}

pub(super) fn fixed_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).single().expect("valid instant")
}

/// A week with no waste and an evenly balanced diet.
pub(super) fn clean_waste() -> WasteMetrics {
    WasteMetrics {
        weekly_waste_grams: 0.0,
        community_average_grams: 500.0,
        expired_item_count: 0,
        expiring_items_used: Vec::new(),
        expiring_soon_items: Vec::new(),
        previous_week_waste_grams: None,
        estimated_waste_cost: None,
    }
}

/// Category counts matching the default expected shares exactly.
pub(super) fn balanced_consumption() -> ConsumptionMetrics {
    let category_counts = BTreeMap::from([
        ("vegetable".to_string(), 6),
        ("fruit".to_string(), 4),
        ("grain".to_string(), 5),
        ("dairy".to_string(), 2),
        ("meat".to_string(), 2),
        ("other".to_string(), 1),
    ]);
    ConsumptionMetrics {
        category_counts,
        nutrient_gaps: BTreeMap::new(),
        distinct_category_count: 6,
        regular_logging_flag: true,
        veg_fruit_servings: 10,
    }
}

pub(super) fn active_tracking() -> SustainabilityMetrics {
    SustainabilityMetrics {
        tracking_frequency_ratio: 1.0,
        meal_planning_used_flag: true,
        expiring_items_used_count: 5,
    }
}

pub(super) fn clean_week() -> WeeklyMetrics {
    WeeklyMetrics {
        waste: clean_waste(),
        consumption: balanced_consumption(),
        sustainability: active_tracking(),
    }
}

/// A middling week: 450g against a 1000g baseline with two expired items.
pub(super) fn wasteful_week() -> WeeklyMetrics {
    let mut metrics = clean_week();
    metrics.waste = WasteMetrics {
        weekly_waste_grams: 450.0,
        community_average_grams: 1000.0,
        expired_item_count: 2,
        expiring_items_used: Vec::new(),
        expiring_soon_items: Vec::new(),
        previous_week_waste_grams: None,
        estimated_waste_cost: Some(13.50),
    };
    metrics.sustainability.expiring_items_used_count = 0;
    metrics
}

/// Build a snapshot with fixed component values, for generator tests.
pub(super) fn snapshot_with(waste: f64, nutrition: f64, sustainability: f64) -> ScoreSnapshot {
    let component = |value: f64| {
        ComponentScore::from_factors(vec![ScoreFactor {
            label: "Base score",
            delta: value,
            reason: "fixture".to_string(),
        }])
    };
    let overall = 0.40 * waste + 0.35 * nutrition + 0.25 * sustainability;
    ScoreSnapshot {
        user_id: user(),
        week_start: week_start(),
        overall,
        waste: component(waste),
        nutrition: component(nutrition),
        sustainability: component(sustainability),
        computed_at: fixed_instant(),
    }
}
