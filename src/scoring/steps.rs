use crate::config::ScoringBaselines;

use super::domain::{
    ActionableStep, PointRange, ScoreSnapshot, StepCategory, StepPriority, WeeklyMetrics,
};
use super::nutrition::{detect_imbalances, ImbalanceKind, ImbalanceSeverity};

const WASTE_ATTENTION: f64 = 75.0;
const NUTRITION_ATTENTION: f64 = 80.0;
const SUSTAINABILITY_ATTENTION: f64 = 75.0;
const HIGH_PRIORITY_SCORE: f64 = 60.0;
const MAX_STEPS: usize = 6;

/// Rule-based recommendation generator. Always deterministic, independent of
/// the augmentation path, so the recommendations panel is reproducible.
/// Returns at most six steps sorted by priority, then expected improvement,
/// then category.
pub(crate) fn generate_steps(
    snapshot: &ScoreSnapshot,
    metrics: &WeeklyMetrics,
    baselines: &ScoringBaselines,
) -> Vec<ActionableStep> {
    let mut steps = Vec::new();
    waste_steps(snapshot, metrics, baselines, &mut steps);
    nutrition_steps(snapshot, metrics, baselines, &mut steps);
    sustainability_steps(snapshot, metrics, &mut steps);

    steps.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| b.expected_improvement.low.total_cmp(&a.expected_improvement.low))
            .then_with(|| a.category.rank().cmp(&b.category.rank()))
    });
    steps.truncate(MAX_STEPS);
    steps
}

fn waste_steps(
    snapshot: &ScoreSnapshot,
    metrics: &WeeklyMetrics,
    baselines: &ScoringBaselines,
    steps: &mut Vec<ActionableStep>,
) {
    let score = snapshot.waste.value;
    let waste = &metrics.waste;
    let needs_attention = score < WASTE_ATTENTION;

    if !waste.expiring_soon_items.is_empty() {
        let named = waste
            .expiring_soon_items
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        steps.push(ActionableStep {
            action: format!("Use expiring items first: {named}"),
            priority: StepPriority::High,
            category: StepCategory::Waste,
            expected_improvement: PointRange::new(12.0, 18.0),
            boost_percentage: None,
            specific: true,
        });
    }

    if waste.expired_item_count > 0 {
        // Recovering the expired-item penalty anchors the estimate.
        let penalty = (f64::from(waste.expired_item_count) * 5.0).min(25.0);
        steps.push(ActionableStep {
            action: format!(
                "{} item(s) expired this week - check expiration dates and use FIFO (First In, First Out)",
                waste.expired_item_count
            ),
            priority: StepPriority::High,
            category: StepCategory::Waste,
            expected_improvement: PointRange::new((penalty * 0.6).round(), penalty),
            boost_percentage: None,
            specific: true,
        });
    }

    if needs_attention && waste.weekly_waste_grams > baselines.high_waste_grams {
        steps.push(ActionableStep {
            action: "Plan meals around your inventory to reduce waste".to_string(),
            priority: StepPriority::High,
            category: StepCategory::Waste,
            expected_improvement: PointRange::new(10.0, 15.0),
            boost_percentage: None,
            specific: false,
        });
    }

    if needs_attention {
        steps.push(ActionableStep {
            action: "Review your inventory before shopping to avoid overbuying".to_string(),
            priority: StepPriority::Medium,
            category: StepCategory::Waste,
            expected_improvement: PointRange::new(8.0, 12.0),
            boost_percentage: None,
            specific: false,
        });
    }
}

fn nutrition_steps(
    snapshot: &ScoreSnapshot,
    metrics: &WeeklyMetrics,
    baselines: &ScoringBaselines,
    steps: &mut Vec<ActionableStep>,
) {
    let score = snapshot.nutrition.value;
    let needs_attention = score < NUTRITION_ATTENTION;

    if needs_attention {
        let under: Vec<_> = detect_imbalances(&metrics.consumption, baselines)
            .into_iter()
            .filter(|imbalance| imbalance.kind == ImbalanceKind::Under)
            .take(2)
            .collect();
        for imbalance in under {
            let priority = if score < HIGH_PRIORITY_SCORE
                || imbalance.severity == ImbalanceSeverity::High
            {
                StepPriority::High
            } else {
                StepPriority::Medium
            };
            steps.push(ActionableStep {
                action: format!(
                    "Add more {} to your meals - you're below the recommended share",
                    imbalance.category
                ),
                priority,
                category: StepCategory::Nutrition,
                expected_improvement: PointRange::new(10.0, 15.0),
                boost_percentage: Some(PointRange::new(10.0, 15.0)),
                specific: true,
            });
        }
    }

    let mut gaps: Vec<(&String, f64)> = metrics
        .consumption
        .nutrient_gaps
        .iter()
        .filter(|(_, gap)| **gap > baselines.nutrient_gap_threshold)
        .map(|(nutrient, gap)| (nutrient, *gap))
        .collect();
    gaps.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (nutrient, gap) in gaps.into_iter().take(2) {
        let points = (gap * 0.3).min(15.0).round();
        let low = (points * 0.6).round();
        let priority = if score < HIGH_PRIORITY_SCORE || gap > baselines.severe_gap_threshold {
            StepPriority::High
        } else {
            StepPriority::Medium
        };
        steps.push(ActionableStep {
            action: format!("Increase {nutrient} intake - you have a {gap:.0}% gap"),
            priority,
            category: StepCategory::Nutrition,
            expected_improvement: PointRange::new(low, points),
            boost_percentage: Some(PointRange::new(low, points)),
            specific: true,
        });
    }

    if metrics.consumption.distinct_category_count < 4 {
        steps.push(ActionableStep {
            action: format!(
                "Add more variety to your diet - aim for {}+ different food categories per week",
                baselines.variety_saturation.saturating_sub(1).max(4)
            ),
            priority: StepPriority::Medium,
            category: StepCategory::Nutrition,
            expected_improvement: PointRange::new(8.0, 12.0),
            boost_percentage: Some(PointRange::new(8.0, 12.0)),
            specific: false,
        });
    }
}

fn sustainability_steps(
    snapshot: &ScoreSnapshot,
    metrics: &WeeklyMetrics,
    steps: &mut Vec<ActionableStep>,
) {
    if snapshot.sustainability.value >= SUSTAINABILITY_ATTENTION {
        return;
    }

    if metrics.sustainability.tracking_frequency_ratio < 1.0 {
        steps.push(ActionableStep {
            action: "Log your food consumption daily for better tracking and awareness"
                .to_string(),
            priority: StepPriority::Medium,
            category: StepCategory::Sustainability,
            expected_improvement: PointRange::new(5.0, 10.0),
            boost_percentage: None,
            specific: false,
        });
    }

    if !metrics.sustainability.meal_planning_used_flag {
        steps.push(ActionableStep {
            action: "Plan next week's meals in advance to organize shopping and cut waste"
                .to_string(),
            priority: StepPriority::Medium,
            category: StepCategory::Sustainability,
            expected_improvement: PointRange::new(8.0, 12.0),
            boost_percentage: None,
            specific: false,
        });
    }
}
