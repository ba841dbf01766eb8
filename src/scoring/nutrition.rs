use crate::config::ScoringBaselines;

use super::domain::{ComponentScore, ConsumptionMetrics, ScoreFactor};

const BASE_SCORE: f64 = 100.0;

const UNDER_PENALTY_MIN: f64 = 6.0;
const UNDER_PENALTY_MAX: f64 = 20.0;
const OVER_PENALTY_MIN: f64 = 5.0;
const OVER_PENALTY_MAX: f64 = 10.0;
const GAP_PENALTY_MIN: f64 = 3.0;
const GAP_PENALTY_MAX: f64 = 25.0;
const VARIETY_BONUS_MIN: f64 = 2.0;
const VARIETY_BONUS_MAX: f64 = 15.0;
const VARIETY_MIN_CATEGORIES: u32 = 3;
const REGULAR_BONUS_MIN: f64 = 5.0;
const REGULAR_BONUS_MAX: f64 = 10.0;
const VEG_FRUIT_BONUS_MIN: f64 = 5.0;
const VEG_FRUIT_BONUS_MAX: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImbalanceKind {
    Under,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImbalanceSeverity {
    High,
    Medium,
}

/// One category consumed well outside its expected share of the week's logs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryImbalance {
    pub category: String,
    pub kind: ImbalanceKind,
    pub severity: ImbalanceSeverity,
    pub actual_share: f64,
    pub expected_share: f64,
}

/// Compare logged category shares against the baseline's expected shares.
/// Under-consumption starts below half the expected share (high severity
/// below 30% of it); over-consumption starts above 150% of it.
pub(crate) fn detect_imbalances(
    metrics: &ConsumptionMetrics,
    baselines: &ScoringBaselines,
) -> Vec<CategoryImbalance> {
    let total = metrics.total_logged();
    if total == 0 {
        return Vec::new();
    }
    let total = f64::from(total);

    let mut imbalances = Vec::new();
    for (category, expected_share) in &baselines.expected_category_shares {
        let count = metrics.category_counts.get(category).copied().unwrap_or(0);
        let actual_share = f64::from(count) / total;

        if actual_share < expected_share * 0.5 {
            let severity = if actual_share < expected_share * 0.3 {
                ImbalanceSeverity::High
            } else {
                ImbalanceSeverity::Medium
            };
            imbalances.push(CategoryImbalance {
                category: category.clone(),
                kind: ImbalanceKind::Under,
                severity,
                actual_share,
                expected_share: *expected_share,
            });
        } else if actual_share > expected_share * 1.5 {
            imbalances.push(CategoryImbalance {
                category: category.clone(),
                kind: ImbalanceKind::Over,
                severity: ImbalanceSeverity::Medium,
                actual_share,
                expected_share: *expected_share,
            });
        }
    }

    imbalances
}

/// Nutrition score (0-100): starts at 100, loses points to category
/// imbalances and nutrient gaps, regains them for variety, regular logging,
/// and vegetable/fruit servings.
pub(crate) fn score_nutrition(
    metrics: &ConsumptionMetrics,
    baselines: &ScoringBaselines,
) -> ComponentScore {
    let mut factors = vec![ScoreFactor {
        label: "Base score",
        delta: BASE_SCORE,
        reason: "Balanced consumption baseline".to_string(),
    }];

    for imbalance in detect_imbalances(metrics, baselines) {
        let (delta, reason) = match imbalance.kind {
            ImbalanceKind::Under => {
                // Shortfall runs from 0.5 (boundary) to 1.0 (nothing logged).
                let shortfall = 1.0 - imbalance.actual_share / imbalance.expected_share;
                let penalty = UNDER_PENALTY_MIN
                    + (UNDER_PENALTY_MAX - UNDER_PENALTY_MIN)
                        * ((shortfall - 0.5) / 0.5).clamp(0.0, 1.0);
                (
                    -penalty,
                    format!(
                        "Low {} consumption ({:.1}% of logs vs {:.1}% recommended)",
                        imbalance.category,
                        imbalance.actual_share * 100.0,
                        imbalance.expected_share * 100.0
                    ),
                )
            }
            ImbalanceKind::Over => {
                let excess = imbalance.actual_share / imbalance.expected_share - 1.5;
                let penalty = OVER_PENALTY_MIN
                    + (OVER_PENALTY_MAX - OVER_PENALTY_MIN) * (excess / 1.5).clamp(0.0, 1.0);
                (
                    -penalty,
                    format!(
                        "High {} consumption ({:.1}% of logs vs {:.1}% recommended)",
                        imbalance.category,
                        imbalance.actual_share * 100.0,
                        imbalance.expected_share * 100.0
                    ),
                )
            }
        };
        factors.push(ScoreFactor {
            label: "Category imbalance",
            delta,
            reason,
        });
    }

    for (nutrient, gap) in &metrics.nutrient_gaps {
        if *gap <= baselines.nutrient_gap_threshold {
            continue;
        }
        let span = 100.0 - baselines.nutrient_gap_threshold;
        let penalty = (GAP_PENALTY_MIN
            + (GAP_PENALTY_MAX - GAP_PENALTY_MIN) * ((gap - baselines.nutrient_gap_threshold) / span))
            .min(GAP_PENALTY_MAX);
        factors.push(ScoreFactor {
            label: "Nutrient gap",
            delta: -penalty,
            reason: format!("{nutrient} intake {gap:.0}% below the recommended level"),
        });
    }

    if metrics.distinct_category_count >= VARIETY_MIN_CATEGORIES {
        let span = baselines
            .variety_saturation
            .saturating_sub(VARIETY_MIN_CATEGORIES)
            .max(1);
        let progress = f64::from(metrics.distinct_category_count - VARIETY_MIN_CATEGORIES)
            / f64::from(span);
        let bonus = VARIETY_BONUS_MIN
            + (VARIETY_BONUS_MAX - VARIETY_BONUS_MIN) * progress.clamp(0.0, 1.0);
        factors.push(ScoreFactor {
            label: "Variety bonus",
            delta: bonus,
            reason: format!(
                "Logged {} distinct food categories",
                metrics.distinct_category_count
            ),
        });
    }

    if metrics.regular_logging_flag {
        let total = f64::from(metrics.total_logged());
        let half_target = f64::from(baselines.regular_logging_target) / 2.0;
        let progress = ((total - half_target) / half_target).clamp(0.0, 1.0);
        let bonus = REGULAR_BONUS_MIN + (REGULAR_BONUS_MAX - REGULAR_BONUS_MIN) * progress;
        factors.push(ScoreFactor {
            label: "Regular logging",
            delta: bonus,
            reason: format!("Logged consumption consistently ({:.0} entries)", total),
        });
    }

    let half_veg_target = f64::from(baselines.veg_fruit_target) / 2.0;
    let servings = f64::from(metrics.veg_fruit_servings);
    if servings >= half_veg_target && half_veg_target > 0.0 {
        let progress = ((servings - half_veg_target) / half_veg_target).clamp(0.0, 1.0);
        let bonus = VEG_FRUIT_BONUS_MIN + (VEG_FRUIT_BONUS_MAX - VEG_FRUIT_BONUS_MIN) * progress;
        factors.push(ScoreFactor {
            label: "Vegetables & fruit",
            delta: bonus,
            reason: format!("{} vegetable/fruit servings this week", metrics.veg_fruit_servings),
        });
    }

    ComponentScore::from_factors(factors)
}
