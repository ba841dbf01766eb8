use super::domain::{ComponentScore, ScoreFactor, SustainabilityMetrics};

const BASE_SCORE: f64 = 60.0;

/// Ordered waste-ratio bands for the low-waste bonus, first match wins.
const LOW_WASTE_BANDS: [(f64, f64); 4] = [(0.50, 20.0), (0.70, 15.0), (1.00, 10.0), (1.20, 5.0)];

/// Descending count thresholds for the expiring-items-usage bonus.
const USAGE_BANDS: [(u32, f64); 3] = [(5, 15.0), (3, 10.0), (1, 5.0)];

const TRACKING_BONUS_MIN: f64 = 5.0;
const TRACKING_BONUS_MAX: f64 = 10.0;
const TRACKING_MIN_RATIO: f64 = 0.3;
const MEAL_PLANNING_BONUS: f64 = 2.0;

/// Sustainability score (0-100) from a base of 60: rewards staying under the
/// community waste baseline, rescuing expiring items, and tracking regularly.
pub(crate) fn score_sustainability(
    metrics: &SustainabilityMetrics,
    waste_ratio: f64,
) -> ComponentScore {
    let mut factors = vec![ScoreFactor {
        label: "Base score",
        delta: BASE_SCORE,
        reason: "Sustainability baseline".to_string(),
    }];

    for (upper, bonus) in LOW_WASTE_BANDS {
        if waste_ratio <= upper {
            factors.push(ScoreFactor {
                label: "Low waste",
                delta: bonus,
                reason: format!(
                    "Weekly waste at {:.0}% of the community average",
                    waste_ratio * 100.0
                ),
            });
            break;
        }
    }

    for (threshold, bonus) in USAGE_BANDS {
        if metrics.expiring_items_used_count >= threshold {
            factors.push(ScoreFactor {
                label: "Expiring items used",
                delta: bonus,
                reason: format!(
                    "Consumed {} item(s) before expiry",
                    metrics.expiring_items_used_count
                ),
            });
            break;
        }
    }

    let mut tracking_bonus = if metrics.tracking_frequency_ratio >= TRACKING_MIN_RATIO {
        let progress =
            (metrics.tracking_frequency_ratio - TRACKING_MIN_RATIO) / (1.0 - TRACKING_MIN_RATIO);
        TRACKING_BONUS_MIN + (TRACKING_BONUS_MAX - TRACKING_BONUS_MIN) * progress.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if metrics.meal_planning_used_flag {
        tracking_bonus = (tracking_bonus + MEAL_PLANNING_BONUS).min(TRACKING_BONUS_MAX);
    }
    if tracking_bonus > 0.0 {
        let reason = if metrics.meal_planning_used_flag {
            format!(
                "Tracked activity on {:.0}% of days, with meal planning",
                metrics.tracking_frequency_ratio * 100.0
            )
        } else {
            format!(
                "Tracked activity on {:.0}% of days",
                metrics.tracking_frequency_ratio * 100.0
            )
        };
        factors.push(ScoreFactor {
            label: "Regular tracking",
            delta: tracking_bonus,
            reason,
        });
    }

    ComponentScore::from_factors(factors)
}
