use std::collections::BTreeSet;

use super::domain::{ComponentScore, ScoreFactor, WasteMetrics};

/// Ordered waste-ratio bands, first match wins. Ratios above the last band
/// fall into the interpolated low range handled in `base_score`.
const RATIO_BANDS: [(f64, f64); 4] = [(0.30, 95.0), (0.50, 85.0), (0.70, 75.0), (1.00, 60.0)];

/// Interpolation endpoints for ratios above the community average: 45 points
/// just past parity, sliding linearly down to a floor of 30 at twice the
/// average or worse.
const OVERAGE_CEILING: f64 = 45.0;
const OVERAGE_FLOOR: f64 = 30.0;

const USAGE_BONUS_PER_ITEM: f64 = 2.0;
const USAGE_BONUS_CAP: f64 = 10.0;
const TREND_BONUS_MIN: f64 = 5.0;
const TREND_BONUS_CAP: f64 = 15.0;
const EXPIRED_PENALTY_PER_ITEM: f64 = 5.0;
const EXPIRED_PENALTY_CAP: f64 = 25.0;

/// Waste reduction score (0-100). Less waste than the community baseline,
/// items rescued before expiry, and a shrinking week-over-week total all push
/// the score up; expired items pull it down.
pub(crate) fn score_waste(metrics: &WasteMetrics) -> ComponentScore {
    let mut factors = Vec::new();

    let ratio = metrics.waste_ratio();
    let base = base_score(metrics.weekly_waste_grams, ratio);
    let base_reason = if metrics.weekly_waste_grams == 0.0 {
        "No food waste recorded this week".to_string()
    } else {
        format!(
            "Wasted {:.0}g against a {:.0}g community average ({:.0}% of baseline)",
            metrics.weekly_waste_grams,
            metrics.community_average_grams,
            ratio * 100.0
        )
    };
    factors.push(ScoreFactor {
        label: "Base score",
        delta: base,
        reason: base_reason,
    });

    let distinct_used: BTreeSet<&str> = metrics
        .expiring_items_used
        .iter()
        .map(String::as_str)
        .collect();
    if !distinct_used.is_empty() {
        let bonus = (distinct_used.len() as f64 * USAGE_BONUS_PER_ITEM).min(USAGE_BONUS_CAP);
        factors.push(ScoreFactor {
            label: "Expiring items used",
            delta: bonus,
            reason: format!(
                "Used {} expiring item(s) before they spoiled: +{:.0}",
                distinct_used.len(),
                bonus
            ),
        });
    }

    if let Some(previous) = metrics.previous_week_waste_grams {
        if previous > metrics.weekly_waste_grams && previous > 0.0 {
            let reduction_pct = (previous - metrics.weekly_waste_grams) / previous * 100.0;
            let bonus = (TREND_BONUS_MIN + reduction_pct / 5.0).min(TREND_BONUS_CAP);
            factors.push(ScoreFactor {
                label: "Improvement trend",
                delta: bonus,
                reason: format!(
                    "Waste down {:.0}% from last week ({:.0}g to {:.0}g)",
                    reduction_pct, previous, metrics.weekly_waste_grams
                ),
            });
        }
    }

    if metrics.expired_item_count > 0 {
        let penalty =
            (metrics.expired_item_count as f64 * EXPIRED_PENALTY_PER_ITEM).min(EXPIRED_PENALTY_CAP);
        factors.push(ScoreFactor {
            label: "Expired items",
            delta: -penalty,
            reason: format!(
                "{} item(s) expired unused: -{:.0}",
                metrics.expired_item_count, penalty
            ),
        });
    }

    ComponentScore::from_factors(factors)
}

fn base_score(weekly_waste_grams: f64, ratio: f64) -> f64 {
    if weekly_waste_grams == 0.0 {
        return 100.0;
    }
    for (upper, points) in RATIO_BANDS {
        if ratio <= upper {
            return points;
        }
    }
    // Linear slide from 45 at parity down to the floor at ratio >= 2.0.
    (OVERAGE_CEILING - (OVERAGE_CEILING - OVERAGE_FLOOR) * (ratio - 1.0)).max(OVERAGE_FLOOR)
}
