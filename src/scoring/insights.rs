use crate::config::ScoringBaselines;

use super::domain::{
    ComponentScore, ImpactTier, Insight, InsightKind, PointRange, ScoreCategory, ScoreSnapshot,
    WeeklyMetrics,
};
use super::nutrition::{detect_imbalances, ImbalanceKind};

/// Components below this score always get a narrative insight.
const ATTENTION_THRESHOLD: f64 = 70.0;
/// Overall deltas smaller than this are treated as noise.
const DELTA_THRESHOLD: f64 = 0.5;
const STRONG_DELTA: f64 = 5.0;

const MIN_INSIGHTS: usize = 3;
const MAX_INSIGHTS: usize = 5;

/// Deterministic insight generation: compare the current snapshot against the
/// previous week and the factor trails, and narrate the drivers with concrete
/// figures. Returns 3-5 insights ordered highest impact first.
pub(crate) fn generate_insights(
    snapshot: &ScoreSnapshot,
    previous: Option<&ScoreSnapshot>,
    metrics: &WeeklyMetrics,
    baselines: &ScoringBaselines,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(previous) = previous {
        let delta = snapshot.overall - previous.overall;
        if delta.abs() >= DELTA_THRESHOLD {
            insights.push(overall_delta_insight(delta));
        }
    }

    insights.extend(waste_insight(snapshot, metrics, baselines));
    insights.extend(nutrition_insight(snapshot, metrics, baselines));
    insights.extend(sustainability_insight(snapshot, metrics, baselines));

    rank_insights(&mut insights);

    for filler in standing_insights(snapshot, metrics) {
        if insights.len() >= MIN_INSIGHTS {
            break;
        }
        // Never restate a category the rules already narrated.
        if insights.iter().any(|existing| existing.category == filler.category) {
            continue;
        }
        insights.push(filler);
    }
    insights.truncate(MAX_INSIGHTS);
    insights
}

/// Stable sort by impact tier so high-impact findings lead the panel.
pub(crate) fn rank_insights(insights: &mut [Insight]) {
    insights.sort_by_key(|insight| insight.impact.rank());
}

/// A component deserves narration even with a decent score when a single
/// factor cost it a material number of points.
fn has_material_penalty(component: &ComponentScore, baselines: &ScoringBaselines) -> bool {
    component
        .worst_penalty()
        .map(|factor| factor.delta <= -baselines.material_penalty)
        .unwrap_or(false)
}

fn overall_delta_insight(delta: f64) -> Insight {
    if delta > 0.0 {
        let message = if delta >= STRONG_DELTA {
            format!(
                "Great progress! Your overall score improved by {delta:.1} points this week."
            )
        } else {
            format!("Your overall score improved by {delta:.1} points this week.")
        };
        Insight {
            kind: InsightKind::Success,
            category: ScoreCategory::Overall,
            message,
            impact: if delta >= STRONG_DELTA {
                ImpactTier::Medium
            } else {
                ImpactTier::Low
            },
            potential_points: None,
        }
    } else {
        let drop = delta.abs();
        Insight {
            kind: InsightKind::Warning,
            category: ScoreCategory::Overall,
            message: format!(
                "Your overall score decreased by {drop:.1} points. Focus on the recommended actions below."
            ),
            impact: if drop >= STRONG_DELTA {
                ImpactTier::High
            } else {
                ImpactTier::Medium
            },
            potential_points: Some(PointRange::new(drop, drop + 5.0)),
        }
    }
}

fn waste_insight(
    snapshot: &ScoreSnapshot,
    metrics: &WeeklyMetrics,
    baselines: &ScoringBaselines,
) -> Option<Insight> {
    let score = snapshot.waste.value;

    if score < ATTENTION_THRESHOLD || has_material_penalty(&snapshot.waste, baselines) {
        let grams = metrics.waste.weekly_waste_grams;
        let cost_clause = metrics
            .waste
            .estimated_waste_cost
            .map(|cost| format!(" (about ${cost:.2})"))
            .unwrap_or_default();
        let (impact, potential) = if score < 60.0 {
            (ImpactTier::High, PointRange::new(15.0, 20.0))
        } else {
            (ImpactTier::Medium, PointRange::new(10.0, 15.0))
        };
        return Some(Insight {
            kind: InsightKind::Warning,
            category: ScoreCategory::Waste,
            message: format!(
                "Your waste reduction score is {score:.1}/100. You're wasting {grams:.0}g per week{cost_clause}. Focus on using items before they expire."
            ),
            impact,
            potential_points: Some(potential),
        });
    }

    if score >= 80.0 {
        return Some(Insight {
            kind: InsightKind::Success,
            category: ScoreCategory::Waste,
            message: format!(
                "Excellent waste management! Your score is {score:.1}/100. Keep up the great work!"
            ),
            impact: ImpactTier::Low,
            potential_points: None,
        });
    }

    None
}

fn nutrition_insight(
    snapshot: &ScoreSnapshot,
    metrics: &WeeklyMetrics,
    baselines: &ScoringBaselines,
) -> Option<Insight> {
    let score = snapshot.nutrition.value;

    if score < ATTENTION_THRESHOLD || has_material_penalty(&snapshot.nutrition, baselines) {
        let under: Vec<String> = detect_imbalances(&metrics.consumption, baselines)
            .into_iter()
            .filter(|imbalance| imbalance.kind == ImbalanceKind::Under)
            .map(|imbalance| imbalance.category)
            .collect();

        if !under.is_empty() {
            let named = under
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            return Some(Insight {
                kind: InsightKind::Info,
                category: ScoreCategory::Nutrition,
                message: format!(
                    "Your nutrition score is {score:.1}/100. You're under-consuming: {named}. Adding these can boost your score significantly."
                ),
                impact: ImpactTier::High,
                potential_points: Some(PointRange::new(10.0, 15.0)),
            });
        }

        let mut gaps: Vec<(&String, &f64)> = metrics
            .consumption
            .nutrient_gaps
            .iter()
            .filter(|(_, gap)| **gap > baselines.nutrient_gap_threshold)
            .collect();
        gaps.sort_by(|a, b| b.1.total_cmp(a.1));
        if !gaps.is_empty() {
            let named = gaps
                .iter()
                .take(2)
                .map(|(nutrient, gap)| format!("{nutrient} ({gap:.0}% below target)"))
                .collect::<Vec<_>>()
                .join(", ");
            return Some(Insight {
                kind: InsightKind::Info,
                category: ScoreCategory::Nutrition,
                message: format!(
                    "Your nutrition score is {score:.1}/100. Nutrient gaps detected: {named}. Focus on foods rich in these nutrients."
                ),
                impact: ImpactTier::Medium,
                potential_points: Some(PointRange::new(8.0, 12.0)),
            });
        }

        return Some(Insight {
            kind: InsightKind::Info,
            category: ScoreCategory::Nutrition,
            message: format!(
                "Your nutrition score is {score:.1}/100. A wider mix of food categories would raise it."
            ),
            impact: ImpactTier::Medium,
            potential_points: Some(PointRange::new(5.0, 10.0)),
        });
    }

    if score >= 85.0 {
        return Some(Insight {
            kind: InsightKind::Success,
            category: ScoreCategory::Nutrition,
            message: format!("Great nutrition balance! Your score is {score:.1}/100."),
            impact: ImpactTier::Low,
            potential_points: None,
        });
    }

    None
}

fn sustainability_insight(
    snapshot: &ScoreSnapshot,
    metrics: &WeeklyMetrics,
    baselines: &ScoringBaselines,
) -> Option<Insight> {
    let score = snapshot.sustainability.value;

    if score < ATTENTION_THRESHOLD || has_material_penalty(&snapshot.sustainability, baselines) {
        let tracked_pct = metrics.sustainability.tracking_frequency_ratio * 100.0;
        return Some(Insight {
            kind: InsightKind::Info,
            category: ScoreCategory::Sustainability,
            message: format!(
                "Your sustainability score is {score:.1}/100. You tracked activity on {tracked_pct:.0}% of days; regular tracking and meal planning can help improve this."
            ),
            impact: ImpactTier::Medium,
            potential_points: Some(PointRange::new(10.0, 15.0)),
        });
    }

    if score >= 85.0 {
        return Some(Insight {
            kind: InsightKind::Success,
            category: ScoreCategory::Sustainability,
            message: format!(
                "Excellent sustainability practices! Your score is {score:.1}/100."
            ),
            impact: ImpactTier::Low,
            potential_points: None,
        });
    }

    None
}

/// Low-impact filler used only when the rules above produce fewer than three
/// insights (typically a strong or unremarkable week with no previous
/// baseline).
fn standing_insights(snapshot: &ScoreSnapshot, metrics: &WeeklyMetrics) -> Vec<Insight> {
    vec![
        Insight {
            kind: InsightKind::Info,
            category: ScoreCategory::Overall,
            message: format!(
                "Your overall impact score is {:.1}/100 this week.",
                snapshot.overall_rounded()
            ),
            impact: ImpactTier::Low,
            potential_points: None,
        },
        Insight {
            kind: InsightKind::Info,
            category: ScoreCategory::Waste,
            message: format!(
                "You wasted {:.0}g this week against a {:.0}g community average.",
                metrics.waste.weekly_waste_grams, metrics.waste.community_average_grams
            ),
            impact: ImpactTier::Low,
            potential_points: None,
        },
        Insight {
            kind: InsightKind::Info,
            category: ScoreCategory::Sustainability,
            message: "Keep logging daily to hold on to your tracking and trend bonuses."
                .to_string(),
            impact: ImpactTier::Low,
            potential_points: None,
        },
    ]
}
