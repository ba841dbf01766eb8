use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for the person being scored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Waste-side inputs aggregated for one user and week by the metrics builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteMetrics {
    /// Grams of food estimated wasted this week.
    pub weekly_waste_grams: f64,
    /// External community baseline for the same period, always positive.
    pub community_average_grams: f64,
    /// Inventory items that expired unused during the week.
    pub expired_item_count: u32,
    /// Names of items consumed before their expiration date.
    #[serde(default)]
    pub expiring_items_used: Vec<String>,
    /// Items currently flagged as expiring soon, for recommendations.
    #[serde(default)]
    pub expiring_soon_items: Vec<String>,
    /// Prior week's waste, absent for a user's first tracked week.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_week_waste_grams: Option<f64>,
    /// Estimated dollar value of this week's waste, when the builder knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_waste_cost: Option<f64>,
}

impl WasteMetrics {
    /// Waste relative to the community baseline. Ratio 1.0 means the user
    /// wastes exactly as much as the community average.
    pub fn waste_ratio(&self) -> f64 {
        self.weekly_waste_grams / self.community_average_grams
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if !self.weekly_waste_grams.is_finite() || self.weekly_waste_grams < 0.0 {
            return Err(format!(
                "weekly_waste_grams must be finite and non-negative, got {}",
                self.weekly_waste_grams
            ));
        }
        if !self.community_average_grams.is_finite() || self.community_average_grams <= 0.0 {
            return Err(format!(
                "community_average_grams must be positive, got {}",
                self.community_average_grams
            ));
        }
        if let Some(previous) = self.previous_week_waste_grams {
            if !previous.is_finite() || previous < 0.0 {
                return Err(format!(
                    "previous_week_waste_grams must be finite and non-negative, got {previous}"
                ));
            }
        }
        Ok(())
    }
}

/// Consumption-side inputs for one user and week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionMetrics {
    /// Logged entries per food category this week.
    #[serde(default)]
    pub category_counts: BTreeMap<String, u32>,
    /// Detected nutrient deficits as percentages (positive = deficit).
    #[serde(default)]
    pub nutrient_gaps: BTreeMap<String, f64>,
    /// Distinct categories logged this week.
    pub distinct_category_count: u32,
    /// True when the user logged consumption on most days of the week.
    pub regular_logging_flag: bool,
    /// Vegetable and fruit servings logged this week.
    pub veg_fruit_servings: u32,
}

impl ConsumptionMetrics {
    pub fn total_logged(&self) -> u32 {
        self.category_counts.values().sum()
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        for (nutrient, gap) in &self.nutrient_gaps {
            if !gap.is_finite() || *gap < 0.0 || *gap > 100.0 {
                return Err(format!(
                    "nutrient gap for {nutrient} must be within 0-100, got {gap}"
                ));
            }
        }
        Ok(())
    }
}

/// Tracking-behavior inputs for one user and week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SustainabilityMetrics {
    /// Fraction of days with any log or inventory activity (0-1).
    pub tracking_frequency_ratio: f64,
    /// True when the user planned meals this week.
    pub meal_planning_used_flag: bool,
    /// Items consumed before expiry, shared with the waste metrics.
    pub expiring_items_used_count: u32,
}

impl SustainabilityMetrics {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if !self.tracking_frequency_ratio.is_finite()
            || self.tracking_frequency_ratio < 0.0
            || self.tracking_frequency_ratio > 1.0
        {
            return Err(format!(
                "tracking_frequency_ratio must be within 0-1, got {}",
                self.tracking_frequency_ratio
            ));
        }
        Ok(())
    }
}

/// The full metric bundle delivered by the metrics-builder collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMetrics {
    pub waste: WasteMetrics,
    pub consumption: ConsumptionMetrics,
    pub sustainability: SustainabilityMetrics,
}

impl WeeklyMetrics {
    pub(crate) fn validate(&self) -> Result<(), String> {
        self.waste.validate()?;
        self.consumption.validate()?;
        self.sustainability.validate()
    }
}

/// One bonus or penalty applied while computing a component score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreFactor {
    pub label: &'static str,
    pub delta: f64,
    pub reason: String,
}

/// A 0-100 component score plus the ordered factor trail that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentScore {
    pub value: f64,
    pub factors: Vec<ScoreFactor>,
}

impl ComponentScore {
    /// Build a score from its factor list so the clamped factor sum always
    /// reproduces `value`.
    pub(crate) fn from_factors(factors: Vec<ScoreFactor>) -> Self {
        let total: f64 = factors.iter().map(|factor| factor.delta).sum();
        Self {
            value: total.clamp(0.0, 100.0),
            factors,
        }
    }

    /// Re-derive the value from the recorded factors, for audits.
    pub fn replayed_value(&self) -> f64 {
        self.factors
            .iter()
            .map(|factor| factor.delta)
            .sum::<f64>()
            .clamp(0.0, 100.0)
    }

    /// Strongest penalty applied, if any (delta below zero).
    pub fn worst_penalty(&self) -> Option<&ScoreFactor> {
        self.factors
            .iter()
            .filter(|factor| factor.delta < 0.0)
            .min_by(|a, b| a.delta.total_cmp(&b.delta))
    }
}

/// Immutable scoring result for one user and one week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSnapshot {
    pub user_id: UserId,
    pub week_start: NaiveDate,
    pub overall: f64,
    pub waste: ComponentScore,
    pub nutrition: ComponentScore,
    pub sustainability: ComponentScore,
    pub computed_at: DateTime<Utc>,
}

impl ScoreSnapshot {
    /// One-decimal presentation value; `overall` keeps full precision for
    /// week-over-week deltas.
    pub fn overall_rounded(&self) -> f64 {
        (self.overall * 10.0).round() / 10.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Success,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    Waste,
    Nutrition,
    Sustainability,
    Overall,
}

impl ScoreCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Waste => "Waste Reduction",
            Self::Nutrition => "Nutrition",
            Self::Sustainability => "Sustainability",
            Self::Overall => "Overall",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactTier {
    High,
    Medium,
    Low,
}

impl ImpactTier {
    pub(crate) const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

/// Inclusive numeric range expressed in score points or percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRange {
    pub low: f64,
    pub high: f64,
}

impl PointRange {
    pub fn new(low: f64, high: f64) -> Self {
        if low <= high {
            Self { low, high }
        } else {
            Self { low: high, high: low }
        }
    }
}

impl fmt::Display for PointRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.high - self.low).abs() < f64::EPSILON {
            write!(f, "{:.0}", self.low)
        } else {
            write!(f, "{:.0}-{:.0}", self.low, self.high)
        }
    }
}

/// Short narrative explaining a score or its change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub category: ScoreCategory,
    pub message: String,
    pub impact: ImpactTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_points: Option<PointRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPriority {
    High,
    Medium,
}

impl StepPriority {
    pub(crate) const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepCategory {
    Waste,
    Nutrition,
    Sustainability,
}

impl StepCategory {
    pub(crate) const fn rank(self) -> u8 {
        match self {
            Self::Waste => 0,
            Self::Nutrition => 1,
            Self::Sustainability => 2,
        }
    }
}

/// A prioritized, quantified recommendation tied to a specific deficit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionableStep {
    pub action: String,
    pub priority: StepPriority,
    pub category: StepCategory,
    pub expected_improvement: PointRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost_percentage: Option<PointRange>,
    /// True iff the action text embeds user-specific item or nutrient names.
    pub specific: bool,
}
