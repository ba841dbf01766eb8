//! The impact scoring engine: component scorers, combiner, insight and step
//! generators, and the multi-week trend aggregator.
//!
//! Everything downstream of [`MetricsProvider::fetch`] is a pure function of
//! the metrics bundle, so recomputing a week with unchanged inputs yields an
//! identical snapshot, insight set, and step list.

pub mod augment;
pub mod domain;
pub mod provider;
pub mod trend;

mod insights;
mod nutrition;
mod steps;
mod sustainability;
mod waste;

#[cfg(test)]
mod tests;

pub use domain::{
    ActionableStep, ComponentScore, ConsumptionMetrics, ImpactTier, Insight, InsightKind,
    PointRange, ScoreCategory, ScoreFactor, ScoreSnapshot, StepCategory, StepPriority,
    SustainabilityMetrics, UserId, WasteMetrics, WeeklyMetrics,
};
pub use provider::{
    InMemoryMetricsProvider, InMemorySnapshotStore, MetricsProvider, ProviderError, SnapshotStore,
    StoreError,
};
pub use trend::TrendSeries;

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ScoreWeights, ScoringBaselines};
use augment::{AugmentationContext, DisabledAugmenter, InsightAugmenter};

/// Error raised by the scoring engine.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("invalid metrics: {reason}")]
    InvalidMetrics { reason: String },
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error("trend range must cover at least one week, got {weeks}")]
    InvalidRange { weeks: u32 },
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no snapshot store configured")]
    NoStore,
}

/// Parameters for one scoring run.
#[derive(Debug, Clone)]
pub struct ScoreRequest {
    pub user_id: UserId,
    pub week_start: NaiveDate,
    pub ai_enabled: bool,
    /// Timestamp stamped on the snapshot; `None` samples the clock. Tests pin
    /// this to get bit-identical recomputation.
    pub computed_at: Option<DateTime<Utc>>,
}

impl ScoreRequest {
    pub fn new(user_id: UserId, week_start: NaiveDate) -> Self {
        Self {
            user_id,
            week_start,
            ai_enabled: false,
            computed_at: None,
        }
    }

    pub fn with_ai(mut self, ai_enabled: bool) -> Self {
        self.ai_enabled = ai_enabled;
        self
    }

    pub fn computed_at(mut self, computed_at: DateTime<Utc>) -> Self {
        self.computed_at = Some(computed_at);
        self
    }
}

/// Parameters for one trend aggregation.
#[derive(Debug, Clone)]
pub struct TrendRequest {
    pub user_id: UserId,
    /// Week-start anchor of the most recent week in the series.
    pub latest_week_start: NaiveDate,
    pub weeks: u32,
    /// Timestamp stamped on every snapshot in the series; `None` samples the
    /// clock once. Tests pin this to get bit-identical recomputation.
    pub computed_at: Option<DateTime<Utc>>,
}

impl TrendRequest {
    pub fn new(user_id: UserId, latest_week_start: NaiveDate, weeks: u32) -> Self {
        Self {
            user_id,
            latest_week_start,
            weeks,
            computed_at: None,
        }
    }

    pub fn computed_at(mut self, computed_at: DateTime<Utc>) -> Self {
        self.computed_at = Some(computed_at);
        self
    }
}

/// Full scoring output for one user and week.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub snapshot: ScoreSnapshot,
    pub insights: Vec<Insight>,
    pub steps: Vec<ActionableStep>,
    /// True only when the insight prose came from the generative-text
    /// collaborator; the scores and steps are deterministic either way.
    pub ai_assisted: bool,
}

/// Stateless engine applying the baselines and weights to provider-supplied
/// metrics. Safe to share across threads; each computation reads an immutable
/// metrics bundle and produces an independent snapshot.
pub struct ImpactScorer {
    provider: Arc<dyn MetricsProvider>,
    augmenter: Arc<dyn InsightAugmenter>,
    store: Option<Arc<dyn SnapshotStore>>,
    baselines: ScoringBaselines,
    weights: ScoreWeights,
}

impl ImpactScorer {
    pub fn new(provider: Arc<dyn MetricsProvider>) -> Self {
        Self {
            provider,
            augmenter: Arc::new(DisabledAugmenter),
            store: None,
            baselines: ScoringBaselines::default(),
            weights: ScoreWeights::default(),
        }
    }

    pub fn with_augmenter(mut self, augmenter: Arc<dyn InsightAugmenter>) -> Self {
        self.augmenter = augmenter;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_baselines(mut self, baselines: ScoringBaselines) -> Self {
        self.baselines = baselines;
        self
    }

    /// Weights are validated on the next computation.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Primary entry point: score one week, narrate it, and recommend steps.
    pub fn compute_score(&self, request: &ScoreRequest) -> Result<ScoreReport, ScoreError> {
        self.weights.validate()?;

        let metrics = self.provider.fetch(&request.user_id, request.week_start)?;
        validate(&metrics)?;

        let computed_at = request.computed_at.unwrap_or_else(Utc::now);
        let snapshot = self.score_week(&request.user_id, request.week_start, &metrics, computed_at);

        let previous = self.previous_snapshot(request, computed_at)?;
        debug!(
            user = %request.user_id,
            week = %request.week_start,
            overall = snapshot.overall_rounded(),
            "computed weekly impact score"
        );

        let deterministic =
            insights::generate_insights(&snapshot, previous.as_ref(), &metrics, &self.baselines);

        let (insight_records, ai_assisted) = if request.ai_enabled {
            let context = AugmentationContext {
                snapshot: &snapshot,
                previous: previous.as_ref(),
                metrics: &metrics,
            };
            match self.augmenter.augment(&context) {
                Ok(augmented) => (augmented, true),
                Err(augment::AugmentError::Disabled) => {
                    debug!("augmentation disabled, using rule-based insights");
                    (deterministic, false)
                }
                Err(err) => {
                    warn!(error = %err, "augmentation degraded, using rule-based insights");
                    (deterministic, false)
                }
            }
        } else {
            (deterministic, false)
        };

        let steps = steps::generate_steps(&snapshot, &metrics, &self.baselines);

        Ok(ScoreReport {
            snapshot,
            insights: insight_records,
            steps,
            ai_assisted,
        })
    }

    /// Compute and persist through the snapshot store, keyed (user, week).
    pub fn compute_and_store(&self, request: &ScoreRequest) -> Result<ScoreReport, ScoreError> {
        let store = self.store.as_ref().ok_or(ScoreError::NoStore)?;
        let report = self.compute_score(request)?;
        store.upsert(&report.snapshot)?;
        Ok(report)
    }

    /// Score the most recent `weeks` consecutive weeks ending at the anchor,
    /// oldest first. Weeks the provider has no metrics for are skipped, so
    /// the series may be shorter than requested.
    pub fn trend(&self, request: &TrendRequest) -> Result<TrendSeries, ScoreError> {
        if request.weeks == 0 {
            return Err(ScoreError::InvalidRange {
                weeks: request.weeks,
            });
        }
        self.weights.validate()?;

        let computed_at = request.computed_at.unwrap_or_else(Utc::now);
        let mut snapshots = Vec::with_capacity(request.weeks as usize);
        for week_start in trend::week_starts(request.latest_week_start, request.weeks) {
            match self.provider.fetch(&request.user_id, week_start) {
                Ok(metrics) => {
                    validate(&metrics)?;
                    snapshots.push(self.score_week(
                        &request.user_id,
                        week_start,
                        &metrics,
                        computed_at,
                    ));
                }
                Err(ProviderError::NotFound { .. }) => {
                    debug!(user = %request.user_id, week = %week_start, "no metrics for trend week, skipping");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(TrendSeries::new(snapshots))
    }

    /// The pure per-week scoring core shared by `compute_score` and `trend`.
    fn score_week(
        &self,
        user_id: &UserId,
        week_start: NaiveDate,
        metrics: &WeeklyMetrics,
        computed_at: DateTime<Utc>,
    ) -> ScoreSnapshot {
        let waste = waste::score_waste(&metrics.waste);
        let nutrition = nutrition::score_nutrition(&metrics.consumption, &self.baselines);
        let sustainability = sustainability::score_sustainability(
            &metrics.sustainability,
            metrics.waste.waste_ratio(),
        );
        let overall = self
            .weights
            .combine(waste.value, nutrition.value, sustainability.value);

        ScoreSnapshot {
            user_id: user_id.clone(),
            week_start,
            overall,
            waste,
            nutrition,
            sustainability,
            computed_at,
        }
    }

    /// Score the immediately preceding week for comparison insights. A
    /// missing baseline week is not an error; trend narration is omitted.
    fn previous_snapshot(
        &self,
        request: &ScoreRequest,
        computed_at: DateTime<Utc>,
    ) -> Result<Option<ScoreSnapshot>, ScoreError> {
        let previous_week = request.week_start - Duration::weeks(1);
        match self.provider.fetch(&request.user_id, previous_week) {
            Ok(metrics) => {
                validate(&metrics)?;
                Ok(Some(self.score_week(
                    &request.user_id,
                    previous_week,
                    &metrics,
                    computed_at,
                )))
            }
            Err(ProviderError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

fn validate(metrics: &WeeklyMetrics) -> Result<(), ScoreError> {
    metrics
        .validate()
        .map_err(|reason| ScoreError::InvalidMetrics { reason })
}
