use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::NaiveDate;

use super::domain::{ScoreSnapshot, UserId, WeeklyMetrics};

/// Source of aggregated weekly metrics, owned by the surrounding product.
/// The engine performs no aggregation of raw logs itself.
pub trait MetricsProvider: Send + Sync {
    fn fetch(&self, user: &UserId, week_start: NaiveDate) -> Result<WeeklyMetrics, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no metrics recorded for {user} in the week of {week_start}")]
    NotFound { user: UserId, week_start: NaiveDate },
    #[error("metrics source unavailable: {0}")]
    Unavailable(String),
}

/// Snapshot persistence collaborator. Implementations must keep at most one
/// authoritative snapshot per (user, week_start); `upsert` replaces any
/// previous snapshot for that key.
pub trait SnapshotStore: Send + Sync {
    fn upsert(&self, snapshot: &ScoreSnapshot) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

/// Map-backed provider for tests, demos, and the CLI fixture path.
#[derive(Debug, Default)]
pub struct InMemoryMetricsProvider {
    entries: BTreeMap<(UserId, NaiveDate), WeeklyMetrics>,
}

impl InMemoryMetricsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user: UserId, week_start: NaiveDate, metrics: WeeklyMetrics) {
        self.entries.insert((user, week_start), metrics);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MetricsProvider for InMemoryMetricsProvider {
    fn fetch(&self, user: &UserId, week_start: NaiveDate) -> Result<WeeklyMetrics, ProviderError> {
        self.entries
            .get(&(user.clone(), week_start))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                user: user.clone(),
                week_start,
            })
    }
}

/// Map-backed snapshot store for tests and demos.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    snapshots: Mutex<BTreeMap<(UserId, NaiveDate), ScoreSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user: &UserId, week_start: NaiveDate) -> Option<ScoreSnapshot> {
        self.snapshots
            .lock()
            .ok()?
            .get(&(user.clone(), week_start))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().map(|map| map.len()).unwrap_or(0)
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn upsert(&self, snapshot: &ScoreSnapshot) -> Result<(), StoreError> {
        let mut snapshots = self
            .snapshots
            .lock()
            .map_err(|_| StoreError::Unavailable("snapshot store lock poisoned".to_string()))?;
        snapshots.insert(
            (snapshot.user_id.clone(), snapshot.week_start),
            snapshot.clone(),
        );
        Ok(())
    }
}
