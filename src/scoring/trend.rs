use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::domain::ScoreSnapshot;

/// Ordered multi-week score series, oldest week first.
#[derive(Debug, Clone, Serialize)]
pub struct TrendSeries {
    snapshots: Vec<ScoreSnapshot>,
}

impl TrendSeries {
    pub(crate) fn new(snapshots: Vec<ScoreSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Chronological view for charting.
    pub fn oldest_first(&self) -> &[ScoreSnapshot] {
        &self.snapshots
    }

    /// Reverse-chronological view for history listings.
    pub fn newest_first(&self) -> impl Iterator<Item = &ScoreSnapshot> {
        self.snapshots.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Week-start anchors for the most recent `weeks` weeks ending at
/// `latest_week_start`, oldest first.
pub(crate) fn week_starts(latest_week_start: NaiveDate, weeks: u32) -> Vec<NaiveDate> {
    (0..weeks)
        .rev()
        .map(|offset| latest_week_start - Duration::weeks(i64::from(offset)))
        .collect()
}
