//! Shared domain types.
//!
//! These types are intentionally lightweight so they can be:
//!
//! - produced by the transformer and consumed by the loader
//! - carried through the per-series run bookkeeping
//! - formatted into the end-of-run summary

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Descriptive metadata for one series, as persisted in `series_metadata`.
///
/// `series_id` is globally unique and immutable once created; every other
/// field may change on a later upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesMetadata {
    pub series_id: String,
    pub series_name: String,
    pub description: String,
    pub units: String,
    pub frequency: String,
    pub seasonal_adjustment: String,
    /// Earliest date the source publishes for this series, when known.
    pub observation_start: Option<NaiveDate>,
}

/// One canonical observation ready for loading.
///
/// The value is a fixed-point decimal, never a float: repeated loads of the
/// same upstream value must compare byte-equal in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationRecord {
    pub date: NaiveDate,
    pub value: Decimal,
    pub processed_at: DateTime<Utc>,
}

/// Insert/update split for one `upsert_observations` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertCounts {
    pub inserted: u64,
    pub updated: u64,
}

impl UpsertCounts {
    pub fn total(&self) -> u64 {
        self.inserted + self.updated
    }

    pub fn add(&mut self, other: UpsertCounts) {
        self.inserted += other.inserted;
        self.updated += other.updated;
    }
}

/// Kept/dropped split for one series' transform step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    pub kept: usize,
    /// Rows carrying the source's missing-data sentinel. Policy: absent,
    /// never stored as NULL.
    pub missing: usize,
    /// Rows whose date or value could not be coerced.
    pub invalid: usize,
    /// Rows sharing a date with an earlier row in the same batch.
    pub duplicates: usize,
}

impl TransformStats {
    pub fn dropped(&self) -> usize {
        self.missing + self.invalid + self.duplicates
    }

    pub fn add(&mut self, other: TransformStats) {
        self.kept += other.kept;
        self.missing += other.missing;
        self.invalid += other.invalid;
        self.duplicates += other.duplicates;
    }
}

/// Per-series progress within one run.
///
/// `Done` and `Failed` are terminal; everything else marks the step the
/// series is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesState {
    Pending,
    MetadataSynced,
    Fetching,
    Transforming,
    Loading,
    Done,
    Failed,
}

impl std::fmt::Display for SeriesState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SeriesState::Pending => "pending",
            SeriesState::MetadataSynced => "metadata sync",
            SeriesState::Fetching => "fetch",
            SeriesState::Transforming => "transform",
            SeriesState::Loading => "load",
            SeriesState::Done => "done",
            SeriesState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Outcome of one series' trip through the pipeline.
#[derive(Debug, Clone)]
pub struct SeriesOutcome {
    pub series_id: String,
    /// Terminal state: `Done` or `Failed`.
    pub state: SeriesState,
    /// The step the series was in when the error hit, for `Failed` outcomes.
    pub failed_during: Option<SeriesState>,
    pub transform: TransformStats,
    pub counts: UpsertCounts,
    pub error: Option<String>,
}

impl SeriesOutcome {
    pub fn new(series_id: impl Into<String>) -> Self {
        Self {
            series_id: series_id.into(),
            state: SeriesState::Pending,
            failed_during: None,
            transform: TransformStats::default(),
            counts: UpsertCounts::default(),
            error: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == SeriesState::Done
    }
}

/// Everything one run produced, in registry order.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<SeriesOutcome>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_done()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn total_counts(&self) -> UpsertCounts {
        let mut totals = UpsertCounts::default();
        for o in &self.outcomes {
            totals.add(o.counts);
        }
        totals
    }

    pub fn total_transform(&self) -> TransformStats {
        let mut totals = TransformStats::default();
        for o in &self.outcomes {
            totals.add(o.transform);
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(id: &str, state: SeriesState, inserted: u64) -> SeriesOutcome {
        let mut o = SeriesOutcome::new(id);
        o.state = state;
        o.counts.inserted = inserted;
        o
    }

    #[test]
    fn summary_counts_success_and_failure() {
        let summary = RunSummary {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            outcomes: vec![
                outcome("GDP", SeriesState::Done, 10),
                outcome("UNRATE", SeriesState::Failed, 0),
                outcome("CPIAUCSL", SeriesState::Done, 5),
            ],
        };
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.total_counts().inserted, 15);
    }

    #[test]
    fn transform_stats_dropped_totals() {
        let stats = TransformStats { kept: 7, missing: 2, invalid: 1, duplicates: 1 };
        assert_eq!(stats.dropped(), 4);
    }
}
